//! [`FileIcon`]: a labeled picture placed on a canvas (§3, §4.14).

use crate::xconn::Xid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    File,
    Drawer,
    Iconified,
    Device,
}

/// Decoded pictures for an icon's two visual states. `Xid` stands in for
/// an XRender Picture id here; the icon decoder (§4.2) is what actually
/// produces the pixel data these get realized from.
#[derive(Debug, Default)]
pub struct IconPictures {
    pub normal: Option<Xid>,
    pub selected: Option<Xid>,
}

pub struct FileIcon {
    pub label: String,
    pub path: String,
    pub kind: IconKind,

    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub sel_width: u32,
    pub sel_height: u32,

    pub label_px_width: u32,
    pub selected: bool,

    pub pictures: IconPictures,
    pub display_window: Xid,

    /// Unix millis of the last click, for the double-click window (§4.14).
    pub last_click_ms: Option<i64>,

    /// Set only when `kind == Iconified`: the workbench canvas this icon
    /// is a minimized stand-in for.
    pub iconified_canvas: Option<Xid>,
}

const DOUBLE_CLICK_MS: i64 = 500;

impl FileIcon {
    pub fn new(label: impl Into<String>, path: impl Into<String>, kind: IconKind, display_window: Xid) -> Self {
        FileIcon {
            label: label.into(),
            path: path.into(),
            kind,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            sel_width: 0,
            sel_height: 0,
            label_px_width: 0,
            selected: false,
            pictures: IconPictures::default(),
            display_window,
            last_click_ms: None,
            iconified_canvas: None,
        }
    }

    /// Rendered width/height for the icon's current selection state; used
    /// by hit-testing rather than the grid pitch (§4.14).
    pub fn rendered_size(&self) -> (u32, u32) {
        if self.selected && (self.sel_width > 0 || self.sel_height > 0) {
            (self.sel_width, self.sel_height)
        } else {
            (self.width, self.height)
        }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        let (w, h) = self.rendered_size();
        px >= self.x && py >= self.y && px < self.x + w as i32 && py < self.y + h as i32
    }

    /// Returns true, and resets the click timer, if `now_ms` lands within
    /// the double-click window of the previous click on this icon.
    pub fn register_click(&mut self, now_ms: i64) -> bool {
        let is_double = match self.last_click_ms {
            Some(prev) => now_ms - prev < DOUBLE_CLICK_MS && now_ms >= prev,
            None => false,
        };
        self.last_click_ms = Some(now_ms);
        is_double
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_click_within_window_is_detected() {
        let mut icon = FileIcon::new("a.txt", "/tmp/a.txt", IconKind::File, Xid(1));
        assert!(!icon.register_click(1000));
        assert!(icon.register_click(1200));
    }

    #[test]
    fn slow_second_click_is_not_a_double_click() {
        let mut icon = FileIcon::new("a.txt", "/tmp/a.txt", IconKind::File, Xid(1));
        assert!(!icon.register_click(1000));
        assert!(!icon.register_click(1800));
    }

    #[test]
    fn hit_test_uses_selected_dimensions_when_selected() {
        let mut icon = FileIcon::new("a", "/a", IconKind::File, Xid(1));
        icon.width = 32;
        icon.height = 32;
        icon.sel_width = 40;
        icon.sel_height = 40;
        icon.selected = true;
        assert!(icon.contains(35, 35));
        icon.selected = false;
        assert!(!icon.contains(35, 35));
    }
}
