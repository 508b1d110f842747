//! The [`Canvas`] data model (§3) and its registry (§4.6).

pub mod focus;
pub mod icon;
pub mod layout;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::geometry::{Damage, Point, Rect};
use crate::xconn::Xid;

pub use icon::FileIcon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasType {
    Desktop,
    Window,
    Dialog,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Icons,
    Names,
}

/// Render surfaces owned by a canvas (§4.3). Opaque ids here stand in for
/// the real pixmap/picture/text-draw handles, which are only meaningful
/// once bound to a live `XConn` + cairo context; the render module owns
/// their creation/destruction.
#[derive(Debug, Default)]
pub struct Surfaces {
    pub pixmap: Option<Xid>,
    pub buffer_picture: Option<Xid>,
    pub window_picture: Option<Xid>,
    pub has_text_draw: bool,
}

pub struct Canvas {
    pub frame: Xid,
    pub client: Option<Xid>,
    pub kind: CanvasType,

    pub rect: Rect,
    pub min_width: u32,
    pub min_height: u32,
    pub resize_x_allowed: bool,
    pub resize_y_allowed: bool,

    pub buffer_width: u32,
    pub buffer_height: u32,

    pub path: Option<String>,
    pub view_mode: ViewMode,
    pub show_hidden: bool,
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub content_width: u32,
    pub content_height: u32,

    pub surfaces: Surfaces,
    pub damage: Damage,

    pub title_base: String,
    pub title_change: Option<String>,

    pub bg_color: (u8, u8, u8),
    pub disable_scrollbars: bool,

    pub is_transient: bool,
    pub transient_for: Option<Xid>,
    pub consecutive_unmaps: u32,
    pub cleanup_scheduled: bool,

    /// Last pointer position delivered to this canvas in its own local
    /// space (§4.12), kept so a translated `MotionNotify`/`ButtonRelease`
    /// has somewhere to land once `press_target` routes it here.
    pub last_local_pointer: Option<Point>,

    pub icons: Vec<FileIcon>,
}

impl Canvas {
    pub fn new(frame: Xid, kind: CanvasType, rect: Rect, title_base: impl Into<String>) -> Self {
        let (buffer_width, buffer_height) = match kind {
            CanvasType::Desktop | CanvasType::Menu => (rect.w, rect.h),
            CanvasType::Window | CanvasType::Dialog => (rect.w, rect.h),
        };
        Canvas {
            frame,
            client: None,
            kind,
            rect,
            min_width: 64,
            min_height: 32,
            resize_x_allowed: true,
            resize_y_allowed: true,
            buffer_width,
            buffer_height,
            path: None,
            view_mode: ViewMode::Icons,
            show_hidden: false,
            scroll_x: 0,
            scroll_y: 0,
            content_width: 0,
            content_height: 0,
            surfaces: Surfaces::default(),
            damage: Damage::default(),
            title_base: title_base.into(),
            title_change: None,
            bg_color: (0xa0, 0xa2, 0xa0),
            disable_scrollbars: false,
            is_transient: false,
            transient_for: None,
            consecutive_unmaps: 0,
            cleanup_scheduled: false,
            last_local_pointer: None,
            icons: Vec::new(),
        }
    }

    /// The title actually shown: `title_change` if a client set one,
    /// otherwise `title_base` (§3).
    pub fn display_title(&self) -> &str {
        self.title_change.as_deref().unwrap_or(&self.title_base)
    }

    /// Grows the offscreen buffer to cover the current rect. For
    /// WINDOW/DIALOG this only ever grows (buffer monotonicity, §8
    /// property 3); for DESKTOP/MENU it always tracks the rect exactly.
    /// Returns true if a reallocation is actually needed so the caller
    /// knows whether to call into `render::surfaces::recreate_surfaces`.
    pub fn grow_buffer_to_fit(&mut self) -> bool {
        match self.kind {
            CanvasType::Desktop | CanvasType::Menu => {
                let changed = self.buffer_width != self.rect.w || self.buffer_height != self.rect.h;
                self.buffer_width = self.rect.w;
                self.buffer_height = self.rect.h;
                changed
            }
            CanvasType::Window | CanvasType::Dialog => {
                let mut changed = false;
                if self.rect.w > self.buffer_width {
                    self.buffer_width = self.rect.w;
                    changed = true;
                }
                if self.rect.h > self.buffer_height {
                    self.buffer_height = self.rect.h;
                    changed = true;
                }
                changed
            }
        }
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
        self.damage.mark_whole();
    }
}

/// Owns every live canvas and provides the three lookups from §4.6.
#[derive(Default)]
pub struct Registry {
    canvases: HashMap<Xid, Canvas>,
    client_index: HashMap<Xid, Xid>, // client window -> frame window
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, canvas: Canvas) -> Result<()> {
        if self.canvases.contains_key(&canvas.frame) {
            return Err(Error::X11(format!(
                "duplicate frame window {} inserted into registry",
                canvas.frame
            )));
        }
        if let Some(client) = canvas.client {
            if self.client_index.contains_key(&client) {
                return Err(Error::X11(format!(
                    "duplicate client window {client} inserted into registry"
                )));
            }
            self.client_index.insert(client, canvas.frame);
        }
        self.canvases.insert(canvas.frame, canvas);
        Ok(())
    }

    pub fn remove(&mut self, frame: Xid) -> Option<Canvas> {
        let canvas = self.canvases.remove(&frame)?;
        if let Some(client) = canvas.client {
            self.client_index.remove(&client);
        }
        Some(canvas)
    }

    pub fn find_by_window(&self, frame: Xid) -> Option<&Canvas> {
        self.canvases.get(&frame)
    }

    pub fn find_by_window_mut(&mut self, frame: Xid) -> Option<&mut Canvas> {
        self.canvases.get_mut(&frame)
    }

    pub fn find_by_client(&self, client: Xid) -> Option<&Canvas> {
        let frame = self.client_index.get(&client)?;
        self.canvases.get(frame)
    }

    pub fn find_by_client_mut(&mut self, client: Xid) -> Option<&mut Canvas> {
        let frame = *self.client_index.get(&client)?;
        self.canvases.get_mut(&frame)
    }

    pub fn canvases_by_type(&self, kind: CanvasType) -> impl Iterator<Item = &Canvas> {
        self.canvases.values().filter(move |c| c.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Canvas> {
        self.canvases.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Canvas> {
        self.canvases.values_mut()
    }

    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::new(0, 0, 800, 600)
    }

    #[test]
    fn registry_is_a_bijection() {
        let mut reg = Registry::new();
        let c1 = Canvas::new(Xid(10), CanvasType::Window, rect(), "one");
        let mut c2 = Canvas::new(Xid(20), CanvasType::Window, rect(), "two");
        c2.client = Some(Xid(21));
        reg.insert(c1).unwrap();
        reg.insert(c2).unwrap();

        assert_eq!(reg.find_by_window(Xid(10)).unwrap().frame, Xid(10));
        assert_eq!(reg.find_by_window(Xid(20)).unwrap().frame, Xid(20));
        assert_eq!(reg.find_by_client(Xid(21)).unwrap().frame, Xid(20));
        assert!(reg.find_by_client(Xid(999)).is_none());
    }

    #[test]
    fn duplicate_frame_window_is_rejected() {
        let mut reg = Registry::new();
        reg.insert(Canvas::new(Xid(10), CanvasType::Window, rect(), "a")).unwrap();
        let dup = Canvas::new(Xid(10), CanvasType::Window, rect(), "b");
        assert!(reg.insert(dup).is_err());
    }

    #[test]
    fn removal_clears_both_indices() {
        let mut reg = Registry::new();
        let mut c = Canvas::new(Xid(10), CanvasType::Window, rect(), "a");
        c.client = Some(Xid(11));
        reg.insert(c).unwrap();
        reg.remove(Xid(10));
        assert!(reg.find_by_window(Xid(10)).is_none());
        assert!(reg.find_by_client(Xid(11)).is_none());
    }

    #[test]
    fn buffer_is_monotone_for_window_canvases() {
        let mut c = Canvas::new(Xid(10), CanvasType::Window, Rect::new(0, 0, 800, 600), "a");
        c.grow_buffer_to_fit();
        assert_eq!((c.buffer_width, c.buffer_height), (800, 600));

        c.set_rect(Rect::new(0, 0, 400, 300));
        c.grow_buffer_to_fit();
        assert_eq!((c.buffer_width, c.buffer_height), (800, 600));

        c.set_rect(Rect::new(0, 0, 900, 700));
        c.grow_buffer_to_fit();
        assert_eq!((c.buffer_width, c.buffer_height), (900, 700));
    }

    #[test]
    fn buffer_tracks_exactly_for_desktop() {
        let mut c = Canvas::new(Xid(1), CanvasType::Desktop, Rect::new(0, 0, 1920, 1080), "Workbench");
        c.set_rect(Rect::new(0, 0, 1024, 768));
        c.grow_buffer_to_fit();
        assert_eq!((c.buffer_width, c.buffer_height), (1024, 768));
    }
}
