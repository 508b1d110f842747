//! Stateless chrome-drawing helpers: scrollbar arrows, resize grip, and
//! the title-bar checker fill (§4.5).
//!
//! These never touch X directly; they describe what to paint in terms of
//! the canvas's buffer-local rect, leaving the actual
//! `XRenderFillRectangle`/`XRenderComposite` calls to the compositor's
//! paint pass, which already holds the picture handles.

use crate::geometry::Rect;
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WidgetState: u8 {
        const ARMED   = 0b0001;
        const PRESSED = 0b0010;
    }
}

pub const SCROLLBAR_THICKNESS: u32 = 16;
pub const RESIZE_GRIP_SIZE: u32 = 16;
pub const CHECKER_TILE: u32 = 4;

#[derive(Debug, Clone, Copy)]
pub enum ArrowDir {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct ArrowButton {
    pub rect: Rect,
    pub dir: ArrowDir,
    pub state: WidgetState,
}

/// Lays out the four scrollbar arrow buttons and the resize grip for a
/// canvas of the given buffer size. Scrollbars are omitted (empty result)
/// when `disable_scrollbars` is set.
pub fn layout_scroll_widgets(buffer_w: u32, buffer_h: u32, disable_scrollbars: bool) -> Vec<ArrowButton> {
    if disable_scrollbars {
        return Vec::new();
    }
    let t = SCROLLBAR_THICKNESS;
    vec![
        ArrowButton {
            rect: Rect::new((buffer_w - t) as i32, 0, t, t),
            dir: ArrowDir::Up,
            state: WidgetState::empty(),
        },
        ArrowButton {
            rect: Rect::new((buffer_w - t) as i32, (buffer_h - 2 * t) as i32, t, t),
            dir: ArrowDir::Down,
            state: WidgetState::empty(),
        },
        ArrowButton {
            rect: Rect::new(0, (buffer_h - t) as i32, t, t),
            dir: ArrowDir::Left,
            state: WidgetState::empty(),
        },
        ArrowButton {
            rect: Rect::new((buffer_w - 2 * t) as i32, (buffer_h - t) as i32, t, t),
            dir: ArrowDir::Right,
            state: WidgetState::empty(),
        },
    ]
}

pub fn resize_grip_rect(buffer_w: u32, buffer_h: u32) -> Rect {
    Rect::new(
        (buffer_w - RESIZE_GRIP_SIZE) as i32,
        (buffer_h - RESIZE_GRIP_SIZE) as i32,
        RESIZE_GRIP_SIZE,
        RESIZE_GRIP_SIZE,
    )
}

/// Checker-pattern tile colors for the title bar, per `CheckerVariant`
/// (§4.5): active canvases get the blue/black pattern, everything else
/// gray/black.
pub fn checker_colors(variant: super::CheckerVariant) -> ((u8, u8, u8), (u8, u8, u8)) {
    variant.colors()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrollbars_omitted_when_disabled() {
        assert!(layout_scroll_widgets(200, 200, true).is_empty());
    }

    #[test]
    fn scrollbars_hug_the_bottom_right_corner() {
        let widgets = layout_scroll_widgets(200, 200, false);
        assert_eq!(widgets.len(), 4);
        let grip = resize_grip_rect(200, 200);
        assert_eq!(grip.right() as u32, 200);
        assert_eq!(grip.bottom() as u32, 200);
    }
}
