//! DeleteDialog (§4.17): a confirmation prompt listing every path about
//! to be deleted, with Delete/Cancel buttons.

use crate::geometry::Rect;
use crate::xconn::Xid;

use super::widgets::Button;
use super::{DialogFrame, Widget, WidgetResponse};

pub struct DeleteDialog {
    pub frame: DialogFrame,
    pub paths: Vec<String>,
    pub delete_btn: Button,
    pub cancel_btn: Button,
}

impl DeleteDialog {
    pub fn new(canvas: Xid, paths: Vec<String>, delete_rect: Rect, cancel_rect: Rect) -> Self {
        DeleteDialog {
            frame: DialogFrame::new(canvas, "Delete", true),
            paths,
            delete_btn: Button::new(delete_rect, "Delete"),
            cancel_btn: Button::new(cancel_rect, "Cancel"),
        }
    }

    /// Returns `Some(true)` if Delete was clicked, `Some(false)` if
    /// Cancel was, `None` if the click hit neither button.
    pub fn on_click(&mut self, x: i32, y: i32) -> Option<bool> {
        if self.delete_btn.on_click(x, y) == WidgetResponse::Consumed {
            return Some(true);
        }
        if self.cancel_btn.on_click(x, y) == WidgetResponse::Consumed {
            return Some(false);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicking_delete_confirms() {
        let mut dlg = DeleteDialog::new(
            Xid(1),
            vec!["/tmp/a.txt".into()],
            Rect::new(0, 0, 50, 20),
            Rect::new(60, 0, 50, 20),
        );
        assert_eq!(dlg.on_click(10, 10), Some(true));
    }

    #[test]
    fn clicking_cancel_declines() {
        let mut dlg = DeleteDialog::new(
            Xid(1),
            vec!["/tmp/a.txt".into()],
            Rect::new(0, 0, 50, 20),
            Rect::new(60, 0, 50, 20),
        );
        assert_eq!(dlg.on_click(70, 10), Some(false));
    }

    #[test]
    fn clicking_elsewhere_does_nothing() {
        let mut dlg = DeleteDialog::new(
            Xid(1),
            vec!["/tmp/a.txt".into()],
            Rect::new(0, 0, 50, 20),
            Rect::new(60, 0, 50, 20),
        );
        assert_eq!(dlg.on_click(500, 500), None);
    }
}
