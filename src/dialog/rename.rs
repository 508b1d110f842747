//! RenameDialog (§4.17): a single `InputField` pre-filled with the
//! current name, closing with the new name on Enter.

use crate::geometry::Rect;
use crate::xconn::Xid;

use super::widgets::InputField;
use super::{DialogFrame, Widget, WidgetResponse};

pub struct RenameDialog {
    pub frame: DialogFrame,
    pub field: InputField,
    pub original_path: String,
}

impl RenameDialog {
    pub fn new(canvas: Xid, original_path: impl Into<String>, current_name: &str, field_rect: Rect) -> Self {
        RenameDialog {
            frame: DialogFrame::new(canvas, "Rename", true),
            field: InputField::new(field_rect, current_name),
            original_path: original_path.into(),
        }
    }

    /// Feeds a key event to the field; returns `Some(new_name)` once
    /// confirmed, `None` if cancelled or still editing.
    pub fn on_key(&mut self, keysym: amiwb_keysyms::XKeySym) -> Option<Option<String>> {
        match self.field.on_key(keysym) {
            WidgetResponse::Close { confirmed: true } => Some(Some(self.field.text.clone())),
            WidgetResponse::Close { confirmed: false } => Some(None),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amiwb_keysyms::XKeySym;

    #[test]
    fn enter_confirms_with_the_edited_text() {
        let mut dlg = RenameDialog::new(Xid(1), "/tmp/a.txt", "a.txt", Rect::new(0, 0, 200, 20));
        dlg.field.insert_char('b');
        assert_eq!(dlg.on_key(XKeySym::XK_Return), Some(Some("a.txtb".to_string())));
    }

    #[test]
    fn escape_cancels_with_none() {
        let mut dlg = RenameDialog::new(Xid(1), "/tmp/a.txt", "a.txt", Rect::new(0, 0, 200, 20));
        assert_eq!(dlg.on_key(XKeySym::XK_Escape), Some(None));
    }
}
