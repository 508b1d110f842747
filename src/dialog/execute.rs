//! ExecuteDialog (§4.17): a command-line prompt with a scrolling history
//! list view, launched from the workbench menu.

use crate::geometry::Rect;
use crate::xconn::Xid;

use super::widgets::{InputField, ListView};
use super::{DialogFrame, Widget};

pub const MAX_HISTORY: usize = 32;

pub struct ExecuteDialog {
    pub frame: DialogFrame,
    pub field: InputField,
    pub history: ListView,
    pub history_items: Vec<String>,
}

impl ExecuteDialog {
    pub fn new(canvas: Xid, field_rect: Rect, history_rect: Rect) -> Self {
        ExecuteDialog {
            frame: DialogFrame::new(canvas, "Execute Command", true),
            field: InputField::new(field_rect, ""),
            history: ListView::new(history_rect, 18),
            history_items: Vec::new(),
        }
    }

    /// Pushes a freshly-run command onto the front of history, capping it
    /// at `MAX_HISTORY` entries and de-duplicating consecutive repeats.
    pub fn push_history(&mut self, cmd: String) {
        if self.history_items.first() == Some(&cmd) {
            return;
        }
        self.history_items.insert(0, cmd);
        self.history_items.truncate(MAX_HISTORY);
        self.history.set_items(self.history_items.clone());
    }

    /// Selecting a history row fills the input field with it, mirroring a
    /// shell's reverse-search behavior.
    pub fn recall_selected(&mut self) {
        if let Some(idx) = self.history.selected {
            if let Some(cmd) = self.history_items.get(idx) {
                self.field = InputField::new(self.field.rect(), cmd.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_caps_at_max_and_dedupes_consecutive_repeats() {
        let mut dlg = ExecuteDialog::new(Xid(1), Rect::new(0, 0, 200, 20), Rect::new(0, 20, 200, 100));
        for i in 0..(MAX_HISTORY + 5) {
            dlg.push_history(format!("cmd-{i}"));
        }
        assert_eq!(dlg.history_items.len(), MAX_HISTORY);
        assert_eq!(dlg.history_items[0], format!("cmd-{}", MAX_HISTORY + 4));

        dlg.push_history(format!("cmd-{}", MAX_HISTORY + 4));
        assert_eq!(dlg.history_items.len(), MAX_HISTORY);
    }

    #[test]
    fn recalling_a_history_entry_fills_the_field() {
        let mut dlg = ExecuteDialog::new(Xid(1), Rect::new(0, 0, 200, 20), Rect::new(0, 20, 200, 100));
        dlg.push_history("ls -la".into());
        dlg.history.selected = Some(0);
        dlg.recall_selected();
        assert_eq!(dlg.field.text, "ls -la");
    }
}
