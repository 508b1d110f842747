//! ProgressDialog (§4.17): drives a [`super::widgets::ProgressBar`] from
//! the fork+pipe protocol in [`crate::fileops`], plus a Cancel button.

use crate::fileops::{OpKind, Progress};
use crate::geometry::Rect;
use crate::xconn::Xid;

use super::widgets::{Button, ProgressBar};
use super::{DialogFrame, Widget, WidgetResponse};

pub struct ProgressDialog {
    pub frame: DialogFrame,
    pub op: OpKind,
    pub bar: ProgressBar,
    pub cancel_btn: Button,
    pub current_file: String,
    pub cancelled: bool,
}

impl ProgressDialog {
    pub fn new(canvas: Xid, op: OpKind, bar_rect: Rect, cancel_rect: Rect) -> Self {
        ProgressDialog {
            frame: DialogFrame::new(canvas, title_for(op), true),
            op,
            bar: ProgressBar::new(bar_rect),
            cancel_btn: Button::new(cancel_rect, "Cancel"),
            current_file: String::new(),
            cancelled: false,
        }
    }

    pub fn apply_progress(&mut self, p: Progress) {
        self.bar.set(p.bytes_done, p.bytes_total);
        self.current_file = p.current_file;
    }

    pub fn on_click(&mut self, x: i32, y: i32) {
        if self.cancel_btn.on_click(x, y) == WidgetResponse::Consumed {
            self.cancelled = true;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.bar.total > 0 && self.bar.done >= self.bar.total
    }
}

fn title_for(op: OpKind) -> &'static str {
    match op {
        OpKind::Copy => "Copying",
        OpKind::Move => "Moving",
        OpKind::Delete => "Deleting",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applying_progress_updates_bar_and_current_file() {
        let mut dlg = ProgressDialog::new(Xid(1), OpKind::Copy, Rect::new(0, 0, 200, 10), Rect::new(0, 20, 50, 20));
        dlg.apply_progress(Progress { bytes_done: 10, bytes_total: 100, current_file: "/tmp/a".into() });
        assert_eq!(dlg.bar.fraction(), 0.1);
        assert_eq!(dlg.current_file, "/tmp/a");
        assert!(!dlg.is_complete());
    }

    #[test]
    fn reaching_total_marks_complete() {
        let mut dlg = ProgressDialog::new(Xid(1), OpKind::Move, Rect::new(0, 0, 200, 10), Rect::new(0, 20, 50, 20));
        dlg.apply_progress(Progress { bytes_done: 100, bytes_total: 100, current_file: "x".into() });
        assert!(dlg.is_complete());
    }

    #[test]
    fn clicking_cancel_button_sets_cancelled_flag() {
        let mut dlg = ProgressDialog::new(Xid(1), OpKind::Delete, Rect::new(0, 0, 200, 10), Rect::new(0, 20, 50, 20));
        dlg.on_click(10, 25);
        assert!(dlg.cancelled);
    }
}
