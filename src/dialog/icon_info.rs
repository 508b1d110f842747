//! IconInfoDialog (§4.17): shows a `FileIcon`'s metadata and its
//! ToolTypes/comment list, editable and saved back on confirm.

use crate::canvas::FileIcon;
use crate::geometry::Rect;
use crate::xconn::Xid;

use super::widgets::{InputField, ListView};
use super::{DialogFrame, Widget};

pub struct IconInfoDialog {
    pub frame: DialogFrame,
    pub path: String,
    pub comment: InputField,
    pub tool_types: ListView,
    pub size_label: String,
}

impl IconInfoDialog {
    pub fn new(canvas: Xid, icon: &FileIcon, comment_rect: Rect, tool_types_rect: Rect, size_label: impl Into<String>) -> Self {
        IconInfoDialog {
            frame: DialogFrame::new(canvas, format!("Information: {}", icon.label), true),
            path: icon.path.clone(),
            comment: InputField::new(comment_rect, ""),
            tool_types: ListView::new(tool_types_rect, 16),
            size_label: size_label.into(),
        }
    }

    pub fn set_tool_types(&mut self, entries: Vec<String>) {
        self.tool_types.set_items(entries);
    }
}
