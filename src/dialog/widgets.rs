//! Concrete dialog widgets: button, text input field, progress bar, and a
//! scrolling list view (§4.17).

use amiwb_keysyms::XKeySym;

use crate::geometry::{Point, Rect};

use super::{Widget, WidgetResponse};

pub struct Button {
    rect: Rect,
    pub label: String,
    pub pressed: bool,
    dirty: bool,
}

impl Button {
    pub fn new(rect: Rect, label: impl Into<String>) -> Self {
        Button { rect, label: label.into(), pressed: false, dirty: true }
    }
}

impl Widget for Button {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn on_click(&mut self, x: i32, y: i32) -> WidgetResponse {
        if self.rect.contains(Point::new(x, y)) {
            self.pressed = true;
            self.dirty = true;
            WidgetResponse::Consumed
        } else {
            WidgetResponse::Ignored
        }
    }
}

/// Single-line editable text field (§4.17 RenameDialog/ExecuteDialog).
/// Cursor position is a byte offset into `text`, kept on a `char`
/// boundary by every mutating method.
pub struct InputField {
    rect: Rect,
    pub text: String,
    pub cursor: usize,
    dirty: bool,
}

impl InputField {
    pub fn new(rect: Rect, initial: impl Into<String>) -> Self {
        let text = initial.into();
        let cursor = text.len();
        InputField { rect, text, cursor, dirty: true }
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.dirty = true;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
        self.dirty = true;
    }

    pub fn move_left(&mut self) {
        if let Some((i, _)) = self.text[..self.cursor].char_indices().last() {
            self.cursor = i;
        }
    }

    pub fn move_right(&mut self) {
        if let Some((i, c)) = self.text[self.cursor..].char_indices().next() {
            self.cursor += i + c.len_utf8();
            if self.cursor > self.text.len() {
                self.cursor = self.text.len();
            }
        }
    }
}

impl Widget for InputField {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn on_click(&mut self, x: i32, y: i32) -> WidgetResponse {
        if self.rect.contains(Point::new(x, y)) {
            WidgetResponse::Consumed
        } else {
            WidgetResponse::Ignored
        }
    }

    fn on_key(&mut self, keysym: XKeySym) -> WidgetResponse {
        match keysym {
            XKeySym::XK_BackSpace => {
                self.backspace();
                WidgetResponse::Consumed
            }
            XKeySym::XK_Left => {
                self.move_left();
                WidgetResponse::Consumed
            }
            XKeySym::XK_Right => {
                self.move_right();
                WidgetResponse::Consumed
            }
            XKeySym::XK_Return => WidgetResponse::Close { confirmed: true },
            XKeySym::XK_Escape => WidgetResponse::Close { confirmed: false },
            _ => WidgetResponse::Ignored,
        }
    }
}

/// Non-interactive bar showing `done/total` as a filled fraction (§4.17
/// ProgressDialog, fed by `fileops::Progress`).
pub struct ProgressBar {
    rect: Rect,
    pub done: u64,
    pub total: u64,
    dirty: bool,
}

impl ProgressBar {
    pub fn new(rect: Rect) -> Self {
        ProgressBar { rect, done: 0, total: 0, dirty: true }
    }

    pub fn set(&mut self, done: u64, total: u64) {
        if self.done != done || self.total != total {
            self.done = done;
            self.total = total;
            self.dirty = true;
        }
    }

    /// Fraction complete in `[0.0, 1.0]`; `total == 0` reads as complete
    /// rather than dividing by zero.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.done as f64 / self.total as f64).clamp(0.0, 1.0)
        }
    }

    pub fn filled_width(&self) -> u32 {
        (self.rect.w as f64 * self.fraction()).round() as u32
    }
}

impl Widget for ProgressBar {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Scrolling single-selection list (§4.17 IconInfoDialog's tool-type
/// list, ExecuteDialog's history).
pub struct ListView {
    rect: Rect,
    pub items: Vec<String>,
    pub selected: Option<usize>,
    pub scroll: i32,
    row_height: u32,
    dirty: bool,
}

impl ListView {
    pub fn new(rect: Rect, row_height: u32) -> Self {
        ListView { rect, items: Vec::new(), selected: None, scroll: 0, row_height: row_height.max(1), dirty: true }
    }

    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.selected = None;
        self.scroll = 0;
        self.dirty = true;
    }

    fn row_at(&self, y: i32) -> Option<usize> {
        if y < 0 {
            return None;
        }
        let idx = ((y + self.scroll) as u32 / self.row_height) as usize;
        if idx < self.items.len() {
            Some(idx)
        } else {
            None
        }
    }
}

impl Widget for ListView {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn on_click(&mut self, x: i32, y: i32) -> WidgetResponse {
        if !self.rect.contains(Point::new(x, y)) {
            return WidgetResponse::Ignored;
        }
        let local_y = y - self.rect.y;
        match self.row_at(local_y) {
            Some(idx) => {
                self.selected = Some(idx);
                self.dirty = true;
                WidgetResponse::Consumed
            }
            None => WidgetResponse::Consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::new(0, 0, 200, 100)
    }

    #[test]
    fn button_click_inside_is_consumed_and_marks_pressed() {
        let mut b = Button::new(rect(), "OK");
        assert_eq!(b.on_click(10, 10), WidgetResponse::Consumed);
        assert!(b.pressed);
        assert_eq!(b.on_click(500, 500), WidgetResponse::Ignored);
    }

    #[test]
    fn input_field_insert_and_backspace_track_byte_cursor() {
        let mut f = InputField::new(rect(), "ab");
        f.insert_char('c');
        assert_eq!(f.text, "abc");
        f.backspace();
        assert_eq!(f.text, "ab");
        assert_eq!(f.cursor, 2);
    }

    #[test]
    fn input_field_handles_multibyte_backspace_correctly() {
        let mut f = InputField::new(rect(), "caf\u{e9}");
        f.backspace();
        assert_eq!(f.text, "caf");
    }

    #[test]
    fn return_key_closes_confirmed_escape_closes_cancelled() {
        let mut f = InputField::new(rect(), "x");
        assert_eq!(f.on_key(XKeySym::XK_Return), WidgetResponse::Close { confirmed: true });
        assert_eq!(f.on_key(XKeySym::XK_Escape), WidgetResponse::Close { confirmed: false });
    }

    #[test]
    fn progress_bar_fraction_and_fill_width() {
        let mut p = ProgressBar::new(Rect::new(0, 0, 100, 10));
        p.set(50, 100);
        assert_eq!(p.fraction(), 0.5);
        assert_eq!(p.filled_width(), 50);
    }

    #[test]
    fn progress_bar_zero_total_reads_as_complete() {
        let p = ProgressBar::new(Rect::new(0, 0, 100, 10));
        assert_eq!(p.fraction(), 1.0);
    }

    #[test]
    fn listview_click_selects_the_row_under_the_point() {
        let mut lv = ListView::new(Rect::new(0, 0, 200, 100), 20);
        lv.set_items(vec!["a".into(), "b".into(), "c".into()]);
        lv.on_click(5, 25);
        assert_eq!(lv.selected, Some(1));
    }
}
