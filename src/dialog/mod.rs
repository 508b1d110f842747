//! Generic dialog framework (§4.17) and its five instantiations.
//!
//! Every dialog is a canvas (kind [`crate::canvas::CanvasType::Dialog`])
//! plus a flat list of widgets implementing [`Widget`]. Grounded on
//! `examples/sminez-penrose/src/draw/bar/widgets.rs`'s `Widget` trait
//! shape (`draw`/`current_extent`/`require_draw`), adapted from a
//! continuously-redrawing status bar to an event-driven dialog: instead
//! of a per-frame `draw` call with a live `DrawContext`, widgets here only
//! describe their own layout and consume input, leaving the actual
//! `cairo`/`pango` painting to the render layer once a widget is dirty.

pub mod delete;
pub mod execute;
pub mod icon_info;
pub mod progress;
pub mod rename;
pub mod widgets;

use crate::geometry::Rect;
use crate::xconn::Xid;

/// A widget's reaction to a routed input event (§4.12 hands dialogs
/// already-resolved, canvas-local events; this is what a widget returns
/// after consuming one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetResponse {
    Ignored,
    Consumed,
    /// The dialog should close; `true` means the affirmative action (OK,
    /// Delete, Execute, ...) fired rather than Cancel.
    Close { confirmed: bool },
}

/// Common shape for every interactive dialog widget. Unlike the bar
/// widget it's grounded on, `draw` is replaced by `dirty`/`clear_dirty`
/// since dialog widgets don't own a `DrawContext` directly — the
/// compositor paints the whole dialog canvas in one pass once anything in
/// it is dirty.
pub trait Widget {
    fn rect(&self) -> Rect;

    fn dirty(&self) -> bool;

    fn clear_dirty(&mut self);

    fn on_click(&mut self, x: i32, y: i32) -> WidgetResponse {
        let _ = (x, y);
        WidgetResponse::Ignored
    }

    fn on_key(&mut self, keysym: amiwb_keysyms::XKeySym) -> WidgetResponse {
        let _ = keysym;
        WidgetResponse::Ignored
    }
}

/// Shared chrome every dialog needs: the canvas it lives on, and whether
/// it's modal (blocks input to everything else, §4.17).
pub struct DialogFrame {
    pub canvas: Xid,
    pub modal: bool,
    pub title: String,
}

impl DialogFrame {
    pub fn new(canvas: Xid, title: impl Into<String>, modal: bool) -> Self {
        DialogFrame { canvas, title: title.into(), modal }
    }
}
