//! Input routing and the press-target locking discipline (§4.12).
//!
//! The single most important invariant in the whole manager (§8 property
//! 2): once a `ButtonPress` resolves to a canvas, every `MotionNotify` and
//! the matching `ButtonRelease` must keep hitting that same canvas
//! regardless of where the pointer physically is, so a scrollbar drag
//! doesn't break the moment the cursor leaves the window.

use crate::canvas::{CanvasType, Registry};
use crate::error::Result;
use crate::geometry::Point;
use crate::xconn::{XConn, XConnExt, Xid};

#[derive(Default)]
pub struct PressTarget {
    target: Option<Xid>,
}

impl PressTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Xid> {
        self.target
    }

    pub fn set(&mut self, win: Xid) {
        self.target = Some(win);
    }

    pub fn clear(&mut self) {
        self.target = None;
    }

    /// Clears the target if it matches `win`; called from every
    /// destroy/unmap handler (§4.12) so a press lock never outlives its
    /// window.
    pub fn clear_if_matches(&mut self, win: Xid) {
        if self.target == Some(win) {
            self.target = None;
        }
    }
}

/// Resolves the canvas a freshly-seen event window belongs to: direct
/// frame/client match first, then an ancestor walk bounded at the root
/// (§4.12). Returns `None` if nothing in the tree up to root is managed.
pub fn resolve_canvas(
    conn: &impl XConn,
    registry: &Registry,
    window: Xid,
) -> Result<Option<Xid>> {
    if registry.find_by_window(window).is_some() {
        return Ok(Some(window));
    }
    if let Some(canvas) = registry.find_by_client(window) {
        return Ok(Some(canvas.frame));
    }

    let root = conn.root();
    for ancestor in conn.ancestors(window, root)? {
        if registry.find_by_window(ancestor).is_some() {
            return Ok(Some(ancestor));
        }
        if let Some(canvas) = registry.find_by_client(ancestor) {
            return Ok(Some(canvas.frame));
        }
    }
    Ok(None)
}

/// If the resolved canvas is the desktop but another WINDOW canvas
/// actually sits under the pointer in stacking order, reroute to that
/// window instead (§4.12 step 2). `stacking_top_to_bottom` is the root's
/// children as returned by `query_tree`, already in X stacking order.
pub fn reroute_desktop_click(
    registry: &Registry,
    resolved: Xid,
    stacking_top_to_bottom: &[Xid],
) -> Xid {
    let is_desktop = registry
        .find_by_window(resolved)
        .map(|c| c.kind == CanvasType::Desktop)
        .unwrap_or(false);
    if !is_desktop {
        return resolved;
    }
    for &win in stacking_top_to_bottom {
        if let Some(c) = registry.find_by_window(win) {
            if c.kind == CanvasType::Window {
                return win;
            }
        }
    }
    resolved
}

/// Translates a point from `from_window`'s coordinate space into
/// `to_window`'s, via the root. Returns `None` (never panics) if either
/// window was destroyed mid-translation (§4.12 "dead-reckoning").
pub fn translate(conn: &impl XConn, from_window: Xid, to_window: Xid, p: Point) -> Result<Option<Point>> {
    conn.translate_coordinates(from_window, to_window, p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::geometry::Rect;
    use crate::xconn::mock::MockXConn;

    fn rect() -> Rect {
        Rect::new(0, 0, 100, 100)
    }

    #[test]
    fn press_target_discipline_locks_until_release() {
        let mut pt = PressTarget::new();
        pt.set(Xid(10));
        assert_eq!(pt.get(), Some(Xid(10)));
        pt.clear_if_matches(Xid(99));
        assert_eq!(pt.get(), Some(Xid(10)), "must not clear on a non-matching window");
        pt.clear_if_matches(Xid(10));
        assert_eq!(pt.get(), None);
    }

    #[test]
    fn resolve_canvas_matches_client_window_to_its_frame() {
        let conn = MockXConn::new();
        let mut reg = Registry::new();
        let mut c = Canvas::new(Xid(10), CanvasType::Window, rect(), "t");
        c.client = Some(Xid(11));
        reg.insert(c).unwrap();

        let resolved = resolve_canvas(&conn, &reg, Xid(11)).unwrap();
        assert_eq!(resolved, Some(Xid(10)));
    }

    #[test]
    fn resolve_canvas_walks_ancestors_to_find_a_managed_window() {
        let conn = MockXConn::new();
        let mut reg = Registry::new();
        reg.insert(Canvas::new(Xid(10), CanvasType::Window, rect(), "t")).unwrap();
        // a popup window nested under the frame, not itself managed
        conn.set_parent(Xid(50), Xid(10));
        conn.set_parent(Xid(10), conn.root());

        let resolved = resolve_canvas(&conn, &reg, Xid(50)).unwrap();
        assert_eq!(resolved, Some(Xid(10)));
    }

    #[test]
    fn desktop_click_reroutes_to_window_under_pointer() {
        let mut reg = Registry::new();
        reg.insert(Canvas::new(Xid(1), CanvasType::Desktop, rect(), "desktop")).unwrap();
        reg.insert(Canvas::new(Xid(2), CanvasType::Window, rect(), "win")).unwrap();

        let stacking = [Xid(2), Xid(1)];
        assert_eq!(reroute_desktop_click(&reg, Xid(1), &stacking), Xid(2));
    }
}
