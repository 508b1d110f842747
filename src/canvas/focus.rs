//! Active-canvas tracking and cycling (§4.8).

use super::{CanvasType, Registry};
use crate::xconn::{XConn, Xid};
use crate::error::Result;

#[derive(Default)]
pub struct FocusState {
    pub active: Option<Xid>,
    /// Creation-ordered list of managed WINDOW canvases, for `next`/`prev`.
    cycle_order: Vec<Xid>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, frame: Xid) {
        if !self.cycle_order.contains(&frame) {
            self.cycle_order.push(frame);
        }
    }

    pub fn unregister(&mut self, frame: Xid) {
        self.cycle_order.retain(|&w| w != frame);
        if self.active == Some(frame) {
            self.active = None;
        }
    }

    /// Sets `frame` active, redraws old/new titles (checker variant
    /// differs), and issues `SetInputFocus` to the client if present, else
    /// the frame itself. Silently no-ops focus calls against a window that
    /// no longer exists (§4.8): the mock/real `XConn::set_input_focus`
    /// implementations are themselves responsible for swallowing that.
    pub fn activate(&mut self, conn: &impl XConn, registry: &mut Registry, frame: Xid) -> Result<()> {
        let prev = self.active;
        self.active = Some(frame);

        if let Some(prev) = prev {
            if prev != frame {
                if let Some(c) = registry.find_by_window_mut(prev) {
                    c.damage.mark_whole();
                }
            }
        }

        let target = match registry.find_by_window(frame) {
            Some(c) => c.client.unwrap_or(frame),
            None => frame,
        };
        conn.set_input_focus(target)?;

        if let Some(c) = registry.find_by_window_mut(frame) {
            c.damage.mark_whole();
        }
        Ok(())
    }

    /// Walks `cycle_order` forward (or backward) from the active canvas,
    /// skipping to the next WINDOW canvas still present in the registry.
    pub fn cycle(&mut self, registry: &Registry, forward: bool) -> Option<Xid> {
        if self.cycle_order.is_empty() {
            return None;
        }
        let start_idx = self
            .active
            .and_then(|a| self.cycle_order.iter().position(|&w| w == a))
            .unwrap_or(0);
        let len = self.cycle_order.len();
        for step in 1..=len {
            let idx = if forward {
                (start_idx + step) % len
            } else {
                (start_idx + len - step) % len
            };
            let candidate = self.cycle_order[idx];
            if let Some(c) = registry.find_by_window(candidate) {
                if c.kind == CanvasType::Window {
                    return Some(candidate);
                }
            }
        }
        None
    }
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
    fn cycle_skips_removed_canvases_and_wraps() {
        let mut reg = Registry::new();
        let mut focus = FocusState::new();
        for id in [1u32, 2, 3] {
            reg.insert(Canvas::new(Xid(id), CanvasType::Window, rect(), "t")).unwrap();
            focus.register(Xid(id));
        }
        focus.active = Some(Xid(1));
        assert_eq!(focus.cycle(&reg, true), Some(Xid(2)));

        reg.remove(Xid(2));
        assert_eq!(focus.cycle(&reg, true), Some(Xid(3)));
    }

    #[test]
    fn activate_updates_active_and_focuses_client() {
        let conn = MockXConn::new();
        let mut reg = Registry::new();
        let mut c = Canvas::new(Xid(10), CanvasType::Window, rect(), "t");
        c.client = Some(Xid(11));
        reg.insert(c).unwrap();
        let mut focus = FocusState::new();
        focus.activate(&conn, &mut reg, Xid(10)).unwrap();
        assert_eq!(focus.active, Some(Xid(10)));
        assert!(conn
            .calls()
            .iter()
            .any(|call| matches!(call, crate::xconn::mock::Call::SetInputFocus(Xid(11)))));
    }
}
