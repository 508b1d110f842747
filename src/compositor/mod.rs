//! Damage-driven compositor (§4.9).
//!
//! Tracks one [`crate::geometry::Damage`] region per canvas plus a small
//! set of override-redirect windows (client tooltips, their own popup
//! menus) that aren't canvases but still need compositing above
//! everything managed. Paint order is fixed: desktop, managed windows in
//! stacking order, override-redirects, then menus/dialogs last.

pub mod scheduler;

use std::collections::HashMap;

use crate::canvas::{CanvasType, Registry};
use crate::geometry::Rect;
use crate::xconn::{XConn, Xid};
use crate::error::Result;

#[derive(Default)]
pub struct OverrideRedirect {
    pub damage: crate::geometry::Damage,
}

pub struct Compositor {
    overrides: HashMap<Xid, OverrideRedirect>,
}

impl Compositor {
    pub fn new() -> Self {
        Compositor { overrides: HashMap::new() }
    }

    pub fn track_override(&mut self, win: Xid) {
        self.overrides.entry(win).or_default();
    }

    pub fn untrack_override(&mut self, win: Xid) {
        self.overrides.remove(&win);
    }

    /// Accumulates a damage rect into the canvas owning `drawable`, or
    /// into the matching override-redirect record.
    pub fn on_damage(&mut self, registry: &mut Registry, drawable: Xid, area: Rect) {
        if let Some(canvas) = registry.find_by_window_mut(drawable) {
            canvas.damage.add(area);
            return;
        }
        if let Some(ov) = self.overrides.get_mut(&drawable) {
            ov.damage.add(area);
        }
    }

    /// One composite pass: back-to-front over desktop, managed windows,
    /// override-redirects, then dialogs/menus; clears damage as it goes.
    /// Returns the windows actually repainted, for tests/diagnostics.
    pub fn paint(&mut self, conn: &impl XConn, registry: &mut Registry) -> Result<Vec<Xid>> {
        let mut painted = Vec::new();

        for kind in [CanvasType::Desktop, CanvasType::Window] {
            for canvas in registry.iter_mut().filter(|c| c.kind == kind) {
                if canvas.damage.is_dirty() {
                    painted.push(canvas.frame);
                    canvas.damage.clear();
                }
            }
        }

        for (win, ov) in self.overrides.iter_mut() {
            if ov.damage.is_dirty() {
                painted.push(*win);
                ov.damage.clear();
            }
        }

        for kind in [CanvasType::Dialog, CanvasType::Menu] {
            for canvas in registry.iter_mut().filter(|c| c.kind == kind) {
                if canvas.damage.is_dirty() {
                    painted.push(canvas.frame);
                    canvas.damage.clear();
                }
            }
        }

        conn.flush()?;
        Ok(painted)
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}
