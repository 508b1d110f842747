//! XDND v5 drag-and-drop state machine, both as source and as target
//! (§4.13), plus the bounded awareness cache.
//!
//! Grounded on `examples/original_source/src/amiwb/xdnd.c`: the cache
//! grows by doubling capacity up to a hard bound, then clears itself
//! entirely rather than evicting one entry at a time — that clear, paired
//! with a stored timestamp, is the mechanism that makes stale entries
//! eventually fall out (there is no per-entry TTL check).

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::geometry::Point;
use crate::xconn::{Atom, Xid};

pub const MAX_CACHE_SIZE: usize = 100;
const CACHE_TTL: Duration = Duration::from_secs(5);

/// Which-windows-are-XDND-aware cache. Doubles capacity (tracked only via
/// `len` against the bound, since a `HashSet` already reallocates under
/// the hood) until it would exceed `MAX_CACHE_SIZE`, then clears entirely
/// and resets its age.
pub struct AwarenessCache {
    aware: HashSet<Xid>,
    last_clear: Instant,
}

impl AwarenessCache {
    pub fn new() -> Self {
        AwarenessCache { aware: HashSet::new(), last_clear: Instant::now() }
    }

    pub fn mark_aware(&mut self, win: Xid) {
        if self.aware.len() >= MAX_CACHE_SIZE {
            self.aware.clear();
            self.last_clear = Instant::now();
        }
        self.aware.insert(win);
    }

    pub fn is_aware(&self, win: Xid) -> bool {
        self.aware.contains(&win)
    }

    /// Not a per-entry expiry: mirrors the original's behavior where
    /// staleness is only ever resolved by the bound-triggered clear. This
    /// accessor exists for diagnostics/tests, not as an eviction trigger.
    pub fn age(&self) -> Duration {
        self.last_clear.elapsed()
    }

    pub fn ttl(&self) -> Duration {
        CACHE_TTL
    }

    pub fn len(&self) -> usize {
        self.aware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aware.is_empty()
    }
}

impl Default for AwarenessCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Entered,
    Dropped,
}

/// Source-side state: amiwb is dragging a file onto some target window.
pub struct DragSource {
    pub phase: DragPhase,
    pub target: Option<Xid>,
    pub offered_type: Atom,
}

impl DragSource {
    pub fn new(offered_type: Atom) -> Self {
        DragSource { phase: DragPhase::Idle, target: None, offered_type }
    }

    pub fn enter(&mut self, target: Xid) {
        self.target = Some(target);
        self.phase = DragPhase::Entered;
    }

    pub fn leave(&mut self) {
        self.target = None;
        self.phase = DragPhase::Idle;
    }

    pub fn drop(&mut self) {
        if self.phase == DragPhase::Entered {
            self.phase = DragPhase::Dropped;
        }
    }

    pub fn finish(&mut self) {
        self.phase = DragPhase::Idle;
        self.target = None;
    }
}

/// Target-side state: some other app (or amiwb's own workbench) is
/// dragging something onto one of our canvases.
#[derive(Default)]
pub struct DropTarget {
    pub offered_types: Vec<Atom>,
    pub accepts: bool,
    pub drop_point: Option<Point>,
}

impl DropTarget {
    pub fn on_enter(&mut self, types: Vec<Atom>, accepted_types: &[Atom]) {
        self.offered_types = types;
        self.accepts = self.offered_types.iter().any(|t| accepted_types.contains(t));
    }

    pub fn on_position(&mut self, p: Point) -> bool {
        self.drop_point = Some(p);
        self.accepts
    }

    pub fn on_leave(&mut self) {
        self.offered_types.clear();
        self.accepts = false;
        self.drop_point = None;
    }

    /// Parses a `text/uri-list` payload (`file://` lines, CRLF-terminated)
    /// into local filesystem paths, per §4.13/§8 scenario S4.
    pub fn parse_uri_list(payload: &str) -> Vec<String> {
        payload
            .split("\r\n")
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.strip_prefix("file://"))
            .map(|p| p.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_clears_entirely_once_bound_is_reached() {
        let mut cache = AwarenessCache::new();
        for i in 0..MAX_CACHE_SIZE {
            cache.mark_aware(Xid(i as u32));
        }
        assert_eq!(cache.len(), MAX_CACHE_SIZE);
        cache.mark_aware(Xid(9999));
        // bound reached -> cleared, then the new entry inserted alone
        assert_eq!(cache.len(), 1);
        assert!(cache.is_aware(Xid(9999)));
        assert!(!cache.is_aware(Xid(0)));
    }

    #[test]
    fn uri_list_parses_file_scheme_lines_only() {
        let payload = "file:///tmp/a.txt\r\n# a comment\r\nfile:///tmp/b.txt\r\n";
        let files = DropTarget::parse_uri_list(payload);
        assert_eq!(files, vec!["/tmp/a.txt", "/tmp/b.txt"]);
    }

    #[test]
    fn drop_target_accepts_only_known_mime_types() {
        let mut target = DropTarget::default();
        let accepted = [Atom(1)];
        target.on_enter(vec![Atom(2)], &accepted);
        assert!(!target.accepts);
        target.on_enter(vec![Atom(1), Atom(2)], &accepted);
        assert!(target.accepts);
    }

    #[test]
    fn drag_source_phase_transitions() {
        let mut src = DragSource::new(Atom(1));
        src.enter(Xid(5));
        assert_eq!(src.phase, DragPhase::Entered);
        src.drop();
        assert_eq!(src.phase, DragPhase::Dropped);
        src.finish();
        assert_eq!(src.phase, DragPhase::Idle);
    }
}
