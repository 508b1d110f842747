//! In-memory `XConn` used by unit tests (§8 testable properties).
//!
//! Grounded on `examples/sminez-penrose/src/x/mock.rs`: a backend that
//! never talks to a real display, lets tests enqueue synthetic events and
//! assert on the calls the code under test made.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::os::unix::io::RawFd;

use super::{Atom, InputSelection, StackMode, WinKind, XConn, XEvent, Xid};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateWindow(Xid, Rect),
    DestroyWindow(Xid),
    Reparent(Xid, Xid, i32, i32),
    Map(Xid),
    Unmap(Xid),
    Configure(Xid, Rect),
    Restack(Xid, StackMode),
    SetInputFocus(Xid),
    SetPropertyString(Xid, Atom, String),
    DeleteProperty(Xid, Atom),
    SelectInput(Xid, InputSelection),
}

/// Deterministic stand-in for an X connection. All operations succeed
/// unless the window has been pushed into `destroyed`.
pub struct MockXConn {
    pub root: Xid,
    pub screen: (u32, u32),
    events: RefCell<VecDeque<XEvent>>,
    calls: RefCell<Vec<Call>>,
    next_id: RefCell<u32>,
    atoms: RefCell<HashMap<String, Atom>>,
    atom_names: RefCell<HashMap<Atom, String>>,
    next_atom: RefCell<u32>,
    properties: RefCell<HashMap<(Xid, Atom), String>>,
    properties_u32: RefCell<HashMap<(Xid, Atom), Vec<u32>>>,
    geometries: RefCell<HashMap<Xid, Rect>>,
    destroyed: RefCell<std::collections::HashSet<Xid>>,
    parents: RefCell<HashMap<Xid, Xid>>,
    selections: RefCell<HashMap<Atom, Xid>>,
}

impl MockXConn {
    pub fn new() -> Self {
        MockXConn {
            root: Xid(1),
            screen: (1920, 1080),
            events: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            next_id: RefCell::new(100),
            atoms: RefCell::new(HashMap::new()),
            atom_names: RefCell::new(HashMap::new()),
            next_atom: RefCell::new(1),
            properties: RefCell::new(HashMap::new()),
            properties_u32: RefCell::new(HashMap::new()),
            geometries: RefCell::new(HashMap::new()),
            destroyed: RefCell::new(std::collections::HashSet::new()),
            parents: RefCell::new(HashMap::new()),
            selections: RefCell::new(HashMap::new()),
        }
    }

    pub fn push_event(&self, ev: XEvent) {
        self.events.borrow_mut().push_back(ev);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn set_parent(&self, child: Xid, parent: Xid) {
        self.parents.borrow_mut().insert(child, parent);
    }

    /// Test hook: seeds a 32-bit property (e.g. `WM_NORMAL_HINTS`) for a
    /// window, as a real client would have set it before mapping.
    pub fn set_property_u32(&self, win: Xid, atom: Atom, value: Vec<u32>) {
        self.properties_u32.borrow_mut().insert((win, atom), value);
    }

    /// Test hook: seeds the geometry `get_geometry` reports for `win`.
    pub fn set_geometry(&self, win: Xid, rect: Rect) {
        self.geometries.borrow_mut().insert(win, rect);
    }

    fn alloc_id(&self) -> Xid {
        let mut n = self.next_id.borrow_mut();
        *n += 1;
        Xid(*n)
    }
}

impl Default for MockXConn {
    fn default() -> Self {
        Self::new()
    }
}

impl XConn for MockXConn {
    fn connection_fd(&self) -> RawFd {
        -1
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn wait_for_event(&self) -> Result<XEvent> {
        Ok(self.events.borrow_mut().pop_front().unwrap_or(XEvent::Unknown))
    }

    fn poll_for_event(&self) -> Result<Option<XEvent>> {
        Ok(self.events.borrow_mut().pop_front())
    }

    fn root(&self) -> Xid {
        self.root
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn intern_atom(&self, name: &str) -> Result<Atom> {
        if let Some(a) = self.atoms.borrow().get(name) {
            return Ok(*a);
        }
        let mut next = self.next_atom.borrow_mut();
        let atom = Atom(*next);
        *next += 1;
        self.atoms.borrow_mut().insert(name.to_string(), atom);
        self.atom_names.borrow_mut().insert(atom, name.to_string());
        Ok(atom)
    }

    fn atom_name(&self, atom: Atom) -> Result<String> {
        self.atom_names
            .borrow()
            .get(&atom)
            .cloned()
            .ok_or_else(|| Error::X11("unknown atom".into()))
    }

    fn create_window(&self, _kind: WinKind, geom: Rect, _parent: Xid) -> Result<Xid> {
        let id = self.alloc_id();
        self.calls.borrow_mut().push(Call::CreateWindow(id, geom));
        Ok(id)
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.destroyed.borrow_mut().insert(id);
        self.calls.borrow_mut().push(Call::DestroyWindow(id));
        Ok(())
    }

    fn reparent_window(&self, child: Xid, new_parent: Xid, x: i32, y: i32) -> Result<()> {
        self.parents.borrow_mut().insert(child, new_parent);
        self.calls.borrow_mut().push(Call::Reparent(child, new_parent, x, y));
        Ok(())
    }

    fn map_window(&self, id: Xid) -> Result<()> {
        self.calls.borrow_mut().push(Call::Map(id));
        Ok(())
    }

    fn unmap_window(&self, id: Xid) -> Result<()> {
        self.calls.borrow_mut().push(Call::Unmap(id));
        Ok(())
    }

    fn configure_window(&self, id: Xid, geom: Rect) -> Result<()> {
        self.calls.borrow_mut().push(Call::Configure(id, geom));
        Ok(())
    }

    fn restack_window(&self, id: Xid, mode: StackMode) -> Result<()> {
        self.calls.borrow_mut().push(Call::Restack(id, mode));
        Ok(())
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        if self.destroyed.borrow().contains(&id) {
            // matches §4.8: silently drop focus calls on destroyed windows
            return Ok(());
        }
        self.calls.borrow_mut().push(Call::SetInputFocus(id));
        Ok(())
    }

    fn query_tree(&self, win: Xid) -> Result<Vec<Xid>> {
        Ok(self
            .parents
            .borrow()
            .iter()
            .filter(|(_, &p)| p == win)
            .map(|(&c, _)| c)
            .collect())
    }

    fn translate_coordinates(&self, src: Xid, dst: Xid, p: Point) -> Result<Option<Point>> {
        if self.destroyed.borrow().contains(&src) || self.destroyed.borrow().contains(&dst) {
            return Ok(None);
        }
        Ok(Some(p))
    }

    fn get_property_string(&self, win: Xid, atom: Atom) -> Result<Option<String>> {
        Ok(self.properties.borrow().get(&(win, atom)).cloned())
    }

    fn set_property_string(&self, win: Xid, atom: Atom, value: &str) -> Result<()> {
        self.properties.borrow_mut().insert((win, atom), value.to_string());
        self.calls
            .borrow_mut()
            .push(Call::SetPropertyString(win, atom, value.to_string()));
        Ok(())
    }

    fn delete_property(&self, win: Xid, atom: Atom) -> Result<()> {
        self.properties.borrow_mut().remove(&(win, atom));
        self.calls.borrow_mut().push(Call::DeleteProperty(win, atom));
        Ok(())
    }

    fn grab_key(&self, _keycode: u8, _modifiers: u16) -> Result<()> {
        Ok(())
    }

    fn grab_button(&self, _win: Xid, _button: u8, _modifiers: u16) -> Result<()> {
        Ok(())
    }

    fn allow_replay_pointer(&self) -> Result<()> {
        Ok(())
    }

    fn acquire_selection(&self, selection: Atom) -> Result<bool> {
        let mut sels = self.selections.borrow_mut();
        if sels.contains_key(&selection) {
            return Ok(false);
        }
        sels.insert(selection, self.root);
        Ok(true)
    }

    fn selection_owner(&self, selection: Atom) -> Result<Xid> {
        Ok(self.selections.borrow().get(&selection).copied().unwrap_or(Xid::NONE))
    }

    fn parent_of(&self, win: Xid) -> Result<Option<Xid>> {
        Ok(self.parents.borrow().get(&win).copied())
    }

    fn get_property_u32(&self, win: Xid, atom: Atom) -> Result<Option<Vec<u32>>> {
        Ok(self.properties_u32.borrow().get(&(win, atom)).cloned())
    }

    fn get_geometry(&self, win: Xid) -> Result<Rect> {
        Ok(self.geometries.borrow().get(&win).copied().unwrap_or(Rect::new(0, 0, 1, 1)))
    }

    fn select_input(&self, win: Xid, selection: InputSelection) -> Result<()> {
        self.calls.borrow_mut().push(Call::SelectInput(win, selection));
        Ok(())
    }
}
