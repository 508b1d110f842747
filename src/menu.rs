//! Menubar singleton canvas, dropdown menus, and per-app menu
//! substitution (§4.18).
//!
//! Grounded on `examples/original_source/src/amiwb/menus/` (menu_core,
//! menu_state, menu_substitution): one menubar canvas always present at
//! the top of the desktop, a fixed "Workbench" menu set shown when no
//! client owns focus, and per-client substitution via the
//! `_AMIWB_MENU_DATA`/`_AMIWB_MENU_STATES` properties (§6) when a client
//! both sets that property and currently holds focus.

use std::collections::HashMap;

use crate::xconn::{Atom, Xid};

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub shortcut: Option<String>,
    pub enabled: bool,
    pub checked: bool,
    /// Present on items that open a nested dropdown rather than firing an
    /// action directly.
    pub submenu: Vec<MenuItem>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>) -> Self {
        MenuItem { label: label.into(), shortcut: None, enabled: true, checked: false, submenu: Vec::new() }
    }

    pub fn leaf(label: impl Into<String>, shortcut: impl Into<String>) -> Self {
        let mut item = MenuItem::new(label);
        item.shortcut = Some(shortcut.into());
        item
    }
}

#[derive(Debug, Clone)]
pub struct MenuSet {
    pub top_level: Vec<(String, Vec<MenuItem>)>,
}

impl MenuSet {
    /// The built-in Workbench menu shown when no client-supplied menu is
    /// active (§4.18). Labels and shortcuts per §6's global shortcut
    /// table.
    pub fn workbench_default() -> Self {
        MenuSet {
            top_level: vec![
                (
                    "Workbench".to_string(),
                    vec![
                        MenuItem::leaf("Execute Command...", "Amiga+E"),
                        MenuItem::new("About"),
                        MenuItem::leaf("Quit", "Amiga+Q"),
                    ],
                ),
                (
                    "Window".to_string(),
                    vec![
                        MenuItem::leaf("New Drawer", "Amiga+N"),
                        MenuItem::leaf("Close", "Amiga+K"),
                        MenuItem::leaf("Clean Up", "Amiga+C"),
                    ],
                ),
                (
                    "Icons".to_string(),
                    vec![
                        MenuItem::leaf("Open", "Amiga+O"),
                        MenuItem::leaf("Rename...", "Amiga+R"),
                        MenuItem::leaf("Information...", "Amiga+I"),
                        MenuItem::leaf("Delete...", "Amiga+D"),
                    ],
                ),
            ],
        }
    }

    /// Parses the wire format written to `_AMIWB_MENU_DATA`: top-level
    /// labels and their items separated by `|`, items separated by `,`,
    /// shortcuts appended after a `:` (§6). Malformed input yields an
    /// empty menu set rather than erroring — a broken client substitution
    /// should never crash the manager.
    pub fn parse(data: &str) -> MenuSet {
        let mut top_level = Vec::new();
        for menu_str in data.split('|').filter(|s| !s.is_empty()) {
            let mut parts = menu_str.splitn(2, ';');
            let Some(title) = parts.next() else { continue };
            let items_str = parts.next().unwrap_or("");
            let items = items_str
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|item_str| {
                    let mut fields = item_str.splitn(2, ':');
                    let label = fields.next().unwrap_or("").to_string();
                    let shortcut = fields.next().map(|s| s.to_string());
                    MenuItem { label, shortcut, enabled: true, checked: false, submenu: Vec::new() }
                })
                .collect();
            top_level.push((title.to_string(), items));
        }
        MenuSet { top_level }
    }
}

/// Per-window checked/enabled overrides written to `_AMIWB_MENU_STATES`
/// (§6), keyed by top-level-index/item-index.
pub type MenuStates = HashMap<(usize, usize), (bool, bool)>;

pub fn apply_states(menu: &mut MenuSet, states: &MenuStates) {
    for (top_idx, (_, items)) in menu.top_level.iter_mut().enumerate() {
        for (item_idx, item) in items.iter_mut().enumerate() {
            if let Some(&(enabled, checked)) = states.get(&(top_idx, item_idx)) {
                item.enabled = enabled;
                item.checked = checked;
            }
        }
    }
}

/// Tracks which client currently owns menu substitution: the focused
/// client if it both has focus and has published `_AMIWB_MENU_DATA`,
/// otherwise the built-in Workbench set (§4.18).
pub struct MenuController {
    pub menubar: Xid,
    pub current: MenuSet,
    pub substituted_by: Option<Xid>,
    pub open_path: Vec<usize>,
}

impl MenuController {
    pub fn new(menubar: Xid) -> Self {
        MenuController {
            menubar,
            current: MenuSet::workbench_default(),
            substituted_by: None,
            open_path: Vec::new(),
        }
    }

    /// Called on focus change or `_AMIWB_MENU_DATA` property update: swaps
    /// in the client's menu if it both owns focus and published one,
    /// otherwise reverts to the built-in set.
    pub fn resync(&mut self, focused_client: Option<Xid>, published: &HashMap<Xid, String>) {
        match focused_client.and_then(|c| published.get(&c).map(|data| (c, data))) {
            Some((client, data)) => {
                self.current = MenuSet::parse(data);
                self.substituted_by = Some(client);
            }
            None => {
                self.current = MenuSet::workbench_default();
                self.substituted_by = None;
            }
        }
        self.open_path.clear();
    }

    pub fn open_top_level(&mut self, index: usize) {
        if index < self.current.top_level.len() {
            self.open_path = vec![index];
        }
    }

    pub fn close(&mut self) {
        self.open_path.clear();
    }

    pub fn is_open(&self) -> bool {
        !self.open_path.is_empty()
    }
}

/// Matches a `state`/`keysym` pair against the Amiga-key global shortcut
/// table (§6) for the active menu set, returning the matched item's label.
pub fn match_shortcut(menu: &MenuSet, shortcut: &str) -> Option<&str> {
    for (_, items) in &menu.top_level {
        for item in items {
            if item.shortcut.as_deref() == Some(shortcut) && item.enabled {
                return Some(&item.label);
            }
        }
    }
    None
}

pub const AMIWB_MENU_DATA_ATOM_NAME: &str = "_AMIWB_MENU_DATA";
pub const AMIWB_MENU_STATES_ATOM_NAME: &str = "_AMIWB_MENU_STATES";

/// Resolves the atom names above to their interned `Atom` via the
/// already-interned `Atoms` table, kept as a free function rather than a
/// method since `MenuController` never needs to intern atoms itself.
pub fn menu_atoms(atoms: &crate::xconn::atom::Atoms) -> (Atom, Atom) {
    (atoms.amiwb_menu_data, atoms.amiwb_menu_states)
}
