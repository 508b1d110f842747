//! Well-known atom names interned once at startup.
//!
//! Grounded on `examples/sminez-penrose/src/x11rb/atom.rs`'s approach of
//! enumerating required atom names and interning them all up front rather
//! than lazily, plus the AmiWB-specific atoms from §6.

use super::{Atom, XConn};
use crate::error::Result;

macro_rules! atoms {
    ($($field:ident => $name:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy)]
        pub struct Atoms {
            $(pub $field: Atom,)+
        }

        impl Atoms {
            pub fn intern(conn: &impl XConn) -> Result<Atoms> {
                Ok(Atoms {
                    $($field: conn.intern_atom($name)?,)+
                })
            }

            /// All interned atoms paired with their wire name, for tests
            /// that need to assert round-tripping through a mock backend.
            pub fn names() -> &'static [&'static str] {
                &[$($name),+]
            }
        }
    };
}

atoms! {
    wm_protocols => "WM_PROTOCOLS",
    wm_delete_window => "WM_DELETE_WINDOW",
    wm_take_focus => "WM_TAKE_FOCUS",
    wm_normal_hints => "WM_NORMAL_HINTS",
    wm_hints => "WM_HINTS",
    wm_transient_for => "WM_TRANSIENT_FOR",
    wm_state => "WM_STATE",

    net_wm_name => "_NET_WM_NAME",
    net_wm_state => "_NET_WM_STATE",
    net_supported => "_NET_SUPPORTED",
    net_active_window => "_NET_ACTIVE_WINDOW",

    amiwb_wm_s0 => "_AMIWB_WM_S0",
    amiwb_open_directory => "AMIWB_OPEN_DIRECTORY",
    amiwb_title_change => "_AMIWB_TITLE_CHANGE",
    amiwb_app_type => "_AMIWB_APP_TYPE",
    amiwb_menu_data => "_AMIWB_MENU_DATA",
    amiwb_menu_states => "_AMIWB_MENU_STATES",

    xdnd_aware => "XdndAware",
    xdnd_enter => "XdndEnter",
    xdnd_position => "XdndPosition",
    xdnd_status => "XdndStatus",
    xdnd_leave => "XdndLeave",
    xdnd_drop => "XdndDrop",
    xdnd_finished => "XdndFinished",
    xdnd_selection => "XdndSelection",
    xdnd_type_list => "XdndTypeList",
    xdnd_action_copy => "XdndActionCopy",

    utf8_string => "UTF8_STRING",
    text_uri_list => "text/uri-list",
    text_plain => "text/plain",
}
