//! Concrete `XConn` backed by `x11rb`.
//!
//! Grounded on `examples/sminez-penrose/src/x11rb/xconn.rs`: a thin struct
//! wrapping a `RustConnection` plus the interned atom table, translating
//! between amiwb's neutral types ([`Xid`], [`XEvent`]) and x11rb's wire
//! types at the boundary only.

use std::os::unix::io::{AsRawFd, RawFd};

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    Atom as XcbAtom, AtomEnum, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt as _,
    CreateWindowAux, EventMask, PropMode, Screen, StackMode as XcbStackMode, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use super::{Atom, InputSelection, StackMode, WinKind, XConn, XEvent, Xid};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};

pub struct X11rbConn {
    conn: RustConnection,
    screen_num: usize,
}

impl X11rbConn {
    pub fn connect(display_name: Option<&str>) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(display_name)
            .map_err(|e| Error::X11(format!("failed to open display: {e}")))?;

        let this = X11rbConn { conn, screen_num };
        this.check_required_extensions()?;
        Ok(this)
    }

    fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }

    /// Compositor (§4.9) hard-requires Composite, Damage, XFixes, Render.
    fn check_required_extensions(&self) -> Result<()> {
        use x11rb::protocol::composite::ConnectionExt as _;
        use x11rb::protocol::damage::ConnectionExt as _;
        use x11rb::protocol::render::ConnectionExt as _;
        use x11rb::protocol::xfixes::ConnectionExt as _;

        self.conn
            .composite_query_version(0, 4)
            .map_err(|_| Error::MissingExtension("Composite"))?
            .reply()
            .map_err(|_| Error::MissingExtension("Composite"))?;
        self.conn
            .damage_query_version(1, 1)
            .map_err(|_| Error::MissingExtension("Damage"))?
            .reply()
            .map_err(|_| Error::MissingExtension("Damage"))?;
        self.conn
            .xfixes_query_version(5, 0)
            .map_err(|_| Error::MissingExtension("XFixes"))?
            .reply()
            .map_err(|_| Error::MissingExtension("XFixes"))?;
        self.conn
            .render_query_version(0, 11)
            .map_err(|_| Error::MissingExtension("Render"))?
            .reply()
            .map_err(|_| Error::MissingExtension("Render"))?;
        Ok(())
    }

    fn win(id: Xid) -> Window {
        id.0
    }

    fn xid(win: Window) -> Xid {
        Xid(win)
    }
}

impl XConn for X11rbConn {
    fn connection_fd(&self) -> RawFd {
        self.conn.stream().as_raw_fd()
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush().map_err(|e| Error::X11(e.to_string()))
    }

    fn wait_for_event(&self) -> Result<XEvent> {
        let ev = self.conn.wait_for_event().map_err(|e| Error::X11(e.to_string()))?;
        Ok(event::to_xevent(ev))
    }

    fn poll_for_event(&self) -> Result<Option<XEvent>> {
        match self.conn.poll_for_event().map_err(|e| Error::X11(e.to_string()))? {
            Some(ev) => Ok(Some(event::to_xevent(ev))),
            None => Ok(None),
        }
    }

    fn root(&self) -> Xid {
        Xid(self.screen().root)
    }

    fn screen_size(&self) -> (u32, u32) {
        let s = self.screen();
        (s.width_in_pixels as u32, s.height_in_pixels as u32)
    }

    fn intern_atom(&self, name: &str) -> Result<Atom> {
        let reply = self
            .conn
            .intern_atom(false, name.as_bytes())
            .map_err(|e| Error::X11(e.to_string()))?
            .reply()
            .map_err(|e| Error::X11(e.to_string()))?;
        Ok(Atom(reply.atom))
    }

    fn atom_name(&self, atom: Atom) -> Result<String> {
        let reply = self
            .conn
            .get_atom_name(atom.0 as XcbAtom)
            .map_err(|e| Error::X11(e.to_string()))?
            .reply()
            .map_err(|e| Error::X11(e.to_string()))?;
        String::from_utf8(reply.name).map_err(|e| Error::X11(e.to_string()))
    }

    fn create_window(&self, kind: WinKind, geom: Rect, parent: Xid) -> Result<Xid> {
        let id = self.conn.generate_id().map_err(|e| Error::X11(e.to_string()))?;
        let class = match kind {
            WinKind::Frame => WindowClass::INPUT_OUTPUT,
            WinKind::InputOnly => WindowClass::INPUT_ONLY,
        };
        let aux = ChangeWindowAttributesAux::new().event_mask(
            EventMask::SUBSTRUCTURE_NOTIFY
                | EventMask::SUBSTRUCTURE_REDIRECT
                | EventMask::BUTTON_PRESS
                | EventMask::BUTTON_RELEASE
                | EventMask::POINTER_MOTION
                | EventMask::EXPOSURE
                | EventMask::PROPERTY_CHANGE,
        );
        self.conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                id,
                Self::win(parent),
                geom.x as i16,
                geom.y as i16,
                geom.w as u16,
                geom.h as u16,
                0,
                class,
                x11rb::COPY_FROM_PARENT,
                &CreateWindowAux::from(aux),
            )
            .map_err(|e| Error::X11(e.to_string()))?;
        Ok(Self::xid(id))
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        // BadWindow here is expected during shutdown races (§7); swallow
        // it rather than surfacing an error to the caller.
        let _ = self.conn.destroy_window(Self::win(id));
        Ok(())
    }

    fn reparent_window(&self, child: Xid, new_parent: Xid, x: i32, y: i32) -> Result<()> {
        self.conn
            .reparent_window(Self::win(child), Self::win(new_parent), x as i16, y as i16)
            .map_err(|e| Error::X11(e.to_string()))?;
        Ok(())
    }

    fn map_window(&self, id: Xid) -> Result<()> {
        let _ = self.conn.map_window(Self::win(id));
        Ok(())
    }

    fn unmap_window(&self, id: Xid) -> Result<()> {
        let _ = self.conn.unmap_window(Self::win(id));
        Ok(())
    }

    fn configure_window(&self, id: Xid, geom: Rect) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(geom.x)
            .y(geom.y)
            .width(geom.w)
            .height(geom.h);
        let _ = self.conn.configure_window(Self::win(id), &aux);
        Ok(())
    }

    fn restack_window(&self, id: Xid, mode: StackMode) -> Result<()> {
        let xcb_mode = match mode {
            StackMode::Above => XcbStackMode::ABOVE,
            StackMode::Below => XcbStackMode::BELOW,
        };
        let aux = ConfigureWindowAux::new().stack_mode(xcb_mode);
        let _ = self.conn.configure_window(Self::win(id), &aux);
        Ok(())
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        let _ = self.conn.set_input_focus(
            x11rb::protocol::xproto::InputFocus::PARENT,
            Self::win(id),
            x11rb::CURRENT_TIME,
        );
        Ok(())
    }

    fn query_tree(&self, win: Xid) -> Result<Vec<Xid>> {
        let reply = self
            .conn
            .query_tree(Self::win(win))
            .map_err(|e| Error::X11(e.to_string()))?
            .reply()
            .map_err(|e| Error::X11(e.to_string()))?;
        Ok(reply.children.into_iter().map(Self::xid).collect())
    }

    fn translate_coordinates(&self, src: Xid, dst: Xid, p: Point) -> Result<Option<Point>> {
        match self
            .conn
            .translate_coordinates(Self::win(src), Self::win(dst), p.x as i16, p.y as i16)
        {
            Ok(cookie) => match cookie.reply() {
                Ok(reply) => Ok(Some(Point::new(reply.dst_x as i32, reply.dst_y as i32))),
                Err(_) => Ok(None),
            },
            Err(_) => Ok(None),
        }
    }

    fn get_property_string(&self, win: Xid, atom: Atom) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(
                false,
                Self::win(win),
                atom.0 as XcbAtom,
                AtomEnum::ANY,
                0,
                u32::MAX,
            )
            .map_err(|e| Error::X11(e.to_string()))?
            .reply()
            .map_err(|e| Error::X11(e.to_string()))?;
        if reply.value.is_empty() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&reply.value).into_owned()))
    }

    fn set_property_string(&self, win: Xid, atom: Atom, value: &str) -> Result<()> {
        self.conn
            .change_property8(
                PropMode::REPLACE,
                Self::win(win),
                atom.0 as XcbAtom,
                AtomEnum::STRING,
                value.as_bytes(),
            )
            .map_err(|e| Error::X11(e.to_string()))?;
        Ok(())
    }

    fn delete_property(&self, win: Xid, atom: Atom) -> Result<()> {
        let _ = self.conn.delete_property(Self::win(win), atom.0 as XcbAtom);
        Ok(())
    }

    fn grab_key(&self, keycode: u8, modifiers: u16) -> Result<()> {
        use x11rb::protocol::xproto::{GrabMode, ModMask};
        // NumLock/CapsLock/ScrollLock independence: grab the combination
        // with every combination of the three lock masks, matching
        // `examples/sminez-penrose/src/x11rb/xconn.rs`'s `grab_keys`.
        const NUM_LOCK: u16 = ModMask::M2 as u16;
        const CAPS_LOCK: u16 = ModMask::LOCK as u16;
        const LOCK_COMBOS: [u16; 4] = [0, NUM_LOCK, CAPS_LOCK, NUM_LOCK | CAPS_LOCK];
        for lock in LOCK_COMBOS {
            let _ = self.conn.grab_key(
                true,
                self.root().0,
                modifiers | lock,
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            );
        }
        Ok(())
    }

    fn grab_button(&self, win: Xid, button: u8, modifiers: u16) -> Result<()> {
        use x11rb::protocol::xproto::GrabMode;
        let _ = self.conn.grab_button(
            false,
            Self::win(win),
            (EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE).into(),
            GrabMode::SYNC,
            GrabMode::ASYNC,
            x11rb::NONE,
            x11rb::NONE,
            button,
            modifiers,
        );
        Ok(())
    }

    fn allow_replay_pointer(&self) -> Result<()> {
        use x11rb::protocol::xproto::Allow;
        let _ = self.conn.allow_events(Allow::REPLAY_POINTER, x11rb::CURRENT_TIME);
        Ok(())
    }

    fn acquire_selection(&self, selection: Atom) -> Result<bool> {
        let owner_win = self.root().0; // a dedicated invisible window is created by main.rs in practice
        self.conn
            .set_selection_owner(owner_win, selection.0 as XcbAtom, x11rb::CURRENT_TIME)
            .map_err(|e| Error::X11(e.to_string()))?;
        let current = self.selection_owner(selection)?;
        Ok(current.0 == owner_win)
    }

    fn selection_owner(&self, selection: Atom) -> Result<Xid> {
        let reply = self
            .conn
            .get_selection_owner(selection.0 as XcbAtom)
            .map_err(|e| Error::X11(e.to_string()))?
            .reply()
            .map_err(|e| Error::X11(e.to_string()))?;
        Ok(Self::xid(reply.owner))
    }

    fn parent_of(&self, win: Xid) -> Result<Option<Xid>> {
        let reply = match self.conn.query_tree(Self::win(win)) {
            Ok(cookie) => match cookie.reply() {
                Ok(r) => r,
                Err(_) => return Ok(None),
            },
            Err(_) => return Ok(None),
        };
        if reply.parent == 0 {
            Ok(None)
        } else {
            Ok(Some(Self::xid(reply.parent)))
        }
    }

    fn get_property_u32(&self, win: Xid, atom: Atom) -> Result<Option<Vec<u32>>> {
        let reply = self
            .conn
            .get_property(
                false,
                Self::win(win),
                atom.0 as XcbAtom,
                AtomEnum::ANY,
                0,
                u32::MAX,
            )
            .map_err(|e| Error::X11(e.to_string()))?
            .reply()
            .map_err(|e| Error::X11(e.to_string()))?;
        if reply.value.is_empty() {
            return Ok(None);
        }
        match reply.value32() {
            Some(words) => Ok(Some(words.collect())),
            None => Ok(None),
        }
    }

    fn get_geometry(&self, win: Xid) -> Result<Rect> {
        let reply = self
            .conn
            .get_geometry(Self::win(win))
            .map_err(|e| Error::X11(e.to_string()))?
            .reply()
            .map_err(|e| Error::X11(e.to_string()))?;
        Ok(Rect::new(
            reply.x as i32,
            reply.y as i32,
            reply.width as u32,
            reply.height as u32,
        ))
    }

    fn select_input(&self, win: Xid, selection: InputSelection) -> Result<()> {
        let mask = match selection {
            InputSelection::Frame => {
                EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT | EventMask::PROPERTY_CHANGE
            }
            InputSelection::Client => EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY,
        };
        let aux = ChangeWindowAttributesAux::new().event_mask(mask);
        let _ = self.conn.change_window_attributes(Self::win(win), &aux);
        Ok(())
    }
}

mod event {
    use super::*;

    pub(super) fn to_xevent(ev: Event) -> XEvent {
        match ev {
            Event::MapRequest(e) => XEvent::MapRequest { window: Xid(e.window) },
            Event::ConfigureRequest(e) => XEvent::ConfigureRequest {
                window: Xid(e.window),
                x: e.x as i32,
                y: e.y as i32,
                width: e.width,
                height: e.height,
            },
            Event::MapNotify(e) => XEvent::MapNotify { window: Xid(e.window) },
            Event::UnmapNotify(e) => XEvent::UnmapNotify { window: Xid(e.window) },
            Event::DestroyNotify(e) => XEvent::DestroyNotify { window: Xid(e.window) },
            Event::ConfigureNotify(e) => XEvent::ConfigureNotify {
                window: Xid(e.window),
                x: e.x as i32,
                y: e.y as i32,
                width: e.width,
                height: e.height,
            },
            Event::ButtonPress(e) => XEvent::ButtonPress {
                window: Xid(e.event),
                root: Xid(e.root),
                root_pos: Point::new(e.root_x as i32, e.root_y as i32),
                event_pos: Point::new(e.event_x as i32, e.event_y as i32),
                button: e.detail,
                state: e.state.into(),
            },
            Event::ButtonRelease(e) => XEvent::ButtonRelease {
                window: Xid(e.event),
                root: Xid(e.root),
                root_pos: Point::new(e.root_x as i32, e.root_y as i32),
                event_pos: Point::new(e.event_x as i32, e.event_y as i32),
                button: e.detail,
                state: e.state.into(),
            },
            Event::MotionNotify(e) => XEvent::MotionNotify {
                window: Xid(e.event),
                root: Xid(e.root),
                root_pos: Point::new(e.root_x as i32, e.root_y as i32),
                event_pos: Point::new(e.event_x as i32, e.event_y as i32),
                state: e.state.into(),
            },
            Event::KeyPress(e) => XEvent::KeyPress {
                window: Xid(e.event),
                keycode: e.detail,
                state: e.state.into(),
            },
            Event::PropertyNotify(e) => XEvent::PropertyNotify {
                window: Xid(e.window),
                atom: Atom(e.atom),
                deleted: e.state == x11rb::protocol::xproto::Property::DELETE,
            },
            Event::ClientMessage(e) => {
                let data = e.data.as_data32();
                XEvent::ClientMessage {
                    window: Xid(e.window),
                    message_type: Atom(e.type_),
                    data,
                }
            }
            Event::SelectionNotify(e) => XEvent::SelectionNotify {
                requestor: Xid(e.requestor),
                selection: Atom(e.selection),
                target: Atom(e.target),
                property: Atom(e.property),
            },
            Event::SelectionRequest(e) => XEvent::SelectionRequest {
                owner: Xid(e.owner),
                requestor: Xid(e.requestor),
                selection: Atom(e.selection),
                target: Atom(e.target),
                property: Atom(e.property),
            },
            Event::DamageNotify(e) => XEvent::DamageNotify {
                drawable: Xid(e.drawable),
                area: Rect::new(
                    e.area.x as i32,
                    e.area.y as i32,
                    e.area.width as u32,
                    e.area.height as u32,
                ),
            },
            _ => XEvent::Unknown,
        }
    }
}
