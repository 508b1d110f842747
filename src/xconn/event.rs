//! Backend-neutral event representation.
//!
//! The concrete x11rb backend translates `x11rb::protocol::Event` into
//! this enum; the mock backend constructs it directly for tests. The
//! router (§4.12) only ever matches on `XEvent`.

use super::{Atom, Xid};
use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XEvent {
    MapRequest {
        window: Xid,
    },
    ConfigureRequest {
        window: Xid,
        x: i32,
        y: i32,
        width: u16,
        height: u16,
    },
    MapNotify {
        window: Xid,
    },
    UnmapNotify {
        window: Xid,
    },
    DestroyNotify {
        window: Xid,
    },
    ConfigureNotify {
        window: Xid,
        x: i32,
        y: i32,
        width: u16,
        height: u16,
    },
    ButtonPress {
        window: Xid,
        root: Xid,
        root_pos: Point,
        event_pos: Point,
        button: u8,
        state: u16,
    },
    ButtonRelease {
        window: Xid,
        root: Xid,
        root_pos: Point,
        event_pos: Point,
        button: u8,
        state: u16,
    },
    MotionNotify {
        window: Xid,
        root: Xid,
        root_pos: Point,
        event_pos: Point,
        state: u16,
    },
    KeyPress {
        window: Xid,
        keycode: u8,
        state: u16,
    },
    PropertyNotify {
        window: Xid,
        atom: Atom,
        deleted: bool,
    },
    ClientMessage {
        window: Xid,
        message_type: Atom,
        data: [u32; 5],
    },
    DamageNotify {
        drawable: Xid,
        area: crate::geometry::Rect,
    },
    SelectionNotify {
        requestor: Xid,
        selection: Atom,
        target: Atom,
        property: Atom,
    },
    SelectionRequest {
        owner: Xid,
        requestor: Xid,
        selection: Atom,
        target: Atom,
        property: Atom,
    },
    Unknown,
}
