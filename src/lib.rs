//! amiwb: an X11 window manager and desktop shell reproducing the Amiga
//! Workbench experience.
//!
//! The crate is organized around one seam, [`xconn::XConn`], that every
//! other module talks through instead of holding a live X connection
//! directly. This keeps the event-routing, compositing, and workbench
//! logic testable against [`xconn::mock::MockXConn`] without a display.

pub mod canvas;
pub mod compositor;
pub mod config;
pub mod dialog;
pub mod dirscan;
pub mod dispatcher;
pub mod error;
pub mod fileops;
pub mod framing;
pub mod geometry;
pub mod icons;
pub mod log;
pub mod menu;
pub mod render;
pub mod router;
pub mod workbench;
pub mod xconn;
pub mod xdnd;

pub use error::{Error, Result};
