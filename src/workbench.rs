//! Workbench glue: ties a directory-backed canvas to the icon decoder and
//! directory scanner (§4.14/§4.15), for both file-manager windows and the
//! desktop itself.

use std::path::Path;

use crate::canvas::{Canvas, CanvasType, Registry};
use crate::canvas::layout::layout_grid;
use crate::dirscan::{scan_dir, ScanOptions, SavedPositions};
use crate::error::Result;
use crate::icons::{self, DecodedIcon};
use crate::xconn::Xid;

/// Re-scans `canvas.path` and replaces its icon set, preserving
/// already-placed positions and packing the rest (§4.15). No-op if the
/// canvas has no backing path (e.g. it isn't a workbench window).
pub fn refresh(registry: &mut Registry, frame: Xid, saved: &SavedPositions) -> Result<()> {
    let Some(canvas) = registry.find_by_window_mut(frame) else {
        return Ok(());
    };
    let Some(path) = canvas.path.clone() else {
        return Ok(());
    };

    let opts = ScanOptions { show_hidden: canvas.show_hidden };
    let mut icons = scan_dir(Path::new(&path), frame, saved, &opts)?;
    let (content_w, content_h) = layout_grid(&mut icons, canvas.rect.w, 0);

    canvas.icons = icons;
    canvas.content_width = content_w;
    canvas.content_height = content_h;
    canvas.damage.mark_whole();
    Ok(())
}

/// Creates a new workbench (file-manager) canvas rooted at `path` and
/// inserts it into the registry, already populated with its initial icon
/// scan (§4.14). `kind` lets the desktop reuse this for the root window.
pub fn open_directory(
    registry: &mut Registry,
    frame: Xid,
    kind: CanvasType,
    path: impl Into<String>,
    rect: crate::geometry::Rect,
    title: impl Into<String>,
) -> Result<()> {
    let path = path.into();
    let mut canvas = Canvas::new(frame, kind, rect, title);
    canvas.path = Some(path.clone());

    let mut icons = scan_dir(Path::new(&path), frame, &SavedPositions::new(), &ScanOptions::default())?;
    let (content_w, content_h) = layout_grid(&mut icons, rect.w, 0);
    canvas.icons = icons;
    canvas.content_width = content_w;
    canvas.content_height = content_h;

    registry.insert(canvas)
}

/// Decodes the `.info` sidecar for a single icon, falling back to the
/// kind's default icon when none exists or decoding fails (§4.2). Never
/// propagates a decode error to the caller — a bad icon file degrades to
/// the default picture rather than blocking the whole directory listing.
pub fn decode_icon_or_default(info_path: &Path, default_path: &Path) -> Option<DecodedIcon> {
    let data = std::fs::read(info_path).ok()?;
    match icons::decode(&data) {
        Ok(decoded) => Some(decoded),
        Err(_) => {
            let fallback = std::fs::read(default_path).ok()?;
            icons::decode(&fallback).ok()
        }
    }
}
