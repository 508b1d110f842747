//! Directory scan → `FileIcon` population (§4.15).
//!
//! Grounded on `examples/original_source/src/amiwb/icons.c`'s
//! `create_icons_from_dir`: read the directory, build one `FileIcon` per
//! entry (skipping dotfiles unless `show_hidden`), restore saved grid
//! positions from the spatial-mode sidecar when present, fall back to the
//! default icon otherwise, then let `canvas::layout::layout_grid` pack
//! whatever wasn't placed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::canvas::icon::IconKind;
use crate::canvas::layout::layout_grid;
use crate::canvas::FileIcon;
use crate::error::Result;
use crate::xconn::Xid;

/// Saved `(x, y)` positions from a directory's `.info`-style sidecar, or
/// from AmigaOS extended attributes on each file (§4.15 spatial mode).
/// Kept separate from the filesystem walk so tests can inject positions
/// without touching xattrs.
pub type SavedPositions = HashMap<String, (i32, i32)>;

pub struct ScanOptions {
    pub show_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions { show_hidden: false }
    }
}

/// Scans `dir`, producing one icon per visible entry, in the canvas's
/// window (`display_window`). Positions named in `saved` are restored
/// verbatim; everything else is left at the unplaced sentinel for the
/// caller to pack with `layout_grid`.
pub fn scan_dir(
    dir: &Path,
    display_window: Xid,
    saved: &SavedPositions,
    opts: &ScanOptions,
) -> Result<Vec<FileIcon>> {
    let mut icons = Vec::new();

    let entries = fs::read_dir(dir)?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !opts.show_hidden && name.starts_with('.') {
            continue;
        }

        let file_type = entry.file_type()?;
        let kind = if file_type.is_dir() { IconKind::Drawer } else { IconKind::File };

        let mut icon = FileIcon::new(name.clone(), entry.path().to_string_lossy(), kind, display_window);
        icon.width = default_icon_size(kind).0;
        icon.height = default_icon_size(kind).1;

        if let Some(&(x, y)) = saved.get(&name) {
            icon.x = x;
            icon.y = y;
        } else {
            icon.x = -1;
            icon.y = -1;
        }

        icons.push(icon);
    }

    icons.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(icons)
}

/// Scans and immediately packs unplaced icons into the grid, returning
/// the resulting content extent alongside the icons (§4.14/§4.15).
pub fn scan_and_layout(
    dir: &Path,
    display_window: Xid,
    saved: &SavedPositions,
    opts: &ScanOptions,
    canvas_width: u32,
) -> Result<(Vec<FileIcon>, (u32, u32))> {
    let mut icons = scan_dir(dir, display_window, saved, opts)?;
    let extent = layout_grid(&mut icons, canvas_width, 0);
    Ok((icons, extent))
}

/// Default unscaled icon footprint per kind, used before a real decoded
/// picture is available (§4.2's decoder fills in the exact size later).
fn default_icon_size(kind: IconKind) -> (u32, u32) {
    match kind {
        IconKind::Drawer => (48, 32),
        IconKind::Device => (48, 32),
        IconKind::File | IconKind::Iconified => (32, 32),
    }
}

/// Resolves the default "no .info found" icon path for a given kind, used
/// by the render layer when the real decoder found nothing (§4.2).
pub fn default_icon_path(kind: IconKind, resource_dir: &Path) -> PathBuf {
    let name = match kind {
        IconKind::Drawer => "def_drawer.info",
        IconKind::Device => "def_device.info",
        IconKind::Iconified => "def_tool.info",
        IconKind::File => "def_file.info",
    };
    resource_dir.join(name)
}
