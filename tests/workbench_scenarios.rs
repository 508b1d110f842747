//! End-to-end scenarios crossing the workbench, dialog, and drag-and-drop
//! modules, mirroring §8's labeled scenarios S3 and S4.

use std::sync::atomic::{AtomicU32, Ordering};

use amiwb::canvas::{CanvasType, Registry};
use amiwb::dialog::rename::RenameDialog;
use amiwb::dirscan::SavedPositions;
use amiwb::geometry::Rect;
use amiwb::workbench;
use amiwb::xconn::{Atom, Xid};
use amiwb::xdnd::DropTarget;
use amiwb_keysyms::XKeySym;

fn tempdir() -> std::path::PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("amiwb-workbench-scenario-{}-{}", std::process::id(), n));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// S3 — renaming an icon through the dialog renames the file on disk and
/// a subsequent directory refresh shows it under its new label.
#[test]
fn s3_rename_dialog_commit_renames_the_file_and_refresh_picks_it_up() {
    let dir = tempdir();
    std::fs::write(dir.join("a.txt"), b"hello").unwrap();

    let mut registry = Registry::new();
    let rect = Rect::new(0, 0, 800, 600);
    workbench::open_directory(&mut registry, Xid(1), CanvasType::Window, dir.to_string_lossy(), rect, "dir")
        .unwrap();
    assert_eq!(registry.find_by_window(Xid(1)).unwrap().icons[0].label, "a.txt");

    // `new()` pre-fills the field with the original name; clear it first
    // so typing the replacement doesn't append to "a.txt".
    let mut dialog = RenameDialog::new(Xid(1), dir.join("a.txt").to_string_lossy(), "a.txt", Rect::new(0, 0, 100, 20));
    while !dialog.field.text.is_empty() {
        dialog.field.backspace();
    }
    for c in "b.txt".chars() {
        dialog.field.insert_char(c);
    }
    let new_name = dialog
        .on_key(XKeySym::XK_Return)
        .flatten()
        .expect("Enter confirms with a name");

    std::fs::rename(dir.join("a.txt"), dir.join(&new_name)).unwrap();
    workbench::refresh(&mut registry, Xid(1), &SavedPositions::new()).unwrap();

    let canvas = registry.find_by_window(Xid(1)).unwrap();
    assert_eq!(canvas.icons.len(), 1);
    assert_eq!(canvas.icons[0].label, "b.txt");

    std::fs::remove_dir_all(&dir).ok();
}

/// S4 — a drop target that only understands `text/uri-list` accepts the
/// enter, tracks the drop point, and the URI payload resolves to a local
/// path once the selection notify delivers it.
#[test]
fn s4_xdnd_drop_of_one_uri_resolves_to_a_local_path() {
    let uri_list = Atom(900);
    let mut target = DropTarget::default();

    target.on_enter(vec![uri_list], &[uri_list]);
    assert!(target.accepts);

    let accepted = target.on_position(amiwb::geometry::Point::new(42, 17));
    assert!(accepted);
    assert_eq!(target.drop_point, Some(amiwb::geometry::Point::new(42, 17)));

    let paths = DropTarget::parse_uri_list("file:///tmp/x\r\n");
    assert_eq!(paths, vec!["/tmp/x".to_string()]);

    target.on_leave();
    assert!(!target.accepts);
    assert!(target.offered_types.is_empty());
}

/// A drop target offering only a type nobody asked for is rejected
/// outright, never silently "accepted" with an empty type list.
#[test]
fn drop_target_rejects_unknown_offered_types() {
    let plain_text = Atom(1);
    let uri_list = Atom(2);
    let mut target = DropTarget::default();
    target.on_enter(vec![plain_text], &[uri_list]);
    assert!(!target.accepts);
}
