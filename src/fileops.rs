//! File operations core: copy/move/delete with xattr preservation and
//! fork+pipe progress reporting (§4.16).
//!
//! Grounded on `examples/original_source/src/amiwb/workbench.c`'s
//! `perform_file_operation`: a non-recursive, explicit-stack directory
//! walk (so pathological nesting can't blow the process stack) feeding a
//! flat work queue, executed in a forked child that reports progress back
//! to the parent over a pipe as newline-framed `done/total/path` records.

use std::collections::VecDeque;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use nix::unistd::{fork, ForkResult, Pid};

use crate::error::{Error, Result};

/// Queue capacity past which amiwb logs a warning but keeps going — huge
/// trees are slow, not wrong, so unlike the awareness cache this never
/// rejects (§4.16).
pub const QUEUE_WARN_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Copy,
    Move,
    Delete,
}

#[derive(Debug, Clone)]
pub struct WorkItem {
    pub src: PathBuf,
    pub dst: Option<PathBuf>,
    pub is_dir: bool,
}

/// Walks `src` non-recursively (an explicit `Vec`-backed stack rather
/// than function recursion) and builds the flat list of copy/move/delete
/// work items, directories first so destination dirs exist before their
/// children are written.
pub fn build_queue(op: OpKind, src: &Path, dst_root: Option<&Path>) -> Result<Vec<WorkItem>> {
    let mut queue = Vec::new();
    let mut stack = VecDeque::new();
    stack.push_back(src.to_path_buf());

    while let Some(path) = stack.pop_front() {
        let meta = fs::symlink_metadata(&path)?;
        let rel = path.strip_prefix(src).unwrap_or(&path);
        let dst = dst_root.map(|root| if rel.as_os_str().is_empty() { root.to_path_buf() } else { root.join(rel) });

        if meta.is_dir() {
            queue.push(WorkItem { src: path.clone(), dst: dst.clone(), is_dir: true });
            for entry in fs::read_dir(&path)? {
                stack.push_back(entry?.path());
            }
        } else {
            queue.push(WorkItem { src: path, dst, is_dir: false });
        }

        if queue.len() == QUEUE_WARN_THRESHOLD {
            tracing::warn!(op = ?op, count = queue.len(), "file operation queue exceeds warn threshold, continuing");
        }
    }

    Ok(queue)
}

/// Progress update as sent down the pipe from the worker to whatever is
/// driving the progress dialog (§4.17 ProgressDialog).
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub bytes_done: u64,
    pub bytes_total: u64,
    pub current_file: String,
}

impl Progress {
    /// `done/total/path\n` newline-framed wire format, chosen so a
    /// blocking line reader on the parent side never needs a length
    /// prefix (§4.16).
    pub fn encode(&self) -> String {
        format!("{}/{}/{}\n", self.bytes_done, self.bytes_total, self.current_file)
    }

    pub fn decode(line: &str) -> Option<Progress> {
        let line = line.trim_end_matches('\n');
        let mut parts = line.splitn(3, '/');
        let bytes_done: u64 = parts.next()?.parse().ok()?;
        let bytes_total: u64 = parts.next()?.parse().ok()?;
        let current_file = parts.next()?.to_string();
        Some(Progress { bytes_done, bytes_total, current_file })
    }
}

/// Executes one queue in-process, writing a `Progress` line to `report`
/// after every item. Runs in the forked child in production; called
/// directly (no fork) in tests against a `UnixStream` pair.
pub fn run_queue(op: OpKind, queue: &[WorkItem], report: &mut impl Write) -> Result<()> {
    let total: u64 = queue
        .iter()
        .filter(|i| !i.is_dir)
        .map(|i| fs::metadata(&i.src).map(|m| m.len()).unwrap_or(0))
        .sum();
    let mut done = 0u64;

    for item in queue {
        let item_size = if item.is_dir { 0 } else { fs::metadata(&item.src).map(|m| m.len()).unwrap_or(0) };

        match op {
            OpKind::Delete => {
                if item.is_dir {
                    fs::remove_dir(&item.src).ok();
                } else {
                    fs::remove_file(&item.src)?;
                }
            }
            OpKind::Copy | OpKind::Move => {
                let dst = item.dst.as_ref().ok_or_else(|| Error::FileOp(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "missing destination for copy/move item",
                )))?;
                if item.is_dir {
                    fs::create_dir_all(dst)?;
                } else {
                    fs::copy(&item.src, dst)?;
                    preserve_xattrs(&item.src, dst);
                    if op == OpKind::Move {
                        fs::remove_file(&item.src)?;
                    }
                }
            }
        }

        done += item_size;
        let progress = Progress {
            bytes_done: done,
            bytes_total: total,
            current_file: item.src.display().to_string(),
        };
        let _ = report.write_all(progress.encode().as_bytes());
    }

    if op == OpKind::Move {
        for item in queue.iter().rev().filter(|i| i.is_dir) {
            fs::remove_dir(&item.src).ok();
        }
    }

    Ok(())
}

/// Best-effort extended-attribute copy (§4.16): missing xattr support on
/// the target filesystem is not a failure, just nothing preserved.
fn preserve_xattrs(src: &Path, dst: &Path) {
    let names = match xattr::list(src) {
        Ok(n) => n,
        Err(_) => return,
    };
    for name in names {
        if let Ok(Some(value)) = xattr::get(src, &name) {
            let _ = xattr::set(dst, &name, &value);
        }
    }
}

/// Forks a worker process to execute `queue`, reporting progress back to
/// the parent over a `UnixStream` pair (§4.16/§5). The child never
/// returns to the caller: it runs the queue then exits directly, so the
/// fork boundary never re-enters anything above this call on that side.
pub fn spawn_worker(op: OpKind, queue: Vec<WorkItem>) -> Result<ProgressChannel> {
    let (parent_sock, child_sock) = UnixStream::pair().map_err(Error::FileOp)?;

    match unsafe { fork() }.map_err(|e| Error::X11(format!("fork failed: {e}")))? {
        ForkResult::Child => {
            drop(parent_sock);
            let mut sock = child_sock;
            let _ = run_queue(op, &queue, &mut sock);
            std::process::exit(0);
        }
        ForkResult::Parent { child } => {
            drop(child_sock);
            parent_sock.set_nonblocking(true).map_err(Error::FileOp)?;
            Ok(ProgressChannel { stream: parent_sock, child, buf: String::new(), done: false })
        }
    }
}

/// Parent-side half of the fork+pipe protocol (§4.16). Polled once per
/// dispatcher `tick`, never blocking, so a burst of X input can't starve
/// a progress dialog's redraw (§8 property 7).
pub struct ProgressChannel {
    stream: UnixStream,
    child: Pid,
    buf: String,
    done: bool,
}

impl ProgressChannel {
    /// Drains whatever is currently available without blocking, returning
    /// every fully-framed `Progress` line decoded this call. An empty
    /// result is the common case: no news since the last tick.
    pub fn poll(&mut self) -> Result<Vec<Progress>> {
        if self.done {
            return Ok(Vec::new());
        }
        let mut chunk = [0u8; 4096];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(n) => {
                    self.buf.push_str(&String::from_utf8_lossy(&chunk[..n]));
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::FileOp(e)),
            }
        }

        let mut out = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let line = self.buf[..pos].to_string();
            self.buf.drain(..=pos);
            if let Some(p) = Progress::decode(&line) {
                out.push(p);
            }
        }
        Ok(out)
    }

    /// True once the worker's end of the pipe has been closed (it exited)
    /// and every buffered line has been drained.
    pub fn is_finished(&self) -> bool {
        self.done && self.buf.is_empty()
    }

    pub fn child_pid(&self) -> Pid {
        self.child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn tempdir() -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("amiwb-fileops-test-{}-{}", std::process::id(), n));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn spawn_worker_reports_progress_over_the_pipe_without_blocking() {
        let src = tempdir();
        let dst = tempdir();
        fs::write(src.join("a.txt"), b"hello world").unwrap();
        let queue = build_queue(OpKind::Copy, &src, Some(&dst)).unwrap();

        let mut channel = spawn_worker(OpKind::Copy, queue).unwrap();

        let mut collected = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !channel.is_finished() && std::time::Instant::now() < deadline {
            collected.extend(channel.poll().unwrap());
        }

        assert!(channel.is_finished(), "worker never closed its end of the pipe");
        assert!(collected.iter().any(|p| p.bytes_total > 0));
        assert!(dst.join("a.txt").exists());

        fs::remove_dir_all(&src).ok();
        fs::remove_dir_all(&dst).ok();
    }

    #[test]
    fn progress_wire_format_roundtrips() {
        let p = Progress { bytes_done: 10, bytes_total: 100, current_file: "/tmp/a.txt".to_string() };
        let decoded = Progress::decode(&p.encode()).unwrap();
        assert_eq!(p, decoded);
    }

    #[test]
    fn build_queue_walks_nested_directories_non_recursively() {
        let src = tempdir();
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.txt"), b"hello").unwrap();
        fs::write(src.join("sub/b.txt"), b"world").unwrap();

        let queue = build_queue(OpKind::Copy, &src, Some(Path::new("/tmp/amiwb-dst"))).unwrap();
        assert_eq!(queue.len(), 3);
        assert!(queue.iter().any(|i| i.is_dir && i.src == src.join("sub")));

        fs::remove_dir_all(&src).ok();
    }

    #[test]
    fn copy_preserves_file_contents_and_reports_progress() {
        let src = tempdir();
        let dst = tempdir();
        fs::write(src.join("a.txt"), b"hello world").unwrap();

        let queue = build_queue(OpKind::Copy, &src, Some(&dst)).unwrap();
        let mut out = Cursor::new(Vec::new());
        run_queue(OpKind::Copy, &queue, &mut out).unwrap();

        let copied = fs::read(dst.join("a.txt")).unwrap();
        assert_eq!(copied, b"hello world");

        let report = String::from_utf8(out.into_inner()).unwrap();
        assert!(report.lines().count() >= 1);

        fs::remove_dir_all(&src).ok();
        fs::remove_dir_all(&dst).ok();
    }

    #[test]
    fn move_removes_source_after_copying() {
        let src = tempdir();
        let dst = tempdir();
        fs::write(src.join("a.txt"), b"data").unwrap();

        let queue = build_queue(OpKind::Move, &src, Some(&dst)).unwrap();
        let mut out = Cursor::new(Vec::new());
        run_queue(OpKind::Move, &queue, &mut out).unwrap();

        assert!(!src.join("a.txt").exists());
        assert!(dst.join("a.txt").exists());

        fs::remove_dir_all(&src).ok();
        fs::remove_dir_all(&dst).ok();
    }

    #[test]
    fn delete_removes_files_and_then_empty_directories() {
        let src = tempdir();
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("sub/a.txt"), b"x").unwrap();

        let queue = build_queue(OpKind::Delete, &src, None).unwrap();
        let mut out = Cursor::new(Vec::new());
        // Deletion must process deepest entries before their parents;
        // build_queue emits directories before descending, so reverse it
        // for a delete pass the way the original's dequeue does.
        let mut reversed = queue.clone();
        reversed.reverse();
        run_queue(OpKind::Delete, &reversed, &mut out).unwrap();

        assert!(!src.join("sub/a.txt").exists());
        assert!(!src.join("sub").exists());

        fs::remove_dir_all(&src).ok();
    }
}
