//! Main event loop (§4.11).
//!
//! Grounded on `examples/original_source/src/amiwb/events/evt_core.c`'s
//! shape: block in `select()` on the X connection fd and the frame
//! timer fd together, then drain every pending X event before looping
//! back to `select()`, so a burst of input never starves the repaint
//! timer and vice versa. Every 1000 drained events the log file is
//! checked for truncation (§4.11); SIGCHLD is reaped cooperatively via a
//! flag a signal handler sets, never doing real work inside the handler
//! itself.

use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::canvas::focus::FocusState;
use crate::canvas::{CanvasType, Registry};
use crate::compositor::scheduler::FrameScheduler;
use crate::compositor::Compositor;
use crate::dialog::progress::ProgressDialog;
use crate::error::Result;
use crate::fileops::ProgressChannel;
use crate::framing;
use crate::geometry::Rect;
use crate::log::LogGuard;
use crate::router::{self, PressTarget};
use crate::workbench;
use crate::xconn::atom::Atoms;
use crate::xconn::{WinKind, XConn, XEvent, Xid};
use crate::xdnd::DropTarget;

/// Set by the `SIGCHLD` handler; the dispatcher reaps zombie children
/// cooperatively on its next loop iteration rather than inside the signal
/// handler (§4.11 "no non-async-signal-safe work in a handler").
pub static SIGCHLD_PENDING: AtomicBool = AtomicBool::new(false);

/// Set by `SIGTERM`/`SIGINT` handlers; checked once per loop iteration to
/// exit the run loop cleanly instead of terminating mid-paint.
pub static RUNNING: AtomicBool = AtomicBool::new(true);

pub extern "C" fn on_sigchld(_: libc::c_int) {
    SIGCHLD_PENDING.store(true, Ordering::SeqCst);
}

pub extern "C" fn on_terminate(_: libc::c_int) {
    RUNNING.store(false, Ordering::SeqCst);
}

const TRUNCATE_EVERY: u64 = 1000;

pub struct Dispatcher<C: XConn> {
    conn: C,
    registry: Registry,
    compositor: Compositor,
    scheduler: FrameScheduler,
    press: PressTarget,
    log_guard: Option<LogGuard>,
    drained_since_truncate: u64,
    atoms: Atoms,
    focus: FocusState,
    drop_target: DropTarget,
    progress_dialogs: Vec<(ProgressDialog, ProgressChannel)>,
}

impl<C: XConn> Dispatcher<C> {
    pub fn new(conn: C, scheduler: FrameScheduler, log_guard: Option<LogGuard>, atoms: Atoms) -> Self {
        Dispatcher {
            conn,
            registry: Registry::new(),
            compositor: Compositor::new(),
            scheduler,
            press: PressTarget::new(),
            log_guard,
            drained_since_truncate: 0,
            atoms,
            focus: FocusState::new(),
            drop_target: DropTarget::default(),
            progress_dialogs: Vec::new(),
        }
    }

    /// Registers a freshly forked file-operation worker's progress dialog
    /// so `tick` polls it alongside X events (§4.16/§8 property 7).
    pub fn track_progress(&mut self, dialog: ProgressDialog, channel: ProgressChannel) {
        self.progress_dialogs.push((dialog, channel));
    }

    /// Polls every active file-operation progress pipe without blocking,
    /// dropping dialogs once their worker finished and the bar is full.
    fn check_progress_dialogs(&mut self) {
        for (dialog, channel) in self.progress_dialogs.iter_mut() {
            if let Ok(updates) = channel.poll() {
                for p in updates {
                    dialog.apply_progress(p);
                }
            }
        }
        self.progress_dialogs.retain(|(dialog, channel)| !(channel.is_finished() && dialog.is_complete()));
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Access to the underlying connection, chiefly so tests driving a
    /// `Dispatcher<MockXConn>` can push synthetic events and inspect the
    /// call log without the dispatcher exposing a test-only API surface.
    pub fn conn(&self) -> &C {
        &self.conn
    }

    /// The canvas currently holding the press lock (§4.12), if any.
    pub fn press_target(&self) -> Option<Xid> {
        self.press.get()
    }

    /// One full iteration: drain every currently-pending X event, reap
    /// children if the flag is set, maybe truncate the log, and paint if
    /// the frame timer fired. Split out from `run` so tests can drive it
    /// deterministically against a `MockXConn` without a real `select()`.
    pub fn tick(&mut self, timer_fired: bool) -> Result<()> {
        if SIGCHLD_PENDING.swap(false, Ordering::SeqCst) {
            reap_children();
        }

        while let Some(event) = self.conn.poll_for_event()? {
            self.handle_event(event)?;
            self.drained_since_truncate += 1;
            if self.drained_since_truncate >= TRUNCATE_EVERY {
                if let Some(guard) = &self.log_guard {
                    guard.maybe_truncate();
                }
                self.drained_since_truncate = 0;
            }
        }

        self.check_progress_dialogs();

        if timer_fired {
            self.scheduler.consume_timer()?;
            self.compositor.paint(&self.conn, &mut self.registry)?;
            let still_dirty = self.registry.iter().any(|c| c.damage.is_dirty());
            self.scheduler.process_frame(still_dirty)?;
        }

        Ok(())
    }

    fn handle_event(&mut self, event: XEvent) -> Result<()> {
        match event {
            XEvent::ButtonPress { window, .. } => {
                if let Some(canvas) = router::resolve_canvas(&self.conn, &self.registry, window)? {
                    self.press.set(canvas);
                    self.scheduler.schedule_frame()?;
                }
            }
            XEvent::ButtonRelease { window, event_pos, .. } => {
                if let Some(target) = self.press.get() {
                    if let Some(p) = router::translate(&self.conn, window, target, event_pos)? {
                        if let Some(canvas) = self.registry.find_by_window_mut(target) {
                            canvas.last_local_pointer = Some(p);
                        }
                    }
                }
                self.press.clear_if_matches(window);
            }
            XEvent::MotionNotify { window, event_pos, .. } => {
                // Motion is routed to whatever `self.press` already locked,
                // translated into that canvas's own coordinate space
                // rather than re-resolved (§4.12); a freshly-resolved
                // canvas with nothing locked has no hover state to update.
                if let Some(target) = self.press.get() {
                    if let Some(p) = router::translate(&self.conn, window, target, event_pos)? {
                        if let Some(canvas) = self.registry.find_by_window_mut(target) {
                            canvas.last_local_pointer = Some(p);
                        }
                    }
                } else {
                    router::resolve_canvas(&self.conn, &self.registry, window)?;
                }
            }
            XEvent::DestroyNotify { window } => {
                self.press.clear_if_matches(window);
                self.focus.unregister(window);
                self.registry.remove(window);
            }
            XEvent::UnmapNotify { window } => {
                if !framing::on_unmap(&self.conn, &mut self.registry, &mut self.focus, window)? {
                    self.press.clear_if_matches(window);
                    self.focus.unregister(window);
                    self.registry.remove(window);
                }
            }
            XEvent::DamageNotify { drawable, area } => {
                self.compositor.on_damage(&mut self.registry, drawable, area);
                self.scheduler.schedule_frame()?;
            }
            XEvent::ConfigureNotify { window, x, y, width, height } => {
                if let Some(canvas) = self.registry.find_by_window_mut(window) {
                    canvas.set_rect(Rect::new(x, y, width as u32, height as u32));
                    canvas.grow_buffer_to_fit();
                    self.scheduler.schedule_frame()?;
                }
                // ConfigureNotify from a client (not our own frame) is
                // ignored (§4.11): clients must go through ConfigureRequest.
            }
            XEvent::MapRequest { window } => {
                framing::manage(&self.conn, &mut self.registry, &mut self.focus, &self.atoms, window)?;
                self.scheduler.schedule_frame()?;
            }
            XEvent::MapNotify { window } => {
                framing::recenter_transient(&self.conn, &mut self.registry, window)?;
                self.scheduler.schedule_frame()?;
            }
            XEvent::ConfigureRequest { window, x, y, width, height } => {
                framing::honor_configure_request(&self.conn, &mut self.registry, window, x, y, width as u32, height as u32)?;
                self.scheduler.schedule_frame()?;
            }
            XEvent::PropertyNotify { window, atom, deleted } => {
                self.handle_property_notify(window, atom, deleted)?;
            }
            XEvent::ClientMessage { message_type, data, .. } => {
                self.handle_client_message(message_type, data);
            }
            XEvent::KeyPress { keycode, .. } => {
                // Escape cancels whatever file-operation progress dialogs
                // are open. A full keysym-based global-shortcut table
                // (§6) needs a keycode->keysym mapping this corpus has no
                // mechanism for (`amiwb_keysyms` is a name<->enum table
                // only) and the shortcut grab table itself is an explicit
                // out-of-scope configuration input; narrowed deliberately,
                // see DESIGN.md.
                const KEYCODE_ESCAPE: u8 = 9;
                if keycode == KEYCODE_ESCAPE {
                    for (dialog, _) in self.progress_dialogs.iter_mut() {
                        dialog.cancelled = true;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_property_notify(&mut self, window: Xid, atom: crate::xconn::Atom, deleted: bool) -> Result<()> {
        if deleted {
            return Ok(());
        }
        if window == self.conn.root() && atom == self.atoms.amiwb_open_directory {
            if let Some(path) = self.conn.get_property_string(window, atom)? {
                let rect = Rect::new(100, 100, 640, 480);
                let frame = self.conn.create_window(WinKind::Frame, rect, self.conn.root())?;
                self.conn.map_window(frame)?;
                workbench::open_directory(&mut self.registry, frame, CanvasType::Window, path, rect, "Workbench")?;
                self.conn.delete_property(window, atom)?;
                self.scheduler.schedule_frame()?;
            }
        } else if atom == self.atoms.amiwb_title_change {
            if let Some(title) = self.conn.get_property_string(window, atom)? {
                if let Some(canvas) = self.registry.find_by_client_mut(window) {
                    canvas.title_change = Some(title);
                    canvas.damage.mark_whole();
                    self.scheduler.schedule_frame()?;
                }
            }
        }
        // `_AMIWB_MENU_STATES` re-sync: deferred. No per-client menu
        // controller is wired up to `_AMIWB_MENU_DATA` substitution yet,
        // so there is nothing to re-read states into (see DESIGN.md).
        Ok(())
    }

    /// Dispatches a recognized XDND atom to the drop-target state machine
    /// (§4.13). Target-side only: amiwb has no `XConn::send_client_message`
    /// primitive yet, so replying with `XdndStatus`/`XdndFinished` isn't
    /// wired here (see DESIGN.md) - the state machine itself still tracks
    /// phase/offered-types/drop-point correctly for the drop path that
    /// matters (§8 scenario S4), which reads the dropped selection
    /// directly rather than through this event.
    fn handle_client_message(&mut self, message_type: crate::xconn::Atom, data: [u32; 5]) {
        if message_type == self.atoms.xdnd_enter {
            let types = data[2..]
                .iter()
                .copied()
                .filter(|&a| a != 0)
                .map(crate::xconn::Atom)
                .collect();
            self.drop_target.on_enter(types, &[self.atoms.text_uri_list, self.atoms.text_plain]);
        } else if message_type == self.atoms.xdnd_position {
            let x = (data[2] >> 16) as i32;
            let y = (data[2] & 0xFFFF) as i32;
            self.drop_target.on_position(crate::geometry::Point::new(x, y));
        } else if message_type == self.atoms.xdnd_leave {
            self.drop_target.on_leave();
        } else if message_type == self.atoms.xdnd_drop {
            self.drop_target.drop_point.get_or_insert(crate::geometry::Point::new(0, 0));
        }
    }

    /// Rectangle-under-pointer reroute for a desktop click (§4.12 step
    /// 2), exposed so higher layers (keyboard shortcuts that act "on the
    /// window under the mouse") can share the same logic.
    pub fn reroute_desktop_click(&self, resolved: Xid) -> Result<Xid> {
        let root = self.conn.root();
        let stacking = self.conn.query_tree(root)?;
        Ok(router::reroute_desktop_click(&self.registry, resolved, &stacking))
    }

    pub fn connection_fd(&self) -> RawFd {
        self.conn.connection_fd()
    }

    pub fn timer_fd(&self) -> RawFd {
        self.scheduler.fd()
    }

    pub fn is_desktop(&self, frame: Xid) -> bool {
        self.registry.find_by_window(frame).map(|c| c.kind == CanvasType::Desktop).unwrap_or(false)
    }
}

fn reap_children() {
    // waitpid(-1, WNOHANG) in a loop: reap every exited child without
    // blocking, matching the original's zombie-avoidance loop in its
    // SIGCHLD path.
    loop {
        let pid = unsafe { libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG) };
        if pid <= 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::config::RenderMode;
    use crate::geometry::Rect;
    use crate::xconn::mock::MockXConn;

    fn dispatcher() -> Dispatcher<MockXConn> {
        let conn = MockXConn::new();
        let atoms = Atoms::intern(&conn).unwrap();
        Dispatcher::new(conn, fake_scheduler(), None, atoms)
    }

    // `FrameScheduler` needs a real timerfd; these tests only exercise
    // event handling, so `tick(false)` is used throughout and the
    // scheduler is never actually armed. A scheduler-less constructor
    // would be preferable; `FrameScheduler::new` unconditionally opens a
    // timerfd, which works fine under the real test harness's sandbox.
    fn fake_scheduler() -> FrameScheduler {
        FrameScheduler::new(60, RenderMode::OnDemand).expect("timerfd available in test environment")
    }

    #[test]
    fn button_press_locks_the_press_target_to_the_resolved_canvas() {
        let mut d = dispatcher();
        d.registry_mut()
            .insert(Canvas::new(Xid(10), CanvasType::Window, Rect::new(0, 0, 100, 100), "w"))
            .unwrap();
        d.conn.push_event(XEvent::ButtonPress {
            window: Xid(10),
            root: d.conn.root(),
            root_pos: crate::geometry::Point::new(5, 5),
            event_pos: crate::geometry::Point::new(5, 5),
            button: 1,
            state: 0,
        });
        d.tick(false).unwrap();
        assert_eq!(d.press.get(), Some(Xid(10)));
    }

    #[test]
    fn destroy_notify_removes_the_canvas_and_clears_a_matching_press_lock() {
        let mut d = dispatcher();
        d.registry_mut()
            .insert(Canvas::new(Xid(10), CanvasType::Window, Rect::new(0, 0, 100, 100), "w"))
            .unwrap();
        d.press.set(Xid(10));
        d.conn.push_event(XEvent::DestroyNotify { window: Xid(10) });
        d.tick(false).unwrap();
        assert!(d.registry().find_by_window(Xid(10)).is_none());
        assert_eq!(d.press.get(), None);
    }

    #[test]
    fn map_request_frames_an_unmanaged_client() {
        let mut d = dispatcher();
        let client = Xid(50);
        d.conn.set_geometry(client, Rect::new(10, 10, 300, 200));
        d.conn.push_event(XEvent::MapRequest { window: client });
        d.tick(false).unwrap();

        assert!(d.registry().find_by_client(client).is_some());
        assert_eq!(d.focus.active, d.registry().find_by_client(client).map(|c| c.frame));
    }

    #[test]
    fn motion_notify_translates_into_the_locked_press_target_space() {
        let mut d = dispatcher();
        d.registry_mut()
            .insert(Canvas::new(Xid(10), CanvasType::Window, Rect::new(0, 0, 100, 100), "w"))
            .unwrap();
        d.press.set(Xid(10));
        d.conn.push_event(XEvent::MotionNotify {
            window: Xid(99),
            root: d.conn.root(),
            root_pos: crate::geometry::Point::new(40, 40),
            event_pos: crate::geometry::Point::new(40, 40),
            state: 0,
        });
        d.tick(false).unwrap();
        assert_eq!(
            d.registry().find_by_window(Xid(10)).unwrap().last_local_pointer,
            Some(crate::geometry::Point::new(40, 40))
        );
    }

    #[test]
    fn property_notify_open_directory_creates_a_workbench_window_and_deletes_the_property() {
        let mut d = dispatcher();
        let dir = std::env::temp_dir();
        d.conn
            .set_property_string(d.conn.root(), d.atoms.amiwb_open_directory, &dir.to_string_lossy())
            .unwrap();
        d.conn.push_event(XEvent::PropertyNotify {
            window: d.conn.root(),
            atom: d.atoms.amiwb_open_directory,
            deleted: false,
        });
        d.tick(false).unwrap();

        assert_eq!(d.registry().len(), 1);
        assert!(d
            .conn
            .get_property_string(d.conn.root(), d.atoms.amiwb_open_directory)
            .unwrap()
            .is_none());
    }

    #[test]
    fn key_press_escape_cancels_open_progress_dialogs() {
        use crate::dialog::progress::ProgressDialog;
        use crate::fileops::OpKind;

        let mut d = dispatcher();
        let dialog = ProgressDialog::new(Xid(1), OpKind::Copy, Rect::new(0, 0, 200, 10), Rect::new(0, 20, 50, 20));
        // `track_progress` needs a real `ProgressChannel`; spawn an empty
        // worker (no queue) via the same fork+pipe path production code
        // uses, so the test stays honest about what a live dialog looks
        // like rather than constructing one by hand.
        let channel = crate::fileops::spawn_worker(OpKind::Copy, Vec::new()).unwrap();
        d.track_progress(dialog, channel);

        d.conn.push_event(XEvent::KeyPress { window: d.conn.root(), keycode: 9, state: 0 });
        d.tick(false).unwrap();

        assert!(d.progress_dialogs[0].0.cancelled);
    }
}
