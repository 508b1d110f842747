//! amiwb entry point: parses the minimal CLI surface, wires up logging and
//! config, claims the single-instance selection, connects to the display,
//! and hands off to [`amiwb::dispatcher::Dispatcher`]'s event loop.
//!
//! Grounded on `examples/original_source/src/amiwb/main.c`'s startup
//! order: config, then log, then display connection, then the singleton
//! guard, then install signal handlers, then run.

use std::env;
use std::path::PathBuf;
use std::process;

use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::signal::{self, SigHandler, Signal};

use amiwb::compositor::scheduler::FrameScheduler;
use amiwb::config::Config;
use amiwb::dispatcher::{self, Dispatcher};
use amiwb::xconn::atom::Atoms;
use amiwb::xconn::x11rb_impl::X11rbConn;
use amiwb::xconn::XConn;
use amiwb::{log as amiwb_log, Error};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() == 2 && (args[1] == "-v" || args[1] == "--version") {
        println!("amiwb-{}", option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"));
        process::exit(0);
    } else if args.len() > 1 {
        eprintln!("usage: amiwb [-v]");
        process::exit(1);
    }

    if let Err(e) = run() {
        eprintln!("amiwb: fatal: {e}");
        process::exit(1);
    }
}

fn run() -> amiwb::Result<()> {
    let config = Config::load_default();
    let log_guard = amiwb_log::init(&log_path(), None)?;

    tracing::info!("amiwb starting");

    let conn = X11rbConn::connect(None)?;
    let atoms = Atoms::intern(&conn)?;

    if !conn.acquire_selection(atoms.amiwb_wm_s0)? {
        return Err(Error::AlreadyRunning);
    }

    install_signal_handlers();

    let scheduler = FrameScheduler::new(config.effective_fps(), config.render_mode)?;
    let mut dispatcher = Dispatcher::new(conn, scheduler, Some(log_guard), atoms);

    tracing::info!(fps = config.effective_fps(), "entering main loop");
    main_loop(&mut dispatcher)
}

fn log_path() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local/share/amiwb/amiwb.log"),
        None => PathBuf::from("/tmp/amiwb.log"),
    }
}

fn install_signal_handlers() {
    unsafe {
        let _ = signal::signal(Signal::SIGCHLD, SigHandler::Handler(dispatcher::on_sigchld));
        let _ = signal::signal(Signal::SIGTERM, SigHandler::Handler(dispatcher::on_terminate));
        let _ = signal::signal(Signal::SIGINT, SigHandler::Handler(dispatcher::on_terminate));
    }
}

/// Blocks in `poll()` on the X connection fd and the frame timer fd
/// together (§4.11), waking the dispatcher whenever either is readable.
fn main_loop(dispatcher: &mut Dispatcher<X11rbConn>) -> amiwb::Result<()> {
    let x_fd = dispatcher.connection_fd();
    let timer_fd = dispatcher.timer_fd();

    while dispatcher::RUNNING.load(std::sync::atomic::Ordering::SeqCst) {
        let mut fds = [
            PollFd::new(x_fd, PollFlags::POLLIN),
            PollFd::new(timer_fd, PollFlags::POLLIN),
        ];

        match poll(&mut fds, 1000) {
            Ok(_) => {}
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => return Err(Error::X11(format!("poll failed: {e}"))),
        }

        let timer_fired = fds[1]
            .revents()
            .map(|r| r.contains(PollFlags::POLLIN))
            .unwrap_or(false);

        dispatcher.tick(timer_fired)?;
    }

    tracing::info!("amiwb shutting down");
    Ok(())
}
