//! Crate-wide error type.
//!
//! Every fallible boundary in amiwb returns [`Result`]. Nothing below the
//! dispatcher is allowed to panic on input it doesn't control: X protocol
//! errors, malformed icon files, and missing config values must all resolve
//! to a variant here and be handled by the caller.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("x11 protocol error: {0}")]
    X11(String),

    #[error("unknown client window")]
    UnknownClient,

    #[error("unknown canvas")]
    UnknownCanvas,

    #[error("icon decode failed: {0}")]
    IconDecode(#[from] IconDecodeError),

    #[error("config error: {0}")]
    Config(String),

    #[error("file operation failed: {0}")]
    FileOp(std::io::Error),

    #[error("another instance of amiwb is already running on this display")]
    AlreadyRunning,

    #[error("required X extension missing: {0}")]
    MissingExtension(&'static str),
}

/// Failure modes for the three icon decoders (§4.2).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IconDecodeError {
    #[error("icon file too small to contain a header")]
    TooSmall,
    #[error("unrecognized icon magic")]
    UnknownMagic,
    #[error("icon dimensions out of range: {width}x{height}")]
    DimensionsOutOfRange { width: i32, height: i32 },
    #[error("icon bitplane depth out of range: {depth}")]
    DepthOutOfRange { depth: u8 },
    #[error("icon data overrun while decoding")]
    DataOverrun,
    #[error("GlowIcon ToolTypes bitmap markers are not supported")]
    ToolTypesUnsupported,
    #[error("unsupported AICON container version")]
    UnsupportedAiconVersion,
    #[error("AICON directory entry out of bounds")]
    AiconOutOfBounds,
    #[error("PNG decode failed: {0}")]
    Png(String),
}
