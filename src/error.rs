//! Typed error types for wave-bridge.
//!
//! Callers at the crate boundary can match on specific variants instead of
//! relying on opaque `anyhow` strings. The binary converts them into
//! `anyhow::Error` at the edge.

use thiserror::Error;
use wave_bridge_config::ConfigError;

/// Error returned by a time-change callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for the viewer bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -----------------------------------------------------------------------
    // Viewer replies
    // -----------------------------------------------------------------------
    /// The viewer answered "0", returned an empty mandatory reply, or sent
    /// a reply too short for the command's grammar.
    #[error("Viewer protocol error: {0}")]
    Protocol(String),

    // -----------------------------------------------------------------------
    // Caller / integration mistakes
    // -----------------------------------------------------------------------
    /// An argument or an inbound notification was not recognised.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A viewer command was issued before a target interpreter was chosen.
    #[error("No viewer interpreter selected; call set_wave_tk_name first")]
    NoTarget,

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------
    /// The local interpreter reported a failure reaching the viewer, or the
    /// interpreter itself went away.
    #[error("Interpreter connection error: {0}")]
    Connection(String),

    /// Spawning or talking to the interpreter process failed.
    #[error("Interpreter I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -----------------------------------------------------------------------
    // Notification relay
    // -----------------------------------------------------------------------
    /// A registered time-change callback failed; later callbacks did not run.
    #[error("Time-change callback #{index} failed: {source}")]
    Callback {
        /// Position of the failing callback in registration order.
        index: usize,
        /// Error returned by the callback.
        #[source]
        source: CallbackError,
    },

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------
    /// The bridge configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
