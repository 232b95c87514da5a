// Library exports for the wave-bridge binary, tests and embedders.
//
// A `ViewerBridge` owns one `Interpreter` and is meant to be driven from a
// single thread: commands block until the viewer replies, and cursor
// notifications are relayed only when the owner calls `process_events` or
// `wait_for_events`.

/// Application version (root crate version).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod error;
pub mod interp;
pub mod viewer;

pub use error::{BridgeError, CallbackError, Result};
pub use interp::{InboundCall, Interpreter, WishInterpreter};
pub use viewer::{
    CURSOR_TIME_CHANGE, Cursor, SearchDirection, TimeChangeEvent, TimeChangeWork, ViewerBridge,
    escape_signal,
};
pub use wave_bridge_config::{BridgeConfig, ConfigError, LogLevel};
