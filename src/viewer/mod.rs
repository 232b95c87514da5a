//! Verdi / nWave Integration
//!
//! This module drives a running Verdi or nWave waveform viewer through the
//! viewer's embedded Tcl interpreter, allowing wave-bridge to:
//! - Discover viewer instances reachable over Tk `send`
//! - Query the loaded file, signal values and the cursor
//! - Move the cursor and search for signal transitions
//! - Receive cursor time-change notifications
//!
//! ## Architecture
//!
//! - `bridge.rs`: ViewerBridge, the client and notification state
//! - `commands.rs`: Command builders for the Verdi Command Language
//! - `reply.rs`: Typed decoders for textual replies
//! - `relay.rs`: Ordered time-change callback list
//! - `types.rs`: Core data types (Cursor, SearchDirection, TimeChangeEvent)
//!
//! ## Reply Grammar
//!
//! The viewer answers every command with a single string:
//! - `"0"` signals failure for most commands
//! - Structured replies are tokens separated by single spaces, read at
//!   fixed positions (`wvGetCursor`: `1 <time> x <timescale>`)

mod bridge;
mod commands;
pub mod reply;
mod relay;
mod types;

pub use bridge::{ViewerBridge, escape_signal, find_candidates};
pub use commands::ViewerCommand;
pub use relay::{TimeChangeRelay, TimeChangeWork};
pub use types::{CURSOR_TIME_CHANGE, Cursor, SearchDirection, TimeChangeEvent};
