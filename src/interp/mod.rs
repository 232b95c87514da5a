//! Tk Interpreter Connection
//!
//! The viewer is reached through Tk's `send` mechanism: every Tk application
//! registers a named interpreter, and any other Tk application on the same
//! display can evaluate commands in it by name.
//!
//! ## Architecture
//!
//! - `mod.rs`: the [`Interpreter`] trait (the connection handle the bridge owns)
//! - `protocol.rs`: Tcl word quoting and the helper's line protocol
//! - `wish.rs`: [`WishInterpreter`], a hidden `wish` subprocess acting as
//!   our local Tk application
//!
//! Tests and embedders can supply any other [`Interpreter`] implementation.

pub mod protocol;
mod wish;

pub use protocol::InboundCall;
pub use wish::WishInterpreter;

use crate::error::Result;
use std::time::Duration;

/// A handle to a local Tk command interpreter.
///
/// The bridge owns exactly one of these for its whole lifetime.
pub trait Interpreter {
    /// Name under which other Tk applications address this interpreter.
    fn name(&self) -> &str;

    /// All interpreter names reachable from this process, in the order the
    /// display reports them.
    fn interps(&mut self) -> Result<Vec<String>>;

    /// Evaluate `command` with `args` in the interpreter named `target` and
    /// block until its textual result arrives.
    ///
    /// Arguments are concatenated into one script on the receiving side,
    /// exactly like Tk's `send`.
    fn send(&mut self, target: &str, command: &str, args: &[String]) -> Result<String>;

    /// Install a local command named `name`. Remote invocations of it are
    /// queued and returned by [`Interpreter::poll_inbound`].
    fn create_command(&mut self, name: &str) -> Result<()>;

    /// Next queued remote invocation of a local command.
    ///
    /// Waits up to `wait` for one to arrive; `Duration::ZERO` never blocks.
    fn poll_inbound(&mut self, wait: Duration) -> Result<Option<InboundCall>>;

    /// Release the interpreter. Calling it again is a no-op.
    fn destroy(&mut self) -> Result<()>;
}
