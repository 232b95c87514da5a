//! Shared integration test helpers for wave-bridge.
//!
//! Provides [`FakeInterpreter`], an in-memory [`Interpreter`] that records
//! every request and answers with scripted replies, so bridge behavior can
//! be tested without `wish` or a running viewer.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{FakeInterpreter, fake_bridge};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers are used per file.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use wave_bridge::{BridgeError, InboundCall, Interpreter, Result, ViewerBridge};

/// Name the fake reports for itself.
pub const LOCAL_NAME: &str = "wave_interface";

/// One `send` observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub target: String,
    pub command: String,
    pub args: Vec<String>,
}

/// Observable state shared between a test and the fake it handed over.
#[derive(Debug, Default)]
pub struct FakeState {
    /// Every `send`, in order
    pub sent: Vec<Sent>,
    /// Scripted replies per command name, consumed front to back
    pub replies: HashMap<String, VecDeque<String>>,
    /// Scripted transport failures per command name
    pub failures: HashMap<String, String>,
    /// Local commands created through the interpreter
    pub created: Vec<String>,
    /// Inbound calls waiting to be polled
    pub inbound: VecDeque<InboundCall>,
    /// Number of `interps` scans
    pub scans: usize,
    /// Number of `destroy` calls
    pub destroyed: usize,
}

impl FakeState {
    /// Queue a reply for the next `send` of `command`.
    pub fn reply(&mut self, command: &str, reply: &str) {
        self.replies
            .entry(command.to_string())
            .or_default()
            .push_back(reply.to_string());
    }

    /// Queue an inbound call of a local command.
    pub fn notify(&mut self, command: &str, args: &[&str]) {
        self.inbound.push_back(InboundCall {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        });
    }

    /// Command names sent so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.sent.iter().map(|s| s.command.clone()).collect()
    }

    /// How many times `command` was sent.
    pub fn count(&self, command: &str) -> usize {
        self.sent.iter().filter(|s| s.command == command).count()
    }

    /// The last `send` of `command`.
    pub fn last(&self, command: &str) -> Option<&Sent> {
        self.sent.iter().rev().find(|s| s.command == command)
    }
}

/// In-memory stand-in for a Tk interpreter.
pub struct FakeInterpreter {
    interps: Vec<String>,
    state: Rc<RefCell<FakeState>>,
}

impl FakeInterpreter {
    pub fn new(interps: &[&str]) -> (Self, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(FakeState::default()));
        let interp = Self {
            interps: interps.iter().map(|s| s.to_string()).collect(),
            state: Rc::clone(&state),
        };
        (interp, state)
    }
}

impl Interpreter for FakeInterpreter {
    fn name(&self) -> &str {
        LOCAL_NAME
    }

    fn interps(&mut self) -> Result<Vec<String>> {
        self.state.borrow_mut().scans += 1;
        Ok(self.interps.clone())
    }

    fn send(&mut self, target: &str, command: &str, args: &[String]) -> Result<String> {
        let mut state = self.state.borrow_mut();
        if state.destroyed > 0 {
            return Err(BridgeError::Connection("interpreter destroyed".into()));
        }
        state.sent.push(Sent {
            target: target.to_string(),
            command: command.to_string(),
            args: args.to_vec(),
        });
        if let Some(message) = state.failures.get(command) {
            return Err(BridgeError::Connection(message.clone()));
        }
        let reply = state
            .replies
            .get_mut(command)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| "1".to_string());
        Ok(reply)
    }

    fn create_command(&mut self, name: &str) -> Result<()> {
        self.state.borrow_mut().created.push(name.to_string());
        Ok(())
    }

    fn poll_inbound(&mut self, _wait: Duration) -> Result<Option<InboundCall>> {
        Ok(self.state.borrow_mut().inbound.pop_front())
    }

    fn destroy(&mut self) -> Result<()> {
        self.state.borrow_mut().destroyed += 1;
        Ok(())
    }
}

/// A bridge over a fake seeing `interps`, targeting `target` when given.
pub fn fake_bridge(
    interps: &[&str],
    target: Option<&str>,
) -> (ViewerBridge, Rc<RefCell<FakeState>>) {
    let (interp, state) = FakeInterpreter::new(interps);
    let mut bridge = ViewerBridge::new(Box::new(interp)).expect("fake bridge construction");
    if let Some(target) = target {
        bridge.set_wave_tk_name(target);
    }
    (bridge, state)
}

/// Strings from string slices.
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
