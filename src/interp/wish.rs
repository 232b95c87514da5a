//! Hidden `wish` subprocess acting as the bridge's local Tk application.
//!
//! [`WishInterpreter`] spawns `wish`, feeds it the bootstrap script from
//! [`super::protocol`], then exchanges request/reply lines over its stdin and
//! stdout. A reader thread splits stdout into replies and inbound command
//! calls; a second thread collects stderr lines for error reporting.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError, channel};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use super::Interpreter;
use super::protocol::{self, HelperLine, InboundCall};
use crate::error::{BridgeError, Result};

type HelperReply = std::result::Result<Vec<String>, String>;

/// A `wish` process registered as a Tk application, used to reach other
/// Tk applications through `send`.
pub struct WishInterpreter {
    /// The child process handle, if still alive.
    child: Option<Child>,
    /// Writer to the child's stdin, if still open.
    stdin_writer: Option<ChildStdin>,
    /// Replies, in request order.
    replies: Receiver<HelperReply>,
    /// Remote invocations of local commands.
    inbound: Receiver<InboundCall>,
    /// Lines the helper wrote to stderr.
    error_buffer: Arc<Mutex<Vec<String>>>,
    /// Actual Tk application name (may carry a ` #N` suffix).
    name: String,
    /// Handle to the background thread reading stdout.
    _stdout_thread: Option<JoinHandle<()>>,
    /// Handle to the background thread reading stderr.
    _stderr_thread: Option<JoinHandle<()>>,
}

impl WishInterpreter {
    /// Spawn `wish_path` and register it under the Tk application name
    /// `app_name`.
    ///
    /// # Errors
    /// Returns [`BridgeError::Io`] if the process cannot be spawned or
    /// written to, and [`BridgeError::Connection`] if the helper dies before
    /// reporting its name (typically: no X display).
    pub fn spawn(wish_path: &str, app_name: &str) -> Result<Self> {
        let mut child = Command::new(wish_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                std::io::Error::new(e.kind(), format!("Failed to spawn '{}': {}", wish_path, e))
            })?;

        let stdin_writer = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Connection("Failed to capture wish stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BridgeError::Connection("Failed to capture wish stderr".into()))?;

        let (reply_tx, replies) = channel::<HelperReply>();
        let (inbound_tx, inbound) = channel::<InboundCall>();
        let error_buffer: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        // Stdout reader thread: route protocol lines to the two channels
        let stdout_thread = std::thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(text) => {
                        crate::debug_trace!("WISH", "<- {}", text);
                        match protocol::parse_line(&text) {
                            Some(HelperLine::Reply(reply)) => {
                                if reply_tx.send(reply).is_err() {
                                    break;
                                }
                            }
                            Some(HelperLine::Inbound(call)) => {
                                if inbound_tx.send(call).is_err() {
                                    break;
                                }
                            }
                            None if text.is_empty() => {}
                            None => {
                                log::warn!("WishInterpreter: ignoring stray output: {:?}", text);
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!("WishInterpreter: error reading stdout: {}", e);
                        break;
                    }
                }
            }
        });

        // Stderr reader thread: collect error lines
        let err_buf = Arc::clone(&error_buffer);
        let stderr_thread = std::thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines() {
                match line {
                    Ok(text) => {
                        if text.is_empty() {
                            continue;
                        }
                        log::debug!("WishInterpreter stderr: {}", text);
                        let mut buf = err_buf.lock().unwrap_or_else(|e| {
                            log::warn!("error_buffer mutex poisoned, recovering");
                            e.into_inner()
                        });
                        buf.push(text);
                    }
                    Err(e) => {
                        log::warn!("WishInterpreter: error reading stderr: {}", e);
                        break;
                    }
                }
            }
        });

        let mut interp = Self {
            child: Some(child),
            stdin_writer,
            replies,
            inbound,
            error_buffer,
            name: String::new(),
            _stdout_thread: Some(stdout_thread),
            _stderr_thread: Some(stderr_thread),
        };

        interp.write_line(&protocol::bootstrap_script(app_name))?;
        let name = interp
            .request("name", &[])?
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::Connection("wish did not report its name".into()))?;
        crate::debug_info!("WISH", "Registered as Tk application {:?}", name);
        interp.name = name;

        Ok(interp)
    }

    /// Drain pending error lines from the helper's stderr buffer.
    pub fn read_errors(&self) -> Vec<String> {
        let mut buf = self.error_buffer.lock().unwrap_or_else(|e| {
            log::warn!("error_buffer mutex poisoned, recovering");
            e.into_inner()
        });
        buf.drain(..).collect()
    }

    /// Check if the helper process is still alive.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        let stdin = self
            .stdin_writer
            .as_mut()
            .ok_or_else(|| BridgeError::Connection("wish interpreter is closed".into()))?;
        crate::debug_trace!("WISH", "-> {}", text.trim_end());
        stdin.write_all(text.as_bytes())?;
        stdin.flush()?;
        Ok(())
    }

    /// Send one request and block for its reply. No timeout: the viewer may
    /// legitimately take a long time on large waveform files.
    fn request(&mut self, op: &str, words: &[&str]) -> Result<Vec<String>> {
        self.write_line(&protocol::request_line(op, words))?;
        match self.replies.recv() {
            Ok(Ok(fields)) => Ok(fields),
            Ok(Err(message)) => Err(BridgeError::Connection(message)),
            Err(_) => {
                let stderr = self.read_errors().join("; ");
                Err(BridgeError::Connection(if stderr.is_empty() {
                    "wish interpreter exited".to_string()
                } else {
                    format!("wish interpreter exited: {}", stderr)
                }))
            }
        }
    }

    /// Stop the subprocess.
    ///
    /// Drops the stdin writer (wish exits on EOF), kills the child process
    /// if it's still running, and waits for it to exit.
    fn stop(&mut self) {
        self.stdin_writer.take();

        if let Some(ref mut child) = self.child {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.child.take();
    }
}

impl Interpreter for WishInterpreter {
    fn name(&self) -> &str {
        &self.name
    }

    fn interps(&mut self) -> Result<Vec<String>> {
        self.request("interps", &[])
    }

    fn send(&mut self, target: &str, command: &str, args: &[String]) -> Result<String> {
        let mut words = Vec::with_capacity(args.len() + 2);
        words.push(target);
        words.push(command);
        words.extend(args.iter().map(String::as_str));
        let fields = self.request("send", &words)?;
        Ok(fields.into_iter().next().unwrap_or_default())
    }

    fn create_command(&mut self, name: &str) -> Result<()> {
        self.request("command", &[name]).map(|_| ())
    }

    fn poll_inbound(&mut self, wait: Duration) -> Result<Option<InboundCall>> {
        if wait.is_zero() {
            return match self.inbound.try_recv() {
                Ok(call) => Ok(Some(call)),
                Err(TryRecvError::Empty) => Ok(None),
                Err(TryRecvError::Disconnected) => {
                    Err(BridgeError::Connection("wish interpreter exited".into()))
                }
            };
        }
        match self.inbound.recv_timeout(wait) {
            Ok(call) => Ok(Some(call)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(BridgeError::Connection("wish interpreter exited".into()))
            }
        }
    }

    fn destroy(&mut self) -> Result<()> {
        if self.child.is_none() {
            return Ok(());
        }
        // The helper may already be gone; stopping it is all that matters
        if let Err(e) = self.request("destroy", &[]) {
            log::debug!("WishInterpreter: destroy request failed: {}", e);
        }
        self.stop();
        Ok(())
    }
}

impl Drop for WishInterpreter {
    fn drop(&mut self) {
        self.stop();
    }
}
