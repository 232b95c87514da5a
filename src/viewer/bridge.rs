//! Viewer bridge
//!
//! [`ViewerBridge`] owns one [`Interpreter`] and drives a Verdi/nWave
//! instance through it:
//!
//! 1. On construction, list every reachable Tk interpreter and keep the ones
//!    whose name contains a viewer identifier ("verdi", "nWave").
//! 2. The caller picks one with [`ViewerBridge::set_wave_tk_name`].
//! 3. Command wrappers send Verdi Command Language commands and decode the
//!    replies.
//! 4. [`ViewerBridge::register_time_change_callback`] asks the viewer to call
//!    back into our interpreter when its cursor moves; the caller pumps those
//!    calls with [`ViewerBridge::process_events`] or
//!    [`ViewerBridge::wait_for_events`].

use std::time::Duration;

use super::commands::ViewerCommand;
use super::relay::{TimeChangeRelay, TimeChangeWork};
use super::reply;
use super::types::{CURSOR_TIME_CHANGE, Cursor, SearchDirection};
use crate::error::{BridgeError, Result};
use crate::interp::{InboundCall, Interpreter, WishInterpreter};
use wave_bridge_config::BridgeConfig;

/// Client for one waveform viewer reached through Tk `send`.
pub struct ViewerBridge {
    /// Connection to our local Tk interpreter
    interp: Box<dyn Interpreter>,
    /// Our interpreter's name, handed to the viewer for callbacks
    tk_name: String,
    /// Interpreter names that look like a viewer, in discovery order
    candidates: Vec<String>,
    /// Selected viewer interpreter
    wave_tk_name: Option<String>,
    /// Memoized `wvGetActiveFileName` result
    wave_filename: Option<String>,
    /// Local command registered with the viewer, if any
    time_change_name: Option<String>,
    relay: TimeChangeRelay,
    callback_command: String,
    asynchronous_callbacks: bool,
    search_options: Vec<String>,
}

impl ViewerBridge {
    /// Spawn a hidden `wish` helper and build a bridge on top of it.
    pub fn connect(config: &BridgeConfig) -> Result<Self> {
        config.validate()?;
        let wish_path = config.resolve_wish_path();
        crate::debug_info!("BRIDGE", "Starting Tk helper {:?}", wish_path);
        let interp = WishInterpreter::spawn(&wish_path, &config.app_class)?;
        Self::with_config(Box::new(interp), config)
    }

    /// Build a bridge over `interp` with default settings.
    pub fn new(interp: Box<dyn Interpreter>) -> Result<Self> {
        Self::with_config(interp, &BridgeConfig::default())
    }

    /// Build a bridge over `interp`, scanning for viewer candidates.
    pub fn with_config(mut interp: Box<dyn Interpreter>, config: &BridgeConfig) -> Result<Self> {
        let tk_name = interp.name().to_string();
        let candidates = find_candidates(&interp.interps()?, &config.viewer_identifiers);
        log::info!(
            "Tk interpreter {:?} found {} viewer candidate(s): {:?}",
            tk_name,
            candidates.len(),
            candidates
        );

        Ok(Self {
            interp,
            tk_name,
            candidates,
            wave_tk_name: config.target.clone(),
            wave_filename: None,
            time_change_name: None,
            relay: TimeChangeRelay::new(),
            callback_command: config.callback_command.clone(),
            asynchronous_callbacks: config.asynchronous_callbacks,
            search_options: config.search_options.clone(),
        })
    }

    // =========================================================================
    // Getters and setters
    // =========================================================================

    /// Possible viewer interpreter names
    pub fn get_candidates_for_wave_tk_name(&self) -> &[String] {
        &self.candidates
    }

    pub fn set_wave_tk_name(&mut self, wave_tk_name: impl Into<String>) {
        let name = wave_tk_name.into();
        if self.wave_tk_name.as_deref() != Some(name.as_str()) {
            self.wave_filename = None;
        }
        self.wave_tk_name = Some(name);
    }

    pub fn get_wave_tk_name(&self) -> Option<&str> {
        self.wave_tk_name.as_deref()
    }

    /// Our own interpreter name as seen by the viewer
    pub fn local_name(&self) -> &str {
        &self.tk_name
    }

    pub fn is_time_change_registered(&self) -> bool {
        self.time_change_name.is_some()
    }

    // =========================================================================
    // Verdi command wrappers
    // =========================================================================

    fn call(&mut self, command: &ViewerCommand) -> Result<String> {
        let target = self.wave_tk_name.as_deref().ok_or(BridgeError::NoTarget)?;
        crate::debug_log!(
            "BRIDGE",
            "send {} {} {:?}",
            target,
            command.name(),
            command.args()
        );
        let reply = self.interp.send(target, command.name(), command.args())?;
        crate::debug_log!("BRIDGE", "{} -> {:?}", command.name(), reply);
        Ok(reply)
    }

    /// Path of the waveform file loaded in the viewer.
    ///
    /// # Errors
    /// [`BridgeError::Protocol`] if the viewer returns an empty name.
    pub fn get_active_file_name(&mut self) -> Result<String> {
        let reply = self.call(&ViewerCommand::get_active_file_name())?;
        reply::require_non_empty(reply, "fsdb filename")
    }

    /// Raw value of `signal` at the cursor. Brackets in the path are escaped.
    pub fn get_signal_value_by_time(&mut self, signal: &str) -> Result<String> {
        let escaped = escape_signal(signal);
        self.call(&ViewerCommand::get_sig_value_by_time(&escaped))
    }

    pub fn get_cursor(&mut self) -> Result<Cursor> {
        let reply = self.call(&ViewerCommand::get_cursor())?;
        reply::parse_cursor(&reply)
    }

    pub fn set_cursor(&mut self, time: &str) -> Result<()> {
        let reply = self.call(&ViewerCommand::set_cursor(time))?;
        reply::check_status(&reply, "wvSetCursor")
    }

    pub fn center_cursor(&mut self) -> Result<()> {
        let reply = self.call(&ViewerCommand::center_cursor())?;
        reply::check_status(&reply, "wvCenterCursor")
    }

    pub fn set_search_mode<S: AsRef<str>>(&mut self, options: &[S]) -> Result<()> {
        let reply = self.call(&ViewerCommand::set_search_mode(options))?;
        reply::check_status(&reply, "wvSetSearchMode")
    }

    /// Search for the next/previous transition of an already escaped
    /// `signal` starting at `time`. Returns `None` when nothing matched.
    pub fn search_by_signal(
        &mut self,
        direction: SearchDirection,
        signal: &str,
        time: &str,
    ) -> Result<Option<String>> {
        let reply = self.call(&ViewerCommand::search_by_signal(direction, signal, time))?;
        reply::parse_search(&reply)
    }

    /// Register `callback` (a command in our interpreter) for `reason`.
    /// The reply carries nothing useful and is ignored.
    pub fn add_event_callback(
        &mut self,
        callback: &str,
        reason: &str,
        asynchronous: bool,
    ) -> Result<()> {
        let command =
            ViewerCommand::add_event_callback(&self.tk_name, callback, reason, asynchronous);
        self.call(&command).map(|_| ())
    }

    pub fn remove_event_callback(&mut self, callback: &str, reason: &str) -> Result<()> {
        let command = ViewerCommand::remove_event_callback(&self.tk_name, callback, reason);
        self.call(&command).map(|_| ())
    }

    // =========================================================================
    // Convenience operations
    // =========================================================================

    /// Waveform file name, fetched once. Doubles as a probe that the viewer
    /// is reachable.
    pub fn get_wave_filename(&mut self) -> Result<&str> {
        if self.wave_filename.is_none() {
            let filename = self.get_active_file_name()?;
            log::info!("Viewer has {:?} loaded", filename);
            self.wave_filename = Some(filename);
        }
        Ok(self.wave_filename.as_deref().unwrap_or_default())
    }

    pub fn get_time_at_cursor(&mut self) -> Result<String> {
        Ok(self.get_cursor()?.time)
    }

    /// Move the cursor to the next/previous change of `signal` and center
    /// the view on it. Returns the new time, or `None` (cursor untouched)
    /// when the signal does not change in that direction.
    pub fn search_signal_change(
        &mut self,
        signal: &str,
        direction: SearchDirection,
    ) -> Result<Option<String>> {
        let options = self.search_options.clone();
        self.set_search_mode(&options)?;
        let escaped = escape_signal(signal);
        let time = self.get_time_at_cursor()?;
        let new_time = self.search_by_signal(direction, &escaped, &time)?;
        if let Some(new_time) = &new_time {
            self.set_cursor(new_time)?;
            self.center_cursor()?;
        }
        Ok(new_time)
    }

    // =========================================================================
    // Cursor time-change notifications
    // =========================================================================

    /// Append callbacks run, in order, with the new cursor time.
    pub fn add_time_change_work<I>(&mut self, callbacks: I)
    where
        I: IntoIterator<Item = TimeChangeWork>,
    {
        self.relay.add_work(callbacks);
    }

    /// Append one infallible callback.
    pub fn add_time_change_fn<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.relay.add_fn(callback);
    }

    /// Install the local relay command and subscribe it to the viewer's
    /// cursor time-change event.
    ///
    /// Calling this twice subscribes twice on the viewer side, and every
    /// notification is then delivered twice.
    ///
    /// The local command is marked registered before `AddEventCallback` is
    /// sent. If that send fails the bridge still counts as registered and
    /// keeps accepting inbound calls until [`Self::cleanup`] or
    /// [`Self::unregister_time_change_callback`].
    pub fn register_time_change_callback(&mut self) -> Result<()> {
        if self.time_change_name.is_some() {
            log::warn!(
                "Time change callback already registered; the viewer will notify twice"
            );
        }
        let name = self.callback_command.clone();
        self.interp.create_command(&name)?;
        self.time_change_name = Some(name.clone());
        self.add_event_callback(&name, CURSOR_TIME_CHANGE, self.asynchronous_callbacks)?;
        crate::debug_info!("BRIDGE", "Registered {} for {}", name, CURSOR_TIME_CHANGE);
        Ok(())
    }

    /// Remove the viewer-side subscription. No-op if never registered.
    pub fn unregister_time_change_callback(&mut self) -> Result<()> {
        if let Some(name) = self.time_change_name.clone() {
            self.remove_event_callback(&name, CURSOR_TIME_CHANGE)?;
            self.time_change_name = None;
            crate::debug_info!("BRIDGE", "Unregistered {}", name);
        }
        Ok(())
    }

    /// Relay every notification already received, without blocking.
    /// Returns how many reached the callbacks.
    pub fn process_events(&mut self) -> Result<usize> {
        let mut relayed = 0;
        while let Some(call) = self.interp.poll_inbound(Duration::ZERO)? {
            relayed += self.dispatch_inbound(call)?;
        }
        Ok(relayed)
    }

    /// Wait up to `timeout` for a notification, then relay everything
    /// pending. Returns how many reached the callbacks.
    pub fn wait_for_events(&mut self, timeout: Duration) -> Result<usize> {
        let mut relayed = match self.interp.poll_inbound(timeout)? {
            Some(call) => self.dispatch_inbound(call)?,
            None => return Ok(0),
        };
        relayed += self.process_events()?;
        Ok(relayed)
    }

    fn dispatch_inbound(&mut self, call: InboundCall) -> Result<usize> {
        if self.time_change_name.as_deref() != Some(call.command.as_str()) {
            log::warn!(
                "Ignoring call to unregistered local command {:?} {:?}",
                call.command,
                call.args
            );
            return Ok(0);
        }
        self.relay.handle(&call.args)?;
        Ok(1)
    }

    /// Unregister from the viewer (if registered) and release the
    /// interpreter. Safe to call more than once.
    ///
    /// The interpreter is released even when unregistering fails; the first
    /// error is returned.
    pub fn cleanup(&mut self) -> Result<()> {
        let unregistered = self.unregister_time_change_callback();
        if let Err(e) = &unregistered {
            log::warn!("Failed to unregister time change callback: {}", e);
        }
        let destroyed = self.interp.destroy();
        unregistered.and(destroyed)
    }
}

impl std::fmt::Debug for ViewerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerBridge")
            .field("tk_name", &self.tk_name)
            .field("candidates", &self.candidates)
            .field("wave_tk_name", &self.wave_tk_name)
            .field("wave_filename", &self.wave_filename)
            .field("time_change_name", &self.time_change_name)
            .field("relay", &self.relay)
            .finish_non_exhaustive()
    }
}

/// Keep interpreter names containing any viewer identifier, in scan order.
pub fn find_candidates<S: AsRef<str>>(interps: &[String], identifiers: &[S]) -> Vec<String> {
    interps
        .iter()
        .filter(|interp| {
            identifiers
                .iter()
                .map(AsRef::as_ref)
                .any(|id| !id.is_empty() && interp.contains(id))
        })
        .cloned()
        .collect()
}

/// Escape a signal path for the viewer's Tcl parser.
///
/// Brackets would otherwise trigger command substitution on the viewer
/// side, so each `[` and `]` gets a preceding backslash.
pub fn escape_signal(signal: &str) -> String {
    let mut escaped = String::with_capacity(signal.len() + 4);
    for ch in signal.chars() {
        if matches!(ch, '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_signal() {
        assert_eq!(escape_signal("foo[3]"), "foo\\[3\\]");
        assert_eq!(escape_signal("/top/u0/data[7:0]"), "/top/u0/data\\[7:0\\]");
        assert_eq!(escape_signal("/top/clk"), "/top/clk");
        assert_eq!(escape_signal(""), "");
        assert_eq!(escape_signal("]["), "\\]\\[");
    }

    #[test]
    fn test_escape_signal_every_bracket_preceded_once() {
        let input = "a[b]]c[[d";
        let escaped = escape_signal(input);
        let chars: Vec<char> = escaped.chars().collect();
        for (i, ch) in chars.iter().enumerate() {
            if matches!(ch, '[' | ']') {
                assert_eq!(chars[i - 1], '\\');
            }
        }
        assert_eq!(escaped.replace('\\', ""), input);
    }

    #[test]
    fn test_find_candidates() {
        let interps: Vec<String> = [
            "wish",
            "nWave:2",
            "wave_interface",
            "verdi",
            "Verdi_old",
            "xnWave",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let found = find_candidates(&interps, &["verdi", "nWave"]);
        assert_eq!(found, ["nWave:2", "verdi", "xnWave"]);
    }

    #[test]
    fn test_find_candidates_lists_each_name_once() {
        let interps = vec!["verdi_nWave".to_string()];
        assert_eq!(find_candidates(&interps, &["verdi", "nWave"]), ["verdi_nWave"]);
    }

    #[test]
    fn test_find_candidates_ignores_empty_identifier() {
        let interps = vec!["wish".to_string()];
        assert!(find_candidates(&interps, &[""]).is_empty());
    }
}
