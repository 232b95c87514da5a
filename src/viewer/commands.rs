//! Verdi Command Language builders
//!
//! Each builder produces a [`ViewerCommand`]: a command name plus positional
//! arguments, sent verbatim to the viewer's interpreter. Many of these
//! commands accept further switches the builders do not expose.

use super::types::SearchDirection;

/// A viewer command ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerCommand {
    name: String,
    args: Vec<String>,
}

impl ViewerCommand {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Command name (first word of the script)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positional arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }

    // =========================================================================
    // File / value queries
    // =========================================================================

    /// Path of the waveform file loaded in the active window
    pub fn get_active_file_name() -> Self {
        Self::new("wvGetActiveFileName")
    }

    /// Value of `signal` at the cursor. `signal` must already be escaped.
    pub fn get_sig_value_by_time(signal: &str) -> Self {
        Self::new("wvGetSigValueByTime").arg(signal)
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    pub fn get_cursor() -> Self {
        Self::new("wvGetCursor")
    }

    pub fn set_cursor(time: &str) -> Self {
        Self::new("wvSetCursor").arg(time)
    }

    /// Scroll the waveform so the cursor is centered
    pub fn center_cursor() -> Self {
        Self::new("wvCenterCursor")
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Options travel as one list argument, e.g. `-anyChange`
    pub fn set_search_mode<S: AsRef<str>>(options: &[S]) -> Self {
        let joined = options
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        Self::new("wvSetSearchMode").arg(joined)
    }

    /// `wvSearchNextBySignal` / `wvSearchPrevBySignal` starting at `time`
    pub fn search_by_signal(direction: SearchDirection, signal: &str, time: &str) -> Self {
        Self::new(format!("wvSearch{}BySignal", direction))
            .arg(signal)
            .arg("-delim /")
            .arg(format!("-time {}", time))
    }

    // =========================================================================
    // Event callbacks
    // =========================================================================

    /// Ask the viewer to invoke `callback` in the application `local_name`
    /// whenever `reason` fires.
    pub fn add_event_callback(
        local_name: &str,
        callback: &str,
        reason: &str,
        asynchronous: bool,
    ) -> Self {
        Self::new("AddEventCallback")
            .arg(local_name)
            .arg(callback)
            .arg(reason)
            .arg(if asynchronous { "1" } else { "0" })
    }

    pub fn remove_event_callback(local_name: &str, callback: &str, reason: &str) -> Self {
        Self::new("RemoveEventCallback")
            .arg(local_name)
            .arg(callback)
            .arg(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_by_signal_names() {
        let cmd = ViewerCommand::search_by_signal(SearchDirection::Next, "/top/clk", "1500");
        assert_eq!(cmd.name(), "wvSearchNextBySignal");
        assert_eq!(cmd.args(), ["/top/clk", "-delim /", "-time 1500"]);

        let cmd = ViewerCommand::search_by_signal(SearchDirection::Prev, "/top/clk", "0");
        assert_eq!(cmd.name(), "wvSearchPrevBySignal");
    }

    #[test]
    fn test_set_search_mode_joins_options() {
        let cmd = ViewerCommand::set_search_mode(&["-anyChange"]);
        assert_eq!(cmd.args(), ["-anyChange"]);

        let cmd = ViewerCommand::set_search_mode(&["-value", "1"]);
        assert_eq!(cmd.args(), ["-value 1"]);
    }

    #[test]
    fn test_event_callback_flags() {
        let cmd = ViewerCommand::add_event_callback(
            "wave_interface",
            "time_change_callback",
            "wvCursorTimeChange",
            true,
        );
        assert_eq!(cmd.name(), "AddEventCallback");
        assert_eq!(
            cmd.args(),
            [
                "wave_interface",
                "time_change_callback",
                "wvCursorTimeChange",
                "1"
            ]
        );

        let cmd = ViewerCommand::add_event_callback("a", "b", "c", false);
        assert_eq!(cmd.args()[3], "0");
    }
}
