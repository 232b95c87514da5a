//! Core data types for the viewer bridge

use crate::error::BridgeError;
use std::fmt;
use std::str::FromStr;

/// Event reason the viewer reports when its cursor moves.
pub const CURSOR_TIME_CHANGE: &str = "wvCursorTimeChange";

/// Cursor position as reported by `wvGetCursor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Time at the cursor, in `timescale` units.
    pub time: String,
    /// Unit of `time` (e.g. "1ns").
    pub timescale: String,
}

/// Direction for `wvSearchNextBySignal` / `wvSearchPrevBySignal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// Search forward from the given time.
    Next,
    /// Search backward from the given time.
    Prev,
}

impl SearchDirection {
    /// The token spliced into the viewer command name.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchDirection::Next => "Next",
            SearchDirection::Prev => "Prev",
        }
    }
}

impl fmt::Display for SearchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchDirection {
    type Err = BridgeError;

    /// Only the exact tokens "Next" and "Prev" are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Next" => Ok(SearchDirection::Next),
            "Prev" => Ok(SearchDirection::Prev),
            other => Err(BridgeError::InvalidArgument(format!(
                "illegal search direction '{}', expected Next or Prev",
                other
            ))),
        }
    }
}

/// A cursor-time-change notification delivered by the viewer.
///
/// The viewer invokes the registered local command with
/// `(reason, time, signal_path, file_path)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeChangeEvent {
    /// New cursor time.
    pub time: String,
    /// Signal the cursor was clocked on, when reported.
    pub signal_path: Option<String>,
    /// Waveform file path, when reported.
    pub file_path: Option<String>,
}

impl TimeChangeEvent {
    /// Decode the arguments of an inbound notification.
    ///
    /// # Errors
    /// [`BridgeError::InvalidArgument`] if the reason is not
    /// [`CURSOR_TIME_CHANGE`] or the time argument is missing.
    pub fn from_args(args: &[String]) -> Result<Self, BridgeError> {
        let reason = args.first().map(String::as_str).unwrap_or_default();
        if reason != CURSOR_TIME_CHANGE {
            return Err(BridgeError::InvalidArgument(format!(
                "unknown callback reason '{}'",
                reason
            )));
        }
        let time = args.get(1).cloned().ok_or_else(|| {
            BridgeError::InvalidArgument(format!("{} notification without a time", reason))
        })?;
        Ok(Self {
            time,
            signal_path: args.get(2).cloned(),
            file_path: args.get(3).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("Next".parse::<SearchDirection>().unwrap(), SearchDirection::Next);
        assert_eq!("Prev".parse::<SearchDirection>().unwrap(), SearchDirection::Prev);
        assert!(matches!(
            "next".parse::<SearchDirection>(),
            Err(BridgeError::InvalidArgument(_))
        ));
        assert!(matches!(
            "Up".parse::<SearchDirection>(),
            Err(BridgeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_event_from_full_args() {
        let event = TimeChangeEvent::from_args(&strings(&[
            "wvCursorTimeChange",
            "500",
            "/top/clk",
            "/tmp/dump.fsdb",
        ]))
        .unwrap();
        assert_eq!(event.time, "500");
        assert_eq!(event.signal_path.as_deref(), Some("/top/clk"));
        assert_eq!(event.file_path.as_deref(), Some("/tmp/dump.fsdb"));
    }

    #[test]
    fn test_event_rejects_unknown_reason() {
        let err = TimeChangeEvent::from_args(&strings(&["otherEvent", "500"])).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        assert!(TimeChangeEvent::from_args(&[]).is_err());
    }

    #[test]
    fn test_event_requires_time() {
        let err = TimeChangeEvent::from_args(&strings(&["wvCursorTimeChange"])).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
    }
}
