//! Cursor time-change relay.
//!
//! [`TimeChangeRelay`] holds the ordered list of callbacks ("work") and runs
//! them when the viewer reports a cursor move. There is no isolation between
//! callbacks: the first one to fail stops the rest for that notification.

use super::types::TimeChangeEvent;
use crate::error::{BridgeError, CallbackError, Result};

/// A callback receiving the new cursor time.
pub type TimeChangeWork = Box<dyn FnMut(&str) -> std::result::Result<(), CallbackError>>;

/// Ordered, append-only list of time-change callbacks.
#[derive(Default)]
pub struct TimeChangeRelay {
    work: Vec<TimeChangeWork>,
}

impl TimeChangeRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append callbacks, keeping their order.
    pub fn add_work<I>(&mut self, callbacks: I)
    where
        I: IntoIterator<Item = TimeChangeWork>,
    {
        self.work.extend(callbacks);
    }

    /// Append one infallible callback.
    pub fn add_fn<F>(&mut self, mut callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.work.push(Box::new(move |time: &str| {
            callback(time);
            Ok(())
        }));
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.work.len()
    }

    pub fn is_empty(&self) -> bool {
        self.work.is_empty()
    }

    /// Handle one notification: `(reason, time, signal_path, file_path)`.
    ///
    /// # Errors
    /// [`BridgeError::InvalidArgument`] for an unknown reason (no callback
    /// runs), or [`BridgeError::Callback`] for the first failing callback.
    pub fn handle(&mut self, args: &[String]) -> Result<TimeChangeEvent> {
        let event = TimeChangeEvent::from_args(args)?;
        crate::debug_log!(
            "RELAY",
            "Cursor moved to {} ({} callbacks)",
            event.time,
            self.work.len()
        );

        for (index, work) in self.work.iter_mut().enumerate() {
            work(&event.time).map_err(|source| BridgeError::Callback { index, source })?;
        }
        Ok(event)
    }
}

impl std::fmt::Debug for TimeChangeRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeChangeRelay")
            .field("work", &self.work.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn notification(reason: &str, time: &str) -> Vec<String> {
        vec![
            reason.to_string(),
            time.to_string(),
            "/top/clk".to_string(),
            "/tmp/dump.fsdb".to_string(),
        ]
    }

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> TimeChangeWork {
        let log = Rc::clone(log);
        Box::new(move |time: &str| {
            log.borrow_mut().push(format!("{}({})", tag, time));
            Ok(())
        })
    }

    #[test]
    fn test_callbacks_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut relay = TimeChangeRelay::new();
        relay.add_work([recorder(&log, "a"), recorder(&log, "b")]);
        relay.add_work([recorder(&log, "c")]);

        let event = relay.handle(&notification("wvCursorTimeChange", "500")).unwrap();
        assert_eq!(event.time, "500");
        assert_eq!(*log.borrow(), ["a(500)", "b(500)", "c(500)"]);
    }

    #[test]
    fn test_unknown_reason_runs_nothing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut relay = TimeChangeRelay::new();
        relay.add_work([recorder(&log, "a")]);

        let err = relay.handle(&notification("otherEvent", "500")).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_failing_callback_stops_later_ones() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut relay = TimeChangeRelay::new();
        relay.add_work([
            recorder(&log, "a"),
            Box::new(|_: &str| -> std::result::Result<(), CallbackError> {
                Err("boom".into())
            }) as TimeChangeWork,
            recorder(&log, "c"),
        ]);

        match relay.handle(&notification("wvCursorTimeChange", "7")) {
            Err(BridgeError::Callback { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected callback error, got {:?}", other),
        }
        assert_eq!(*log.borrow(), ["a(7)"]);
    }

    #[test]
    fn test_add_fn_and_duplicates_are_kept() {
        let count = Rc::new(RefCell::new(0));
        let mut relay = TimeChangeRelay::new();
        for _ in 0..2 {
            let count = Rc::clone(&count);
            relay.add_fn(move |_| *count.borrow_mut() += 1);
        }
        assert_eq!(relay.len(), 2);

        relay.handle(&notification("wvCursorTimeChange", "1")).unwrap();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_empty_relay_accepts_notification() {
        let mut relay = TimeChangeRelay::new();
        assert!(relay.is_empty());
        assert!(relay.handle(&notification("wvCursorTimeChange", "1")).is_ok());
    }
}
