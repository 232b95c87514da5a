//! Decoders for the viewer's textual replies.
//!
//! Replies are plain strings. Most commands answer `"0"` on failure;
//! structured replies are single-space separated tokens at fixed positions.

use super::types::Cursor;
use crate::error::{BridgeError, Result};

const FAILURE: &str = "0";

/// Fail if the viewer answered with its failure flag.
pub fn check_status(reply: &str, what: &str) -> Result<()> {
    if reply == FAILURE {
        return Err(BridgeError::Protocol(format!("{} failure", what)));
    }
    Ok(())
}

/// Fail if a mandatory reply is empty.
pub fn require_non_empty(reply: String, what: &str) -> Result<String> {
    if reply.is_empty() {
        return Err(BridgeError::Protocol(format!("No {} returned", what)));
    }
    Ok(reply)
}

/// Decode a `wvGetCursor` reply.
///
/// Token layout: `[0]` success flag, `[1]` time, `[2]` "x", `[3]` timescale.
pub fn parse_cursor(reply: &str) -> Result<Cursor> {
    check_status(reply, "wvGetCursor")?;
    let tokens: Vec<&str> = reply.split(' ').collect();
    match (tokens.get(1), tokens.get(3)) {
        (Some(time), Some(timescale)) => Ok(Cursor {
            time: time.to_string(),
            timescale: timescale.to_string(),
        }),
        _ => Err(BridgeError::Protocol(format!(
            "malformed wvGetCursor reply '{}'",
            reply
        ))),
    }
}

/// Decode a `wvSearch{Next,Prev}BySignal` reply.
///
/// `"0"` means nothing matched; otherwise `[0]` success flag, `[1]` time.
pub fn parse_search(reply: &str) -> Result<Option<String>> {
    if reply == FAILURE {
        return Ok(None);
    }
    reply
        .split(' ')
        .nth(1)
        .map(|time| Some(time.to_string()))
        .ok_or_else(|| BridgeError::Protocol(format!("malformed search reply '{}'", reply)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cursor() {
        let cursor = parse_cursor("1 1500 x 1ns").unwrap();
        assert_eq!(cursor.time, "1500");
        assert_eq!(cursor.timescale, "1ns");
    }

    #[test]
    fn test_parse_cursor_failure_flag() {
        assert!(matches!(parse_cursor("0"), Err(BridgeError::Protocol(_))));
    }

    #[test]
    fn test_parse_cursor_short_reply() {
        assert!(matches!(parse_cursor("1 1500"), Err(BridgeError::Protocol(_))));
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(parse_search("0").unwrap(), None);
        assert_eq!(parse_search("1 2200").unwrap(), Some("2200".to_string()));
        assert!(matches!(parse_search("1"), Err(BridgeError::Protocol(_))));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("1", "wvSetCursor").is_ok());
        assert!(check_status("", "wvSetCursor").is_ok());
        match check_status("0", "wvSetCursor") {
            Err(BridgeError::Protocol(msg)) => assert_eq!(msg, "wvSetCursor failure"),
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_require_non_empty() {
        assert_eq!(
            require_non_empty("/tmp/a.fsdb".to_string(), "fsdb filename").unwrap(),
            "/tmp/a.fsdb"
        );
        assert!(require_non_empty(String::new(), "fsdb filename").is_err());
    }
}
