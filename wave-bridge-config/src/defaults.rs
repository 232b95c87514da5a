//! Default values for [`crate::BridgeConfig`] fields.

// ── Transport ──────────────────────────────────────────────────────────────

pub fn wish_path() -> String {
    "wish".to_string()
}

/// Tk application name the bridge registers under.
pub fn app_class() -> String {
    "wave_interface".to_string()
}

// ── Viewer discovery ───────────────────────────────────────────────────────

pub fn viewer_identifiers() -> Vec<String> {
    vec!["verdi".to_string(), "nWave".to_string()]
}

// ── Notifications ──────────────────────────────────────────────────────────

pub fn callback_command() -> String {
    "time_change_callback".to_string()
}

pub fn bool_true() -> bool {
    true
}

// ── Search ─────────────────────────────────────────────────────────────────

pub fn search_options() -> Vec<String> {
    vec!["-anyChange".to_string()]
}
