use wave_bridge::{BridgeConfig, BridgeError, ConfigError, LogLevel, ViewerBridge};

#[test]
fn test_partial_yaml_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "target: \"nWave:1\"\nsearch_options: [\"-anyChange\", \"-rising\"]\nlog_level: debug\n",
    )
    .unwrap();

    let config = BridgeConfig::load_from(&path).unwrap();
    assert_eq!(config.target.as_deref(), Some("nWave:1"));
    assert_eq!(config.search_options, ["-anyChange", "-rising"]);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.wish_path, "wish");
    assert_eq!(config.viewer_identifiers, ["verdi", "nWave"]);
    assert_eq!(config.callback_command, "time_change_callback");
    assert!(config.asynchronous_callbacks);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "viewer_identifiers: [\"\"]\n").unwrap();

    assert!(matches!(
        BridgeConfig::load_from(&path),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_connect_validates_before_spawning() {
    let config = BridgeConfig {
        wish_path: String::new(),
        ..BridgeConfig::default()
    };
    match ViewerBridge::connect(&config) {
        Err(BridgeError::Config(ConfigError::Validation(msg))) => {
            assert!(msg.contains("wish_path"));
        }
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");
    let config = BridgeConfig {
        target: Some("verdi".to_string()),
        asynchronous_callbacks: false,
        ..BridgeConfig::default()
    };
    config.save_to(&path).unwrap();

    let loaded = BridgeConfig::load_from(&path).unwrap();
    assert_eq!(loaded.target.as_deref(), Some("verdi"));
    assert!(!loaded.asynchronous_callbacks);
}
