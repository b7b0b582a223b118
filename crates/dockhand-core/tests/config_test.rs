use dockhand_core::DockhandConfig;
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = DockhandConfig::load(tmp.path()).unwrap();

    assert_eq!(config.agent.model, "gemini-2.5-flash");
    assert_eq!(config.agent.max_turns, 15);
    assert!((config.agent.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(
        config.agent.endpoint,
        "https://generativelanguage.googleapis.com/v1beta"
    );
    assert_eq!(config.agent.api_key_env, "GEMINI_API_KEY");
    assert_eq!(config.agent.request_timeout_secs, 120);
    assert_eq!(config.build.program, "docker");
    assert_eq!(config.build.platform, "linux/amd64");
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[agent]
model = "gemini-2.5-pro"
max_turns = 30
temperature = 0.0
endpoint = "http://localhost:9000/v1beta"
api_key_env = "MY_KEY"
request_timeout_secs = 10

[build]
program = "podman"
platform = "linux/arm64"
"#;
    std::fs::write(tmp.path().join("dockhand.toml"), toml).unwrap();

    let config = DockhandConfig::load(tmp.path()).unwrap();

    assert_eq!(config.agent.model, "gemini-2.5-pro");
    assert_eq!(config.agent.max_turns, 30);
    assert_eq!(config.agent.temperature, 0.0);
    assert_eq!(config.agent.endpoint, "http://localhost:9000/v1beta");
    assert_eq!(config.agent.api_key_env, "MY_KEY");
    assert_eq!(config.agent.request_timeout_secs, 10);
    assert_eq!(config.build.program, "podman");
    assert_eq!(config.build.platform, "linux/arm64");
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[agent]
max_turns = 5
"#;
    std::fs::write(tmp.path().join("dockhand.toml"), toml).unwrap();

    let config = DockhandConfig::load(tmp.path()).unwrap();

    assert_eq!(config.agent.max_turns, 5);
    // Defaults preserved
    assert_eq!(config.agent.model, "gemini-2.5-flash");
    assert_eq!(config.build.program, "docker");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("dockhand.toml"), "not valid {{{{ toml").unwrap();

    let result = DockhandConfig::load(tmp.path());
    assert!(result.is_err());

    let err = result.unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_empty_config_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("dockhand.toml"), "").unwrap();

    let config = DockhandConfig::load(tmp.path()).unwrap();
    assert_eq!(config.agent.max_turns, 15);
}

#[test]
fn load_rejects_wrong_field_type() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("dockhand.toml"),
        "[agent]\nmax_turns = \"many\"\n",
    )
    .unwrap();

    assert!(DockhandConfig::load(tmp.path()).is_err());
}
