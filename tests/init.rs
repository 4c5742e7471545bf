use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_prgate"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "prgate init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".prgate.toml");
    assert!(config_path.exists(), ".prgate.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("pr-title-regex"));
    assert!(content.contains("%regex%"));

    // Everything is commented out, so it parses to the defaults.
    let config: prgate_core::PrGateConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.bot_login, "github-actions[bot]");
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".prgate.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_prgate"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".prgate.toml")).unwrap();
    assert_eq!(content, "# existing");
}
