use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_autoassign"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "autoassign init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".github/auto_assign.toml");
    assert!(config_path.exists(), "auto_assign.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("addReviewers"));
    assert!(content.contains("numberOfReviewers"));

    let config: autoassign_core::Configuration = toml::from_str(&content).unwrap();
    config.validate().unwrap();
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".github")).unwrap();
    std::fs::write(dir.path().join(".github/auto_assign.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_autoassign"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".github/auto_assign.toml")).unwrap();
    assert_eq!(content, "# existing");
}
