use std::process::Command;

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_scaplat"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("scaplat SCA platform simulator"));
}

#[test]
fn test_cli_missing_board_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_scaplat"))
        .arg("-b")
        .arg("non_existent_board.yaml")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_requires_board_or_script() {
    let output = Command::new(env!("CARGO_BIN_EXE_scaplat"))
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_zero_seed_rejected() {
    let path = std::env::temp_dir().join(format!("scaplat-zero-seed-{}.yaml", std::process::id()));
    std::fs::write(&path, "name: z\nseed: 3\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_scaplat"))
        .args(["-b", path.to_str().unwrap(), "--seed", "0"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let _ = std::fs::remove_file(&path);
}
