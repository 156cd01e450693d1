use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn switchboard_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_switchboard").expect("switchboard test binary not built")
}

#[test]
fn switchboard_help_mentions_name() {
    let output = Command::new(switchboard_bin())
        .arg("--help")
        .output()
        .expect("run switchboard --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Switchboard"));
    assert!(combined.contains("--confirm-ms"));
}

#[test]
fn switchboard_rejects_missing_script() {
    let output = Command::new(switchboard_bin())
        .args(["--mute", "--script", "/definitely/not/here.json"])
        .output()
        .expect("run switchboard with a missing script");
    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("--script"));
}
