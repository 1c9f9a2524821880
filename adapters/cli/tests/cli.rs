use std::process::{Command, Output};

const SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../scenarios/cavern.toml");

fn cavefall(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cavefall"))
        .args(["--scenario", SCENARIO, "--seed", "7"])
        .args(args)
        .output()
        .expect("failed to run the cavefall binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn quake_reports_and_redraws_the_map() {
    let output = cavefall(&["quake", "--at", "4,17", "--radius", "3"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("XXXXXXXXXXXXXXXXXXXXXXXX"));
    assert!(text.contains("player at (4, 5)"));
}

#[test]
fn the_same_seed_prints_the_same_outcome() {
    let first = cavefall(&["ball", "--kind", "fire", "--dice", "4d6", "--radius", "2"]);
    let second = cavefall(&["ball", "--kind", "fire", "--dice", "4d6", "--radius", "2"]);

    assert!(first.status.success());
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn a_missing_scenario_is_an_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_cavefall"))
        .args(["--scenario", "no/such/scenario.toml", "light"])
        .output()
        .expect("failed to run the cavefall binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load scenario"));
}
