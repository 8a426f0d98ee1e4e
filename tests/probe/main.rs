use std::process::{Command, Output};

fn run_probe(extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_probe"))
        .args(["--len", "32", "--repetitions", "50", "--batch", "4", "--warmup", "10"])
        .args(extra)
        .output()
        .expect("Failed to execute probe")
}

#[test]
fn test_probe_runs_without_crash() {
    let output = run_probe(&[]);
    assert!(output.status.success());
}

#[test]
fn test_probe_output_format() {
    let output = run_probe(&["--leaky", "--show-inputs"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("Running constant-time comparison probe..."));
    assert!(stdout.contains("Buffer size: 32 bytes"));
    assert!(stdout.contains("Repetitions: 50"));
    for name in [
        "fastest-backward",
        "fastest-forward",
        "safest-backward",
        "safest-forward",
        "masked16",
        "early-exit (variable-time)",
    ] {
        assert!(stdout.contains(name), "missing {} in:\n{}", name, stdout);
    }
    assert!(stdout.contains("second-half"));
    assert!(stdout.contains("of 6 comparators distinguishable"));
}

#[test]
fn test_probe_statistics_sanity() {
    let output = run_probe(&["-s", "masked16"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let rows: Vec<_> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("equal") || line.starts_with("full"))
        .collect();
    assert_eq!(rows.len(), 2);

    for row in rows {
        let fields: Vec<&str> = row.split_whitespace().collect();
        let samples: u64 = fields[1].parse().unwrap();
        let mean: f64 = fields[2].parse().unwrap();
        assert_eq!(samples, 50);
        assert!(mean >= 0.0 && mean.is_finite());
    }
}

#[test]
fn test_probe_rejects_bad_arguments() {
    assert!(!run_probe(&["--strategy", "memcmp"]).status.success());
    assert!(!run_probe(&["--threshold", "0"]).status.success());

    let output = Command::new(env!("CARGO_BIN_EXE_probe"))
        .args(["--repetitions", "1"])
        .output()
        .expect("Failed to execute probe");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid harness configuration"), "{}", stderr);
}
