use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

fn sir_grid() -> Command {
    Command::cargo_bin("sir-grid").unwrap()
}

#[test]
fn writes_report_with_default_name() {
    let temp_dir = tempdir().unwrap();
    sir_grid()
        .args(["--grid-size", "15", "--max-days", "12", "--no-stats"])
        .args(["--initial-infected-fraction", "0.05", "-r", "7"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    let report = temp_dir.path().join("SIR_0.166_0.037_12_15.csv");
    let contents = fs::read_to_string(report).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some(
            "day,susceptible,infectious,recovered,\
             susceptible_fraction,infectious_fraction,recovered_fraction"
        )
    );
    let first = lines.next().unwrap();
    assert!(first.starts_with("0,"));
    for line in contents.lines().skip(1) {
        let counts: Vec<usize> = line
            .split(',')
            .skip(1)
            .take(3)
            .map(|field| field.parse().unwrap())
            .collect();
        assert_eq!(counts.iter().sum::<usize>(), 225);
    }
}

#[test]
fn same_seed_same_report() {
    let run = || {
        let temp_dir = tempdir().unwrap();
        sir_grid()
            .args(["--grid-size", "20", "--max-days", "15", "--no-stats"])
            .args(["--masked-fraction", "0.3", "--introvert-fraction", "0.2"])
            .args(["--random-seed", "11", "--output", "run.csv"])
            .arg("--output-dir")
            .arg(temp_dir.path())
            .assert()
            .success();
        fs::read_to_string(temp_dir.path().join("run.csv")).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn thread_count_does_not_change_report() {
    let run = |threads: &str| {
        let temp_dir = tempdir().unwrap();
        sir_grid()
            .args(["--grid-size", "25", "--max-days", "10", "--no-stats"])
            .args(["--contact-tracing-fraction", "0.2", "--quarantine-fraction", "0.2"])
            .args(["--threads", threads, "--output", "run.csv"])
            .arg("--output-dir")
            .arg(temp_dir.path())
            .assert()
            .success();
        fs::read_to_string(temp_dir.path().join("run.csv")).unwrap()
    };
    assert_eq!(run("1"), run("4"));
}

#[test]
fn render_prints_frames() {
    let temp_dir = tempdir().unwrap();
    let output = sir_grid()
        .args(["--grid-size", "4", "--max-days", "1", "--no-stats", "--render"])
        .args(["--initial-infected-fraction", "1.0", "--masked-fraction", "0"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.starts_with("S: 0.00%, I: 100.00%, R: 0.00%\n"));
    // Four characters per cell: the status padded to three, then the behavior flag.
    assert!(stdout.contains(&format!("{}\n", " I  ".repeat(4))));
    assert!(stdout.contains("Report written to"));
}

#[test]
fn config_file_is_loaded() {
    let temp_dir = tempdir().unwrap();
    let config = temp_dir.path().join("params.json");
    fs::write(&config, r#"{ "grid_size": 6, "max_days": 2, "recovery_rate": 1.0 }"#).unwrap();
    sir_grid()
        .arg("--config")
        .arg(&config)
        .args(["--no-stats", "--output", "cfg.csv"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .assert()
        .success();
    assert!(temp_dir.path().join("cfg.csv").exists());
}

#[test]
fn rejects_out_of_range_rate() {
    let temp_dir = tempdir().unwrap();
    let output = sir_grid()
        .args(["--recovery-rate", "1.5", "--no-stats"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8(output).unwrap().contains("recovery_rate"));
}

#[test]
fn refuses_to_overwrite_without_force() {
    let temp_dir = tempdir().unwrap();
    let args = [
        "--grid-size",
        "5",
        "--max-days",
        "2",
        "--no-stats",
        "--output",
        "same.csv",
    ];
    let run = |force: bool| {
        let mut command = sir_grid();
        command.args(args).arg("--output-dir").arg(temp_dir.path());
        if force {
            command.arg("--force-overwrite");
        }
        command.assert()
    };
    run(false).success();
    run(false).failure();
    run(true).success();
}

#[test]
fn non_csv_output_is_rejected() {
    let temp_dir = tempdir().unwrap();
    sir_grid()
        .args(["--grid-size", "5", "--no-stats", "--output", "report.txt"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn custom_args_reach_setup_function() {
    let temp_dir = tempdir().unwrap();
    Command::cargo_bin("runner_test_custom_args")
        .unwrap()
        .args(["--uniform-mix", "0.25", "--grid-size", "5", "--max-days", "2"])
        .args(["--no-stats", "--output", "custom.csv"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout("0.25\n");
}
