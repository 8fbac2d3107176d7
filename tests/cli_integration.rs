//! End-to-end runs of the binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_solar-surplus-sim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("solar-surplus-sim process should run")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("solar-surplus-sim-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

#[test]
fn demo_run_prints_both_reports() {
    let output = run(&["--demo-days", "3", "--period", "daily"]);
    assert!(
        output.status.success(),
        "demo run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Battery Report ---"));
    assert!(stdout.contains("--- Boiler Report ---"));
    assert!(stdout.contains("2024-06-03"));
}

#[test]
fn csv_input_with_tables_and_json() {
    let dir = scratch_dir("csv");
    let input = dir.join("input.csv");
    let mut csv = String::from("Date/Time,Energy Produced (Wh),Energy Consumed (Wh)\n");
    for hour in 0..48 {
        let produced = if (9..17).contains(&(hour % 24)) { 1800 } else { 0 };
        csv.push_str(&format!(
            "2024-07-{:02} {:02}:00:00,{produced},450\n",
            1 + hour / 24,
            hour % 24
        ));
    }
    fs::write(&input, csv).expect("input should be writable");

    let tables = dir.join("tables");
    let json = dir.join("summary.json");
    let output = run(&[
        "--input",
        input.to_str().unwrap(),
        "--preset",
        "small_home",
        "--storage",
        "battery",
        "--results-out",
        tables.to_str().unwrap(),
        "--summary-json",
        json.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "csv run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let rows = fs::read_to_string(tables.join("battery.csv")).unwrap();
    assert_eq!(rows.lines().count(), 1 + 48);
    let daily = fs::read_to_string(tables.join("battery_daily.csv")).unwrap();
    assert_eq!(daily.lines().count(), 1 + 2);
    assert!(!tables.join("boiler.csv").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(summary["period"], "daily");
    assert_eq!(summary["intervals"], 48);
    assert_eq!(summary["battery"]["days"], 2);
    assert_eq!(summary["battery"]["interval_hours"], 1.0);
    assert!(summary["boiler"].is_null());
    assert_eq!(summary["battery_periods"].as_array().map(Vec::len), Some(2));
    assert_eq!(summary["data"]["days_covered"], 2);
    assert_eq!(summary["data"]["first_date"], "2024-07-01");
    assert_eq!(summary["data"]["interval_minutes"], 60.0);
    assert_eq!(summary["hourly_averages"].as_array().map(Vec::len), Some(24));
    assert_eq!(summary["hourly_averages"][9]["produced_kwh"], 1.8);
    assert_eq!(summary["seasonal_averages"][0]["season"], "summer");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unknown_preset_fails() {
    let output = run(&["--preset", "castle"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}

#[test]
fn invalid_config_reports_every_field() {
    let dir = scratch_dir("config");
    let path = dir.join("bad.toml");
    fs::write(
        &path,
        "[battery]\nefficiency = 1.5\n\n[boiler]\ngas_energy_kwh_per_m3 = 0.0\n",
    )
    .unwrap();

    let output = run(&["--config", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("battery.efficiency"));
    assert!(stderr.contains("boiler.gas_energy_kwh_per_m3"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_file_fails() {
    let output = run(&["--input", "/nonexistent/data.csv"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load input"));
}
