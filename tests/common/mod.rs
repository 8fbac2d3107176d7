//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use solar_surplus_sim::config::BatteryConfig;
use solar_surplus_sim::series::{InputSeries, Interval};
use solar_surplus_sim::synthetic::{DemoProfile, generate};

/// Midnight of 2024-06-01, a Saturday.
pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

/// Hourly series starting at `start()`; positive values are production, negative consumption (Wh).
pub fn hourly_surplus(surplus_wh: &[f64]) -> InputSeries {
    let intervals = surplus_wh
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let (p, c) = if s >= 0.0 { (s, 0.0) } else { (0.0, -s) };
            Interval::new(start() + TimeDelta::hours(i as i64), p, c)
        })
        .collect();
    InputSeries::new(intervals).unwrap()
}

/// Default synthetic household at 15-minute resolution.
pub fn demo_series(days: u32, seed: u64) -> InputSeries {
    generate(start(), days, &DemoProfile::default(), seed)
}

/// 1.5 kWh battery, 90 % efficiency, 1 kW both ways, full SoC window.
pub fn small_battery() -> BatteryConfig {
    BatteryConfig {
        capacity_kwh: 1.5,
        efficiency: 0.9,
        max_charge_kw: 1.0,
        max_discharge_kw: 1.0,
        min_soc_percent: 0.0,
        max_soc_percent: 100.0,
        ..BatteryConfig::default()
    }
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tolerance {tol})"
    );
}
