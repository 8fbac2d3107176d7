//! Integration tests for the battery strategy.

mod common;

use common::{assert_close, demo_series, hourly_surplus, small_battery};
use solar_surplus_sim::config::{BatteryConfig, EconomicConfig};
use solar_surplus_sim::sim::battery::BatteryCalculator;
use solar_surplus_sim::storage::StorageCalculator;

#[test]
fn small_battery_three_hour_run() {
    let mut calc = BatteryCalculator::new(&small_battery(), &EconomicConfig::default());
    let out = calc.calculate(&hourly_surplus(&[1500.0, 2500.0, -500.0]));
    let s = &out.summary;

    assert_eq!(out.rows.len(), 3);
    assert_close(s.total_charged_kwh, 1.6, 1e-9);
    assert_close(s.total_discharged_kwh, 0.5, 1e-9);
    assert_close(s.total_wasted_kwh, 2.4, 1e-9);
    assert_close(s.final_charge_kwh, 0.94, 1e-9);
    assert_close(s.final_soc_percent, 0.94 / 1.5 * 100.0, 1e-9);
    assert_close(s.financials.import_savings, 0.11, 1e-9);
    assert_close(s.financials.export_loss, 0.144, 1e-9);
    assert_close(s.financials.net_savings, -0.034, 1e-9);
    // losing money never pays back
    assert_eq!(s.roi.payback_years, f64::INFINITY);
}

#[test]
fn capacity_limited_three_hour_run() {
    // a 1.4 kWh ceiling leaves 0.5 kWh of headroom for the second hour
    let cfg = BatteryConfig {
        max_soc_percent: 1.4 / 1.5 * 100.0,
        ..small_battery()
    };
    let mut calc = BatteryCalculator::new(&cfg, &EconomicConfig::default());
    let out = calc.calculate(&hourly_surplus(&[1500.0, 2500.0, -500.0]));
    let s = &out.summary;

    assert_close(calc.reservoir().max_bound_kwh(), 1.4, 1e-9);
    assert_close(out.rows[0].charged_kwh, 1.0, 1e-9);
    assert_close(out.rows[1].charged_kwh, 0.5, 1e-9);
    assert_close(s.total_charged_kwh, 1.5, 1e-9);
    assert_close(s.total_discharged_kwh, 0.5, 1e-9);
    assert_close(s.total_wasted_kwh, 2.5, 1e-9);
    assert_close(s.final_charge_kwh, 0.9 * 1.0 + 0.9 * 0.5 - 0.5, 1e-9);
    assert_close(s.final_charge_kwh, 0.85, 1e-9);
    assert_close(s.financials.import_savings, 0.11, 1e-9);
    assert_close(s.financials.export_loss, 0.135, 1e-9);
    assert_close(s.financials.net_savings, -0.025, 1e-9);
}

#[test]
fn charged_plus_wasted_equals_positive_surplus() {
    let mut calc = BatteryCalculator::new(&BatteryConfig::default(), &EconomicConfig::default());
    let out = calc.calculate(&demo_series(5, 11));
    for r in &out.rows {
        if r.surplus_kwh > 0.0 {
            assert_close(r.charged_kwh + r.wasted_kwh, r.surplus_kwh, 1e-9);
            assert_eq!(r.discharged_kwh, 0.0);
        } else {
            assert_eq!(r.charged_kwh, 0.0);
            assert_eq!(r.wasted_kwh, 0.0);
            assert!(r.discharged_kwh <= -r.surplus_kwh + 1e-12);
        }
    }
}

#[test]
fn discharge_bounded_by_energy_above_floor() {
    let cfg = BatteryConfig::default();
    let mut calc = BatteryCalculator::new(&cfg, &EconomicConfig::default());
    let out = calc.calculate(&demo_series(5, 3));
    let floor = cfg.capacity_kwh * cfg.min_soc_percent / 100.0;
    let ceiling = cfg.capacity_kwh * cfg.max_soc_percent / 100.0;

    let mut previous = floor;
    for r in &out.rows {
        assert!(r.discharged_kwh <= previous - floor + 1e-9);
        assert!(r.charge_kwh >= floor - 1e-12 && r.charge_kwh <= ceiling + 1e-12);
        previous = r.charge_kwh;
    }
}

#[test]
fn rerun_gives_identical_results() {
    let series = demo_series(3, 5);
    let mut calc = BatteryCalculator::new(&BatteryConfig::default(), &EconomicConfig::default());
    let first = calc.calculate(&series);
    let second = calc.calculate(&series);
    assert_eq!(first, second);
    assert_eq!(calc.reservoir().totals().total_charged_kwh, first.summary.total_charged_kwh);
}

#[test]
fn zero_capacity_battery_changes_nothing() {
    let cfg = BatteryConfig {
        capacity_kwh: 0.0,
        ..BatteryConfig::default()
    };
    let mut calc = BatteryCalculator::new(&cfg, &EconomicConfig::default());
    let out = calc.calculate(&demo_series(2, 9));
    let s = &out.summary;

    assert_eq!(s.total_charged_kwh, 0.0);
    assert_eq!(s.total_discharged_kwh, 0.0);
    assert_close(s.total_wasted_kwh, s.total_surplus_kwh, 1e-9);
    assert_eq!(s.final_soc_percent, 0.0);
    assert_eq!(s.utilization_percent, 0.0);
    assert_eq!(s.financials.net_savings, 0.0);
    assert_eq!(s.degradation.daily_cycles, 0.0);
    assert_eq!(s.roi.payback_years, f64::INFINITY);
    for r in &out.rows {
        assert_eq!(r.grid_import_with_kwh, r.grid_import_without_kwh);
    }
}

#[test]
fn a_week_of_sunshine_reduces_import() {
    let mut calc = BatteryCalculator::new(&BatteryConfig::default(), &EconomicConfig::default());
    let out = calc.calculate(&demo_series(7, 42));
    let s = &out.summary;

    assert_eq!(s.days, 7);
    assert_eq!(s.interval_hours, 0.25);
    assert!(s.total_discharged_kwh > 0.0);
    assert!(s.financials.grid_import_with_kwh < s.financials.grid_import_without_kwh);
    assert!(s.financials.grid_import_reduction_percent > 0.0);
    assert!(s.utilization_percent > 0.0 && s.utilization_percent <= 100.0);
    assert_close(s.roi.annual_savings, s.financials.net_savings * 365.0 / 7.0, 1e-9);
    assert!(s.degradation.effective_lifetime_years <= 10.0);
}
