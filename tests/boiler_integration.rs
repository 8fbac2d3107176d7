//! Integration tests for the boiler strategy.

mod common;

use common::{assert_close, demo_series, hourly_surplus};
use solar_surplus_sim::config::{BoilerConfig, EconomicConfig, StorageConfig};
use solar_surplus_sim::sim::boiler::BoilerCalculator;
use solar_surplus_sim::storage::thermal::interval_heat_loss_kwh;
use solar_surplus_sim::storage::{HourlyProfile, SPECIFIC_HEAT_KWH_PER_L_K, StorageCalculator};

#[test]
fn standby_loss_is_the_only_change_without_draw_off_or_surplus() {
    let boiler = BoilerConfig {
        usage_profile: HourlyProfile::none(),
        ..BoilerConfig::default()
    };
    let mut calc = BoilerCalculator::new(&boiler, &EconomicConfig::default());
    let out = calc.calculate(&hourly_surplus(&[0.0; 6]));

    let mut temp = boiler.cold_inlet_c + boiler.temperature_rise_c;
    for r in &out.rows {
        let loss = interval_heat_loss_kwh(
            boiler.volume_l,
            temp,
            boiler.cold_inlet_c,
            boiler.standby_loss_percent_per_day,
            1.0,
        );
        temp -= loss / (boiler.volume_l * SPECIFIC_HEAT_KWH_PER_L_K);
        assert_close(r.heat_loss_kwh, loss, 1e-12);
        assert_close(r.water_temp_c, temp, 1e-9);
        assert_eq!(r.energy_used_kwh, 0.0);
    }
}

#[test]
fn temperature_stays_within_bounds_under_heavy_use() {
    let boiler = BoilerConfig {
        volume_l: 30.0,
        daily_usage_l: 2000.0,
        standby_loss_percent_per_day: 50.0,
        ..BoilerConfig::default()
    };
    let mut calc = BoilerCalculator::new(&boiler, &EconomicConfig::default());
    let out = calc.calculate(&demo_series(3, 21));
    let max = boiler.cold_inlet_c + boiler.temperature_rise_c;
    for r in &out.rows {
        assert!(r.water_temp_c >= boiler.cold_inlet_c);
        assert!(r.water_temp_c <= max);
    }
}

#[test]
fn energy_used_never_exceeds_positive_surplus() {
    let mut calc = BoilerCalculator::new(&BoilerConfig::default(), &EconomicConfig::default());
    let out = calc.calculate(&demo_series(4, 8));
    for r in &out.rows {
        assert!(r.energy_used_kwh <= r.surplus_kwh.max(0.0) + 1e-12);
    }
    let s = &out.summary;
    assert!(s.utilization_percent <= 100.0 + 1e-9);
    assert!(s.coverage_percent > 0.0);
}

#[test]
fn gas_savings_follow_prices() {
    let cheap = StorageConfig::default();
    let mut dear = StorageConfig::default();
    dear.economic.gas_price_per_m3 = 1.60;

    let series = demo_series(3, 4);
    let a = BoilerCalculator::new(&cheap.boiler, &cheap.economic).calculate(&series);
    let b = BoilerCalculator::new(&dear.boiler, &dear.economic).calculate(&series);

    assert_eq!(a.summary.financials.gas_saved_m3, b.summary.financials.gas_saved_m3);
    assert_close(b.summary.financials.savings, a.summary.financials.savings * 2.0, 1e-9);
    assert_close(
        a.summary.financials.gas_saved_m3,
        a.summary.total_energy_used_kwh / 9.77,
        1e-9,
    );
}

#[test]
fn larger_tank_captures_more_surplus() {
    let series = demo_series(5, 42);
    let small = StorageConfig::small_home();
    let large = StorageConfig::large_home();
    let a = BoilerCalculator::new(&small.boiler, &small.economic).calculate(&series);
    let b = BoilerCalculator::new(&large.boiler, &large.economic).calculate(&series);
    assert!(b.summary.total_energy_used_kwh > a.summary.total_energy_used_kwh);
}
