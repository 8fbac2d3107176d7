//! Property tests for storage invariants over arbitrary inputs.

use chrono::{NaiveDate, TimeDelta};
use proptest::prelude::*;
use solar_surplus_sim::config::{BatteryConfig, EconomicConfig};
use solar_surplus_sim::series::{InputSeries, Interval};
use solar_surplus_sim::sim::aggregate::{BatteryTotals, Period, PeriodSummary, aggregate};
use solar_surplus_sim::sim::battery::BatteryCalculator;
use solar_surplus_sim::storage::{HourlyProfile, Reservoir, StorageCalculator, ThermalStore};

fn series_from(surplus_wh: &[f64], step_minutes: i64) -> InputSeries {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let intervals = surplus_wh
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let (p, c) = if s >= 0.0 { (s, 0.0) } else { (0.0, -s) };
            Interval::new(start + TimeDelta::minutes(step_minutes * i as i64), p, c)
        })
        .collect();
    InputSeries::new(intervals).unwrap()
}

proptest! {
    #[test]
    fn reservoir_stays_within_bounds(
        capacity in 0.0f64..30.0,
        efficiency in 0.05f64..=1.0,
        charge_kw in 0.0f64..10.0,
        discharge_kw in 0.0f64..10.0,
        min_pct in 0.0f64..100.0,
        max_pct in 0.0f64..100.0,
        steps in prop::collection::vec((-8000.0f64..8000.0, 0.01f64..2.0), 1..200),
    ) {
        let mut r = Reservoir::new(capacity, efficiency, charge_kw, discharge_kw, min_pct, max_pct);
        prop_assert!(r.min_bound_kwh() <= r.max_bound_kwh());
        prop_assert!(r.max_bound_kwh() <= capacity + 1e-12);

        for (surplus_wh, dt) in steps {
            let before = r.charge_kwh();
            let step = r.step(surplus_wh, dt);
            prop_assert!(step.charge_kwh >= r.min_bound_kwh());
            prop_assert!(step.charge_kwh <= r.max_bound_kwh());
            prop_assert!(step.charged_kwh >= 0.0 && step.wasted_kwh >= 0.0);
            prop_assert!(step.discharged_kwh <= (before - r.min_bound_kwh()).max(0.0) + 1e-9);
            if surplus_wh > 0.0 {
                let accounted = step.charged_kwh + step.wasted_kwh;
                prop_assert!((accounted - surplus_wh / 1000.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn reset_makes_runs_repeatable(
        surplus in prop::collection::vec(-5000.0f64..5000.0, 1..96),
    ) {
        let series = series_from(&surplus, 15);
        let mut calc =
            BatteryCalculator::new(&BatteryConfig::default(), &EconomicConfig::default());
        let first = calc.calculate(&series);
        let second = calc.calculate(&series);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn thermal_temperature_never_leaves_range(
        volume in 0.0f64..300.0,
        usage in 0.0f64..5000.0,
        rise in 1.0f64..70.0,
        loss_pct in 0.0f64..100.0,
        steps in prop::collection::vec((0u32..24, -10.0f64..10.0), 1..200),
    ) {
        let profile = HourlyProfile::default();
        let mut tank = ThermalStore::new(volume, 0.9, usage, rise, 10.0, loss_pct, profile);
        for (hour, surplus_kwh) in steps {
            let step = tank.step(hour, 1.0, surplus_kwh);
            prop_assert!(step.water_temp_c >= 10.0);
            prop_assert!(step.water_temp_c <= 10.0 + rise + 1e-9);
            prop_assert!(step.energy_used_kwh <= surplus_kwh.max(0.0) + 1e-12);
            prop_assert!(step.heat_loss_kwh >= 0.0);
        }
    }

    #[test]
    fn aggregation_preserves_totals(
        surplus in prop::collection::vec(-3000.0f64..6000.0, 1..400),
        period_idx in 0usize..3,
    ) {
        let period = [Period::Daily, Period::Weekly, Period::Monthly][period_idx];
        let series = series_from(&surplus, 60);
        let out = BatteryCalculator::new(&BatteryConfig::default(), &EconomicConfig::default())
            .calculate(&series);
        let groups: Vec<PeriodSummary<BatteryTotals>> = aggregate(&out.rows, period);

        prop_assert_eq!(groups.iter().map(|g| g.intervals).sum::<usize>(), out.rows.len());
        prop_assert!(groups.windows(2).all(|w| w[0].start < w[1].start));

        let grouped: f64 = groups.iter().map(|g| g.totals.charged_kwh).sum();
        prop_assert!((grouped - out.summary.total_charged_kwh).abs() < 1e-6);
        for g in &groups {
            prop_assert!(g.totals.utilization_percent.is_finite());
            prop_assert!(g.totals.utilization_percent <= 100.0 + 1e-9);
        }
    }
}
