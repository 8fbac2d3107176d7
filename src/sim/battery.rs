//! Battery strategy: greedy reservoir run over a whole series.

use std::fmt;

use chrono::{Datelike, Timelike};
use serde::Serialize;
use tracing::{debug, warn};

use super::financial::{BatteryFinancials, Degradation, RoiMetrics, safe_ratio};
use super::types::BatteryStepResult;
use crate::config::{BatteryConfig, EconomicConfig};
use crate::series::InputSeries;
use crate::storage::{Reservoir, StorageCalculator};

/// Rows and summary of one battery run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatteryOutcome {
    pub rows: Vec<BatteryStepResult>,
    pub summary: BatterySummary,
}

/// Whole-run totals and derived metrics for the battery.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatterySummary {
    /// Detected sampling interval (hours).
    pub interval_hours: f64,
    /// Days covered by the series.
    pub days: u32,
    /// Sum of positive surplus (kWh).
    pub total_surplus_kwh: f64,
    /// Sum of deficits as a positive number (kWh).
    pub total_deficit_kwh: f64,
    pub total_charged_kwh: f64,
    pub total_discharged_kwh: f64,
    pub total_wasted_kwh: f64,
    pub final_charge_kwh: f64,
    pub final_soc_percent: f64,
    /// Share of positive surplus drawn into the battery (%).
    pub utilization_percent: f64,
    pub financials: BatteryFinancials,
    pub roi: RoiMetrics,
    pub degradation: Degradation,
}

/// Runs a [`Reservoir`] across an input series and values the result.
#[derive(Debug, Clone)]
pub struct BatteryCalculator {
    battery: BatteryConfig,
    economic: EconomicConfig,
    reservoir: Reservoir,
}

impl BatteryCalculator {
    /// # Panics
    ///
    /// Panics on battery parameters that `StorageConfig::validate` rejects.
    pub fn new(battery: &BatteryConfig, economic: &EconomicConfig) -> Self {
        Self {
            battery: battery.clone(),
            economic: economic.clone(),
            reservoir: battery.reservoir(),
        }
    }

    /// Reservoir state after the last run.
    pub fn reservoir(&self) -> &Reservoir {
        &self.reservoir
    }
}

impl StorageCalculator for BatteryCalculator {
    type Outcome = BatteryOutcome;

    fn calculate(&mut self, series: &InputSeries) -> BatteryOutcome {
        self.reservoir.reset();
        if series.is_empty() {
            warn!("empty series, skipping battery simulation");
            return BatteryOutcome::default();
        }

        let dt = series.detect_interval_hours();
        let days = series.days_spanned();
        let price = self.economic.electricity_price_per_kwh;
        let feed_in = self.economic.feed_in_tariff_per_kwh;

        let mut rows = Vec::with_capacity(series.len());
        let mut total_surplus = 0.0;
        let mut total_deficit = 0.0;
        let mut import_without = 0.0;
        let mut import_with = 0.0;

        for (interval, surplus_wh) in series.intervals().iter().zip(self.surplus(series)) {
            let surplus_kwh = surplus_wh / 1000.0;
            let step = self.reservoir.step(surplus_wh, dt);

            let grid_import_without = (-surplus_kwh).max(0.0);
            let grid_export_without = surplus_kwh.max(0.0);
            total_surplus += grid_export_without;
            total_deficit += grid_import_without;
            import_without += grid_import_without;
            import_with += step.grid_import_kwh;

            let import_savings = step.discharged_kwh * price;
            let export_loss = step.charged_kwh * feed_in;

            rows.push(BatteryStepResult {
                timestamp: interval.timestamp,
                hour: interval.timestamp.hour(),
                weekday: interval.timestamp.weekday(),
                surplus_wh,
                surplus_kwh,
                charge_kwh: step.charge_kwh,
                soc_percent: self.reservoir.soc_percent(),
                charged_kwh: step.charged_kwh,
                discharged_kwh: step.discharged_kwh,
                wasted_kwh: step.wasted_kwh,
                grid_import_without_kwh: grid_import_without,
                grid_export_without_kwh: grid_export_without,
                grid_import_with_kwh: step.grid_import_kwh,
                grid_export_with_kwh: step.wasted_kwh,
                import_savings,
                export_loss,
                net_savings: import_savings - export_loss,
            });
        }

        let totals = self.reservoir.totals();
        let financials = BatteryFinancials::new(
            totals.total_charged_kwh,
            totals.total_discharged_kwh,
            import_without,
            import_with,
            &self.economic,
        );
        let degradation = Degradation::estimate(
            totals.total_discharged_kwh,
            self.battery.capacity_kwh,
            days,
            self.battery.expected_cycles,
            self.battery.lifetime_years,
        );
        let roi = RoiMetrics::project(
            financials.net_savings,
            days,
            self.battery.installation_cost,
            degradation.effective_lifetime_years,
        );

        debug!(
            intervals = rows.len(),
            dt_hours = dt,
            charged_kwh = totals.total_charged_kwh,
            discharged_kwh = totals.total_discharged_kwh,
            "battery simulation complete"
        );

        BatteryOutcome {
            rows,
            summary: BatterySummary {
                interval_hours: dt,
                days,
                total_surplus_kwh: total_surplus,
                total_deficit_kwh: total_deficit,
                total_charged_kwh: totals.total_charged_kwh,
                total_discharged_kwh: totals.total_discharged_kwh,
                total_wasted_kwh: totals.total_wasted_kwh,
                final_charge_kwh: totals.final_charge_kwh,
                final_soc_percent: totals.final_soc_percent,
                utilization_percent: safe_ratio(totals.total_charged_kwh, total_surplus) * 100.0,
                financials,
                roi,
                degradation,
            },
        }
    }
}

impl fmt::Display for BatterySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Battery Report ---")?;
        writeln!(
            f,
            "Period:                {} days at {:.2} h intervals",
            self.days, self.interval_hours
        )?;
        writeln!(f, "Surplus available:     {:.2} kWh", self.total_surplus_kwh)?;
        writeln!(f, "Deficit:               {:.2} kWh", self.total_deficit_kwh)?;
        writeln!(
            f,
            "Charged / discharged:  {:.2} / {:.2} kWh",
            self.total_charged_kwh, self.total_discharged_kwh
        )?;
        writeln!(f, "Wasted surplus:        {:.2} kWh", self.total_wasted_kwh)?;
        writeln!(
            f,
            "Final charge:          {:.2} kWh ({:.1}%)",
            self.final_charge_kwh, self.final_soc_percent
        )?;
        writeln!(f, "Storage utilization:   {:.1}%", self.utilization_percent)?;
        writeln!(
            f,
            "Grid import:           {:.2} -> {:.2} kWh (-{:.1}%)",
            self.financials.grid_import_without_kwh,
            self.financials.grid_import_with_kwh,
            self.financials.grid_import_reduction_percent
        )?;
        writeln!(f, "Import savings:        {:.2} €", self.financials.import_savings)?;
        writeln!(f, "Export loss:           {:.2} €", self.financials.export_loss)?;
        writeln!(f, "Net savings:           {:.2} €", self.financials.net_savings)?;
        writeln!(f, "{}", self.roi)?;
        write!(f, "{}", self.degradation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Interval;
    use chrono::{NaiveDate, TimeDelta};

    fn hourly(surplus_wh: &[f64]) -> InputSeries {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap();
        let intervals = surplus_wh
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let (p, c) = if s >= 0.0 { (s, 0.0) } else { (0.0, -s) };
                Interval::new(start + TimeDelta::hours(i as i64), p, c)
            })
            .collect();
        InputSeries::new(intervals).unwrap()
    }

    fn small_battery() -> BatteryConfig {
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

    #[test]
    fn rate_and_capacity_limited_run() {
        let mut calc = BatteryCalculator::new(&small_battery(), &EconomicConfig::default());
        let out = calc.calculate(&hourly(&[1500.0, 2500.0, -500.0]));
        let s = &out.summary;

        // 1.0 drawn (rate), then 0.6 drawn (headroom 1.5 - 0.9), then 0.5 delivered
        assert!((out.rows[0].charged_kwh - 1.0).abs() < 1e-9);
        assert!((out.rows[0].wasted_kwh - 0.5).abs() < 1e-9);
        assert!((out.rows[1].charged_kwh - 0.6).abs() < 1e-9);
        assert!((out.rows[1].wasted_kwh - 1.9).abs() < 1e-9);
        assert!((s.total_charged_kwh - 1.6).abs() < 1e-9);
        assert!((s.total_discharged_kwh - 0.5).abs() < 1e-9);
        assert!((s.total_wasted_kwh - 2.4).abs() < 1e-9);
        assert!((s.final_charge_kwh - 0.94).abs() < 1e-9);
        assert!((s.total_surplus_kwh - 4.0).abs() < 1e-9);
        assert!((s.utilization_percent - 40.0).abs() < 1e-9);
    }

    #[test]
    fn export_loss_uses_pre_efficiency_charge() {
        let mut calc = BatteryCalculator::new(&small_battery(), &EconomicConfig::default());
        let out = calc.calculate(&hourly(&[1500.0, 2500.0, -500.0]));
        let fin = &out.summary.financials;
        assert!((fin.import_savings - 0.5 * 0.22).abs() < 1e-9);
        assert!((fin.export_loss - 1.6 * 0.09).abs() < 1e-9);
        assert!((fin.net_savings - (0.11 - 0.144)).abs() < 1e-9);
        let row_net: f64 = out.rows.iter().map(|r| r.net_savings).sum();
        assert!((row_net - fin.net_savings).abs() < 1e-9);
    }

    #[test]
    fn grid_columns_balance() {
        let mut calc = BatteryCalculator::new(&small_battery(), &EconomicConfig::default());
        let out = calc.calculate(&hourly(&[1500.0, -800.0, -2000.0]));
        for r in &out.rows {
            assert!(
                (r.grid_import_without_kwh - r.grid_import_with_kwh - r.discharged_kwh).abs()
                    < 1e-9
            );
            assert!(
                (r.grid_export_without_kwh - r.grid_export_with_kwh - r.charged_kwh).abs() < 1e-9
            );
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let series = hourly(&[1500.0, 2500.0, -500.0, -2000.0, 300.0]);
        let mut calc =
            BatteryCalculator::new(&BatteryConfig::default(), &EconomicConfig::default());
        let first = calc.calculate(&series);
        let second = calc.calculate(&series);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_series_is_neutral() {
        let mut calc =
            BatteryCalculator::new(&BatteryConfig::default(), &EconomicConfig::default());
        let out = calc.calculate(&InputSeries::default());
        assert!(out.rows.is_empty());
        assert_eq!(out.summary, BatterySummary::default());
    }

    #[test]
    fn report_has_header() {
        let mut calc = BatteryCalculator::new(&small_battery(), &EconomicConfig::default());
        let out = calc.calculate(&hourly(&[1500.0, -500.0]));
        let report = out.summary.to_string();
        assert!(report.starts_with("--- Battery Report ---"));
        assert!(report.contains("Net savings:"));
    }
}
