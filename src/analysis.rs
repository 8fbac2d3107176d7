//! Runs the selected storage strategies and their aggregations in one pass.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::series::{DataSummary, HourlyAverage, InputSeries, SeasonalAverage};
use crate::sim::aggregate::{BatteryTotals, BoilerTotals, Period, PeriodSummary, aggregate};
use crate::sim::battery::{BatteryCalculator, BatteryOutcome};
use crate::sim::boiler::{BoilerCalculator, BoilerOutcome};
use crate::storage::StorageCalculator;

/// Which strategies to evaluate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    Battery,
    Boiler,
    #[default]
    Both,
}

impl Selection {
    pub fn includes_battery(self) -> bool {
        matches!(self, Self::Battery | Self::Both)
    }

    pub fn includes_boiler(self) -> bool {
        matches!(self, Self::Boiler | Self::Both)
    }
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "battery" => Ok(Self::Battery),
            "boiler" => Ok(Self::Boiler),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown storage \"{other}\", expected battery, boiler or both"
            )),
        }
    }
}

/// Battery outcome with its aggregated table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryAnalysis {
    pub outcome: BatteryOutcome,
    pub periods: Vec<PeriodSummary<BatteryTotals>>,
}

/// Boiler outcome with its aggregated table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoilerAnalysis {
    pub outcome: BoilerOutcome,
    pub periods: Vec<PeriodSummary<BoilerTotals>>,
}

/// Everything produced by [`run_analysis`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub period: Period,
    pub intervals: usize,
    pub data: DataSummary,
    pub hourly: Vec<HourlyAverage>,
    pub seasonal: Vec<SeasonalAverage>,
    pub battery: Option<BatteryAnalysis>,
    pub boiler: Option<BoilerAnalysis>,
}

/// Runs the selected calculators over `series` and groups their rows by `period`.
///
/// An empty series yields outcomes with no rows and default summaries.
///
/// # Panics
///
/// Panics on a configuration that [`StorageConfig::validate`] rejects.
pub fn run_analysis(
    config: &StorageConfig,
    series: &InputSeries,
    period: Period,
    selection: Selection,
) -> AnalysisReport {
    if series.is_empty() {
        warn!("input series is empty");
    } else {
        info!(
            intervals = series.len(),
            interval_hours = series.detect_interval_hours(),
            days = series.days_spanned(),
            "running analysis"
        );
    }

    let battery = selection.includes_battery().then(|| {
        let outcome = BatteryCalculator::new(&config.battery, &config.economic).calculate(series);
        let periods = aggregate(&outcome.rows, period);
        BatteryAnalysis { outcome, periods }
    });

    let boiler = selection.includes_boiler().then(|| {
        let outcome = BoilerCalculator::new(&config.boiler, &config.economic).calculate(series);
        let periods = aggregate(&outcome.rows, period);
        BoilerAnalysis { outcome, periods }
    });

    AnalysisReport {
        period,
        intervals: series.len(),
        data: series.summary(),
        hourly: series.hourly_averages(),
        seasonal: series.seasonal_averages(),
        battery,
        boiler,
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} intervals", self.intervals)?;
        writeln!(f, "{}", self.data)?;
        if !self.hourly.is_empty() {
            writeln!(f, "--- Average by hour of day (kWh per interval) ---")?;
            for h in &self.hourly {
                writeln!(
                    f,
                    "{:02}:00 | produced={:>6.3}  consumed={:>6.3}  surplus={:>7.3}",
                    h.hour, h.produced_kwh, h.consumed_kwh, h.surplus_kwh
                )?;
            }
        }
        if !self.seasonal.is_empty() {
            writeln!(f, "--- Average by season ---")?;
            for season in &self.seasonal {
                writeln!(f, "{season}")?;
            }
        }
        if let Some(battery) = &self.battery {
            writeln!(f)?;
            writeln!(f, "{}", battery.outcome.summary)?;
            writeln!(f, "--- Battery by {} period ---", self.period)?;
            for group in &battery.periods {
                writeln!(f, "{group}")?;
            }
        }
        if let Some(boiler) = &self.boiler {
            writeln!(f)?;
            writeln!(f, "{}", boiler.outcome.summary)?;
            writeln!(f, "--- Boiler by {} period ---", self.period)?;
            for group in &boiler.periods {
                writeln!(f, "{group}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{DemoProfile, generate};
    use chrono::NaiveDate;

    fn demo(days: u32) -> InputSeries {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        generate(start, days, &DemoProfile::default(), 42)
    }

    #[test]
    fn selection_parses() {
        assert_eq!("battery".parse::<Selection>(), Ok(Selection::Battery));
        assert_eq!("BOTH".parse::<Selection>(), Ok(Selection::Both));
        assert!("heat-pump".parse::<Selection>().is_err());
        assert!(Selection::Both.includes_battery() && Selection::Both.includes_boiler());
        assert!(!Selection::Boiler.includes_battery());
    }

    #[test]
    fn both_strategies_run() {
        let report = run_analysis(
            &StorageConfig::default(),
            &demo(3),
            Period::Daily,
            Selection::Both,
        );
        let battery = report.battery.as_ref().unwrap();
        let boiler = report.boiler.as_ref().unwrap();
        assert_eq!(battery.outcome.rows.len(), 288);
        assert_eq!(boiler.outcome.rows.len(), 288);
        assert_eq!(battery.periods.len(), 3);
        assert_eq!(boiler.periods.len(), 3);
    }

    #[test]
    fn selection_skips_other_strategy() {
        let report = run_analysis(
            &StorageConfig::default(),
            &demo(1),
            Period::Daily,
            Selection::Boiler,
        );
        assert!(report.battery.is_none());
        assert!(report.boiler.is_some());
    }

    #[test]
    fn empty_series_gives_empty_outcomes() {
        let report = run_analysis(
            &StorageConfig::default(),
            &InputSeries::default(),
            Period::Weekly,
            Selection::Both,
        );
        let battery = report.battery.as_ref().unwrap();
        assert!(battery.outcome.rows.is_empty());
        assert!(battery.periods.is_empty());
        assert_eq!(report.intervals, 0);
        assert_eq!(report.data, DataSummary::default());
        assert!(report.hourly.is_empty() && report.seasonal.is_empty());
    }

    #[test]
    fn report_carries_input_statistics() {
        let series = demo(4);
        let report = run_analysis(
            &StorageConfig::default(),
            &series,
            Period::Daily,
            Selection::Battery,
        );
        assert_eq!(report.data.days_covered, 4);
        assert_eq!(report.data.interval_minutes, 15.0);
        assert_eq!(report.hourly.len(), 24);
        assert_eq!(report.hourly.iter().map(|h| h.samples).sum::<usize>(), series.len());
        assert_eq!(report.seasonal.len(), 1);
        assert_eq!(report.seasonal[0].days, 4);
        assert!((report.data.total_produced_kwh - series.total_produced_kwh()).abs() < 1e-9);
    }

    #[test]
    fn report_renders_sections() {
        let report = run_analysis(
            &StorageConfig::default(),
            &demo(2),
            Period::Daily,
            Selection::Both,
        );
        let text = report.to_string();
        assert!(text.contains("--- Input Data ---"));
        assert!(text.contains("--- Average by hour of day (kWh per interval) ---"));
        assert!(text.contains("summer"));
        assert!(text.contains("--- Battery Report ---"));
        assert!(text.contains("--- Boiler by daily period ---"));
        assert!(text.contains("2024-06-02"));
    }
}
