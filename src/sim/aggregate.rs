//! Calendar aggregation of per-interval rows into day, ISO-week and month tables.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::financial::safe_ratio;
use super::types::{BatteryStepResult, BoilerStepResult, Timestamped};

/// Calendar bucket used to group rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    /// ISO weeks, Monday to Sunday.
    Weekly,
    Monthly,
}

impl Period {
    /// Start date and label of the bucket containing `timestamp`.
    pub fn bucket(self, timestamp: NaiveDateTime) -> (NaiveDate, String) {
        let date = timestamp.date();
        match self {
            Self::Daily => (date, date.format("%Y-%m-%d").to_string()),
            Self::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                let start = date - chrono::Days::new(offset);
                let week = date.iso_week();
                (start, format!("{}-W{:02}", week.year(), week.week()))
            }
            Self::Monthly => {
                let start = date.with_day(1).unwrap_or(date);
                (start, date.format("%Y-%m").to_string())
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            other => Err(format!(
                "unknown period \"{other}\", expected daily, weekly or monthly"
            )),
        }
    }
}

/// Column sums for one group, accumulated row by row.
pub trait PeriodTotals<R>: Default {
    /// Adds one row's flows to the sums.
    fn add(&mut self, row: &R);

    /// Re-derives ratio columns from the finished sums.
    fn finish(&mut self);
}

/// One aggregated table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary<T> {
    /// `YYYY-MM-DD`, `YYYY-Www` or `YYYY-MM`.
    pub label: String,
    /// First calendar day of the bucket.
    pub start: NaiveDate,
    /// Number of rows in the bucket.
    pub intervals: usize,
    pub totals: T,
}

/// Groups `rows` by `period`, ordered by bucket start.
///
/// Sums are accumulated in row order, so adding up a column over all groups
/// reproduces the column total over all rows.
pub fn aggregate<R, T>(rows: &[R], period: Period) -> Vec<PeriodSummary<T>>
where
    R: Timestamped,
    T: PeriodTotals<R>,
{
    let mut groups: BTreeMap<NaiveDate, PeriodSummary<T>> = BTreeMap::new();
    for row in rows {
        let (start, label) = period.bucket(row.timestamp());
        let group = groups.entry(start).or_insert_with(|| PeriodSummary {
            label,
            start,
            intervals: 0,
            totals: T::default(),
        });
        group.intervals += 1;
        group.totals.add(row);
    }

    groups
        .into_values()
        .map(|mut group| {
            group.totals.finish();
            group
        })
        .collect()
}

/// Battery columns of an aggregated row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BatteryTotals {
    /// Net surplus (kWh, may be negative).
    pub surplus_kwh: f64,
    /// Positive surplus only (kWh).
    pub positive_surplus_kwh: f64,
    pub charged_kwh: f64,
    pub discharged_kwh: f64,
    pub wasted_kwh: f64,
    pub grid_import_without_kwh: f64,
    pub grid_import_with_kwh: f64,
    pub grid_export_without_kwh: f64,
    pub grid_export_with_kwh: f64,
    pub import_savings: f64,
    pub export_loss: f64,
    pub net_savings: f64,
    /// Charged over positive surplus (%).
    pub utilization_percent: f64,
    /// Discharged over charged (%).
    pub round_trip_percent: f64,
}

impl PeriodTotals<BatteryStepResult> for BatteryTotals {
    fn add(&mut self, r: &BatteryStepResult) {
        self.surplus_kwh += r.surplus_kwh;
        self.positive_surplus_kwh += r.surplus_kwh.max(0.0);
        self.charged_kwh += r.charged_kwh;
        self.discharged_kwh += r.discharged_kwh;
        self.wasted_kwh += r.wasted_kwh;
        self.grid_import_without_kwh += r.grid_import_without_kwh;
        self.grid_import_with_kwh += r.grid_import_with_kwh;
        self.grid_export_without_kwh += r.grid_export_without_kwh;
        self.grid_export_with_kwh += r.grid_export_with_kwh;
        self.import_savings += r.import_savings;
        self.export_loss += r.export_loss;
        self.net_savings += r.net_savings;
    }

    fn finish(&mut self) {
        self.utilization_percent = safe_ratio(self.charged_kwh, self.positive_surplus_kwh) * 100.0;
        self.round_trip_percent = safe_ratio(self.discharged_kwh, self.charged_kwh) * 100.0;
    }
}

/// Boiler columns of an aggregated row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoilerTotals {
    pub surplus_kwh: f64,
    pub positive_surplus_kwh: f64,
    pub hot_water_l: f64,
    pub energy_needed_kwh: f64,
    pub energy_used_kwh: f64,
    pub heat_loss_kwh: f64,
    pub gas_needed_m3: f64,
    pub gas_saved_m3: f64,
    pub savings: f64,
    /// Energy used over positive surplus (%).
    pub utilization_percent: f64,
    /// Energy used over energy needed (%).
    pub coverage_percent: f64,
}

impl PeriodTotals<BoilerStepResult> for BoilerTotals {
    fn add(&mut self, r: &BoilerStepResult) {
        self.surplus_kwh += r.surplus_kwh;
        self.positive_surplus_kwh += r.surplus_kwh.max(0.0);
        self.hot_water_l += r.hot_water_demand_l;
        self.energy_needed_kwh += r.energy_needed_kwh;
        self.energy_used_kwh += r.energy_used_kwh;
        self.heat_loss_kwh += r.heat_loss_kwh;
        self.gas_needed_m3 += r.gas_needed_m3;
        self.gas_saved_m3 += r.gas_saved_m3;
        self.savings += r.savings;
    }

    fn finish(&mut self) {
        self.utilization_percent =
            safe_ratio(self.energy_used_kwh, self.positive_surplus_kwh) * 100.0;
        self.coverage_percent = safe_ratio(self.energy_used_kwh, self.energy_needed_kwh) * 100.0;
    }
}

impl fmt::Display for PeriodSummary<BatteryTotals> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.totals;
        write!(
            f,
            "{:<10} | surplus={:>8.2} kWh | in={:>7.2}  out={:>7.2}  wasted={:>7.2} kWh | \
             export={:>7.2}->{:>7.2} kWh | util={:>5.1}% | net={:>7.2} €",
            self.label,
            t.surplus_kwh,
            t.charged_kwh,
            t.discharged_kwh,
            t.wasted_kwh,
            t.grid_export_without_kwh,
            t.grid_export_with_kwh,
            t.utilization_percent,
            t.net_savings,
        )
    }
}

impl fmt::Display for PeriodSummary<BoilerTotals> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.totals;
        write!(
            f,
            "{:<10} | surplus={:>8.2} kWh | need={:>6.2}  used={:>6.2} kWh | \
             util={:>5.1}%  cover={:>5.1}% | saved={:>6.2} €",
            self.label,
            t.surplus_kwh,
            t.energy_needed_kwh,
            t.energy_used_kwh,
            t.utilization_percent,
            t.coverage_percent,
            t.savings,
        )
    }
}
