//! Input time series and surplus extraction.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Sampling interval assumed when it cannot be detected from the timestamps (15 minutes).
pub const DEFAULT_INTERVAL_HOURS: f64 = 0.25;

/// Input-shape errors raised while building an [`InputSeries`].
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("timestamp {current} at row {index} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
    #[error("negative {column} ({value} Wh) at row {index}")]
    NegativeEnergy {
        index: usize,
        column: &'static str,
        value: f64,
    },
}

/// One metered interval: energy produced and consumed, both in Wh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub timestamp: NaiveDateTime,
    pub produced_wh: f64,
    pub consumed_wh: f64,
}

impl Interval {
    pub fn new(timestamp: NaiveDateTime, produced_wh: f64, consumed_wh: f64) -> Self {
        Self {
            timestamp,
            produced_wh,
            consumed_wh,
        }
    }

    /// Production minus consumption for this interval (Wh, negative on deficit).
    pub fn surplus_wh(&self) -> f64 {
        self.produced_wh - self.consumed_wh
    }
}

/// Descriptive statistics of a loaded series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DataSummary {
    pub total_produced_kwh: f64,
    pub total_consumed_kwh: f64,
    /// Production minus consumption over the whole series (kWh).
    pub net_surplus_kwh: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub days_covered: u32,
    pub daily_avg_production_kwh: f64,
    pub daily_avg_consumption_kwh: f64,
    pub interval_minutes: f64,
}

impl fmt::Display for DataSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Input Data ---")?;
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => writeln!(
                f,
                "Date range:            {first} to {last} ({} days)",
                self.days_covered
            )?,
            _ => writeln!(f, "Date range:            none")?,
        }
        writeln!(f, "Interval:              {:.0} min", self.interval_minutes)?;
        writeln!(
            f,
            "Produced / consumed:   {:.2} / {:.2} kWh",
            self.total_produced_kwh, self.total_consumed_kwh
        )?;
        writeln!(f, "Net surplus:           {:.2} kWh", self.net_surplus_kwh)?;
        write!(
            f,
            "Daily average:         {:.2} produced / {:.2} consumed kWh",
            self.daily_avg_production_kwh, self.daily_avg_consumption_kwh
        )
    }
}

/// Mean energy per interval for intervals starting in one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyAverage {
    pub hour: u32,
    pub samples: usize,
    pub produced_kwh: f64,
    pub consumed_kwh: f64,
    pub surplus_kwh: f64,
}

/// Meteorological season, ordered from winter to fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Season of a calendar month (1-12); December through February is winter.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
        };
        f.write_str(name)
    }
}

/// Mean daily energy over the calendar days that fall in one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonalAverage {
    pub season: Season,
    pub days: usize,
    pub produced_kwh_per_day: f64,
    pub consumed_kwh_per_day: f64,
    pub surplus_kwh_per_day: f64,
}

impl fmt::Display for SeasonalAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6} | days={:>3} | produced={:>7.2}  consumed={:>7.2}  surplus={:>7.2} kWh/day",
            self.season,
            self.days,
            self.produced_kwh_per_day,
            self.consumed_kwh_per_day,
            self.surplus_kwh_per_day,
        )
    }
}

/// Ordered production/consumption series handed to the simulators.
///
/// Built once by the ingestion layer and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSeries {
    intervals: Vec<Interval>,
}

impl InputSeries {
    /// Builds a series, checking that timestamps strictly increase and
    /// energies are non-negative.
    ///
    /// # Errors
    ///
    /// Returns a [`SeriesError`] for the first offending row.
    pub fn new(intervals: Vec<Interval>) -> Result<Self, SeriesError> {
        for (index, interval) in intervals.iter().enumerate() {
            if interval.produced_wh < 0.0 {
                return Err(SeriesError::NegativeEnergy {
                    index,
                    column: "produced",
                    value: interval.produced_wh,
                });
            }
            if interval.consumed_wh < 0.0 {
                return Err(SeriesError::NegativeEnergy {
                    index,
                    column: "consumed",
                    value: interval.consumed_wh,
                });
            }
            if index > 0 {
                let previous = intervals[index - 1].timestamp;
                if interval.timestamp <= previous {
                    return Err(SeriesError::NotIncreasing {
                        index,
                        previous,
                        current: interval.timestamp,
                    });
                }
            }
        }
        Ok(Self { intervals })
    }

    /// Wraps intervals without validation, for callers that already checked them.
    pub fn from_unchecked(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Surplus (production minus consumption) per interval, in Wh.
    pub fn surplus_wh(&self) -> Vec<f64> {
        self.intervals.iter().map(Interval::surplus_wh).collect()
    }

    /// Detects the sampling interval as the most frequent timestamp delta, in hours.
    ///
    /// Ties resolve to the shortest delta. Falls back to
    /// [`DEFAULT_INTERVAL_HOURS`] with fewer than two samples or when no
    /// positive delta exists.
    pub fn detect_interval_hours(&self) -> f64 {
        if self.intervals.len() < 2 {
            debug!(
                samples = self.intervals.len(),
                "too few samples to detect interval, using default"
            );
            return DEFAULT_INTERVAL_HOURS;
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for pair in self.intervals.windows(2) {
            let delta = (pair[1].timestamp - pair[0].timestamp).num_seconds();
            *counts.entry(delta).or_insert(0) += 1;
        }

        let mode = counts
            .into_iter()
            .max_by(|(delta_a, count_a), (delta_b, count_b)| {
                count_a.cmp(count_b).then(delta_b.cmp(delta_a))
            })
            .map(|(delta, _)| delta);

        match mode {
            Some(seconds) if seconds > 0 => seconds as f64 / 3600.0,
            _ => {
                warn!("could not detect a positive sampling interval, using default");
                DEFAULT_INTERVAL_HOURS
            }
        }
    }

    /// Whole days between the first and last timestamp, plus one.
    ///
    /// Returns 0 for an empty series.
    pub fn days_spanned(&self) -> u32 {
        match (self.intervals.first(), self.intervals.last()) {
            (Some(first), Some(last)) => {
                let span: TimeDelta = last.timestamp - first.timestamp;
                u32::try_from(span.num_days().max(0)).unwrap_or(u32::MAX).saturating_add(1)
            }
            _ => 0,
        }
    }

    /// Total energy produced over the series (kWh).
    pub fn total_produced_kwh(&self) -> f64 {
        self.intervals.iter().map(|i| i.produced_wh).sum::<f64>() / 1000.0
    }

    /// Total energy consumed over the series (kWh).
    pub fn total_consumed_kwh(&self) -> f64 {
        self.intervals.iter().map(|i| i.consumed_wh).sum::<f64>() / 1000.0
    }

    /// Date range, totals, daily averages and sampling interval.
    ///
    /// Returns the default (all zero, no dates) for an empty series.
    pub fn summary(&self) -> DataSummary {
        let (Some(first), Some(last)) = (self.intervals.first(), self.intervals.last()) else {
            return DataSummary::default();
        };
        let produced = self.total_produced_kwh();
        let consumed = self.total_consumed_kwh();
        let days = self.days_spanned();
        DataSummary {
            total_produced_kwh: produced,
            total_consumed_kwh: consumed,
            net_surplus_kwh: produced - consumed,
            first_date: Some(first.timestamp.date()),
            last_date: Some(last.timestamp.date()),
            days_covered: days,
            daily_avg_production_kwh: produced / f64::from(days),
            daily_avg_consumption_kwh: consumed / f64::from(days),
            interval_minutes: self.detect_interval_hours() * 60.0,
        }
    }

    /// Average interval energies per hour of day, for the hours present in the series.
    pub fn hourly_averages(&self) -> Vec<HourlyAverage> {
        let mut sums: BTreeMap<u32, (usize, f64, f64)> = BTreeMap::new();
        for interval in &self.intervals {
            let entry = sums.entry(interval.timestamp.hour()).or_default();
            entry.0 += 1;
            entry.1 += interval.produced_wh;
            entry.2 += interval.consumed_wh;
        }
        sums.into_iter()
            .map(|(hour, (samples, produced_wh, consumed_wh))| {
                let n = samples as f64;
                HourlyAverage {
                    hour,
                    samples,
                    produced_kwh: produced_wh / n / 1000.0,
                    consumed_kwh: consumed_wh / n / 1000.0,
                    surplus_kwh: (produced_wh - consumed_wh) / n / 1000.0,
                }
            })
            .collect()
    }

    /// Mean daily totals per season, for the seasons present in the series.
    ///
    /// Each calendar day with at least one interval counts once, using the
    /// energy of the intervals it holds.
    pub fn seasonal_averages(&self) -> Vec<SeasonalAverage> {
        let mut daily: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
        for interval in &self.intervals {
            let entry = daily.entry(interval.timestamp.date()).or_default();
            entry.0 += interval.produced_wh;
            entry.1 += interval.consumed_wh;
        }

        let mut seasons: BTreeMap<Season, (usize, f64, f64)> = BTreeMap::new();
        for (date, (produced_wh, consumed_wh)) in daily {
            let entry = seasons.entry(Season::from_month(date.month())).or_default();
            entry.0 += 1;
            entry.1 += produced_wh;
            entry.2 += consumed_wh;
        }

        seasons
            .into_iter()
            .map(|(season, (days, produced_wh, consumed_wh))| {
                let n = days as f64;
                SeasonalAverage {
                    season,
                    days,
                    produced_kwh_per_day: produced_wh / n / 1000.0,
                    consumed_kwh_per_day: consumed_wh / n / 1000.0,
                    surplus_kwh_per_day: (produced_wh - consumed_wh) / n / 1000.0,
                }
            })
            .collect()
    }
}
