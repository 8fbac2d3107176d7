//! Seeded synthetic production/consumption series for demos and tests.
//!
//! PV output follows a half-sine between sunrise and sunset with
//! multiplicative Gaussian noise; household load is a daily sinusoid around
//! a base level with additive noise. Equal seeds give identical series.

use std::f64::consts::PI;

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::series::{InputSeries, Interval};

/// Shape of the generated household.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoProfile {
    /// PV peak output (kW).
    pub pv_peak_kw: f64,
    /// First daylight hour (fractional).
    pub sunrise_hour: f64,
    /// End of daylight (fractional hour).
    pub sunset_hour: f64,
    /// PV noise as a fraction of output.
    pub pv_noise_std: f64,
    /// Average household load (kW).
    pub base_load_kw: f64,
    /// Daily load swing (kW).
    pub load_amp_kw: f64,
    /// Phase of the load sinusoid (radians).
    pub load_phase_rad: f64,
    /// Load noise (kW).
    pub load_noise_kw: f64,
    /// Sampling interval (minutes, > 0).
    pub interval_minutes: u32,
}

impl Default for DemoProfile {
    fn default() -> Self {
        Self {
            pv_peak_kw: 5.0,
            sunrise_hour: 6.0,
            sunset_hour: 20.0,
            pv_noise_std: 0.15,
            base_load_kw: 0.6,
            load_amp_kw: 0.35,
            load_phase_rad: 1.2,
            load_noise_kw: 0.05,
            interval_minutes: 15,
        }
    }
}

/// Position within daylight as a fraction of peak output (0 at night).
pub fn daylight_fraction(hour: f64, sunrise_hour: f64, sunset_hour: f64) -> f64 {
    if sunset_hour <= sunrise_hour || hour < sunrise_hour || hour >= sunset_hour {
        return 0.0;
    }
    let pos = (hour - sunrise_hour) / (sunset_hour - sunrise_hour);
    (PI * pos).sin().max(0.0)
}

/// Gaussian noise via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}

/// Generates `days` of data starting at `start`.
///
/// Energies are non-negative and timestamps strictly increasing, so the
/// result satisfies every [`InputSeries::new`] check.
pub fn generate(start: NaiveDateTime, days: u32, profile: &DemoProfile, seed: u64) -> InputSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let minutes = profile.interval_minutes.max(1);
    let dt_hours = f64::from(minutes) / 60.0;
    let steps = days as usize * (24 * 60 / minutes as usize).max(1);

    let intervals = (0..steps)
        .map(|i| {
            let timestamp = start + TimeDelta::minutes(i64::from(minutes) * i as i64);
            // mid-interval hour of day
            let hour = f64::from(timestamp.hour())
                + f64::from(timestamp.minute()) / 60.0
                + dt_hours / 2.0;

            let frac = daylight_fraction(hour, profile.sunrise_hour, profile.sunset_hour);
            let pv_kw = if frac > 0.0 {
                let noise_mult = 1.0 + gaussian_noise(&mut rng, profile.pv_noise_std);
                (profile.pv_peak_kw * frac * noise_mult).max(0.0)
            } else {
                0.0
            };

            let angle = 2.0 * PI * hour / 24.0 + profile.load_phase_rad;
            let load_kw = (profile.base_load_kw
                + profile.load_amp_kw * angle.sin()
                + gaussian_noise(&mut rng, profile.load_noise_kw))
            .max(0.0);

            Interval::new(timestamp, pv_kw * dt_hours * 1000.0, load_kw * dt_hours * 1000.0)
        })
        .collect();

    InputSeries::from_unchecked(intervals)
}
