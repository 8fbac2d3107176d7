//! Per-interval result rows produced by the storage calculators.

use std::fmt;

use chrono::{NaiveDateTime, Weekday};
use serde::Serialize;

/// Rows that carry the timestamp of the interval they describe.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

/// Complete record of one battery interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryStepResult {
    /// Interval start.
    pub timestamp: NaiveDateTime,
    /// Hour of day (0-23).
    pub hour: u32,
    /// Day of week.
    pub weekday: Weekday,
    /// Production minus consumption (Wh).
    pub surplus_wh: f64,
    /// Production minus consumption (kWh).
    pub surplus_kwh: f64,
    /// Stored energy after the step (kWh).
    pub charge_kwh: f64,
    /// State of charge after the step (% of capacity).
    pub soc_percent: f64,
    /// Surplus drawn into the battery, before efficiency losses (kWh).
    pub charged_kwh: f64,
    /// Energy delivered by the battery (kWh).
    pub discharged_kwh: f64,
    /// Surplus the battery could not take (kWh).
    pub wasted_kwh: f64,
    /// Grid import without a battery (kWh).
    pub grid_import_without_kwh: f64,
    /// Grid export without a battery (kWh).
    pub grid_export_without_kwh: f64,
    /// Grid import with the battery (kWh).
    pub grid_import_with_kwh: f64,
    /// Grid export with the battery (kWh).
    pub grid_export_with_kwh: f64,
    /// Avoided import cost (€).
    pub import_savings: f64,
    /// Feed-in revenue given up by charging (€).
    pub export_loss: f64,
    /// `import_savings - export_loss` (€).
    pub net_savings: f64,
}

impl Timestamped for BatteryStepResult {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl fmt::Display for BatteryStepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | surplus={:>7.3} kWh | charge={:.3} kWh (SoC={:.1}%) | \
             in={:.3}  out={:.3}  wasted={:.3} | import {:.3} -> {:.3} kWh | net={:.4}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.surplus_kwh,
            self.charge_kwh,
            self.soc_percent,
            self.charged_kwh,
            self.discharged_kwh,
            self.wasted_kwh,
            self.grid_import_without_kwh,
            self.grid_import_with_kwh,
            self.net_savings,
        )
    }
}

/// Complete record of one boiler interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoilerStepResult {
    /// Interval start.
    pub timestamp: NaiveDateTime,
    /// Hour of day (0-23).
    pub hour: u32,
    /// Day of week.
    pub weekday: Weekday,
    /// Production minus consumption (Wh).
    pub surplus_wh: f64,
    /// Production minus consumption (kWh).
    pub surplus_kwh: f64,
    /// Water temperature after the step (°C).
    pub water_temp_c: f64,
    /// Heat stored above cold inlet after the step (kWh).
    pub heat_energy_kwh: f64,
    /// Hot water drawn (L).
    pub hot_water_demand_l: f64,
    /// Energy needed to reheat the draw-off (kWh).
    pub energy_needed_kwh: f64,
    /// Surplus put into the tank (kWh).
    pub energy_used_kwh: f64,
    /// Standby heat loss (kWh).
    pub heat_loss_kwh: f64,
    /// Gas a gas boiler would burn for the draw-off (m³).
    pub gas_needed_m3: f64,
    /// Gas replaced by surplus heating (m³).
    pub gas_saved_m3: f64,
    /// Value of the gas saved (€).
    pub savings: f64,
}

impl Timestamped for BoilerStepResult {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl fmt::Display for BoilerStepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | surplus={:>7.3} kWh | T={:>5.1} °C | draw={:.1} L | \
             need={:.3}  used={:.3}  loss={:.4} kWh | gas saved={:.4} m³",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.surplus_kwh,
            self.water_temp_c,
            self.hot_water_demand_l,
            self.energy_needed_kwh,
            self.energy_used_kwh,
            self.heat_loss_kwh,
            self.gas_saved_m3,
        )
    }
}
