use serde::{Deserialize, Serialize};

/// Specific heat capacity of water (kWh per litre per °C).
pub const SPECIFIC_HEAT_KWH_PER_L_K: f64 = 0.00116;

/// Length of one profile slot in hours; draw-off scales with `duration / PROFILE_SLOT_HOURS`.
const PROFILE_SLOT_HOURS: f64 = 1.0;

/// Fraction of the daily hot-water usage drawn in each hour of the day.
///
/// Hours without an entry draw nothing. The fractions of a realistic
/// profile sum to roughly 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlyProfile([f64; 24]);

impl HourlyProfile {
    /// A profile that never draws water.
    pub fn none() -> Self {
        Self([0.0; 24])
    }

    /// Builds a profile from `(hour, fraction)` pairs; hours beyond 23 are ignored.
    pub fn from_pairs(pairs: &[(u32, f64)]) -> Self {
        let mut slots = [0.0; 24];
        for &(hour, fraction) in pairs {
            if let Some(slot) = slots.get_mut(hour as usize) {
                *slot = fraction.max(0.0);
            }
        }
        Self(slots)
    }

    /// Fraction of daily usage drawn during `hour` (0 for unlisted hours).
    pub fn fraction(&self, hour: u32) -> f64 {
        self.0.get(hour as usize).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl Default for HourlyProfile {
    /// Household pattern with a morning and an evening peak.
    fn default() -> Self {
        Self::from_pairs(&[
            (6, 0.08),
            (7, 0.15),
            (8, 0.10),
            (9, 0.05),
            (12, 0.05),
            (13, 0.04),
            (17, 0.06),
            (18, 0.10),
            (19, 0.12),
            (20, 0.10),
            (21, 0.08),
            (22, 0.07),
        ])
    }
}

/// Standby heat loss of a tank over one interval (kWh).
///
/// Zero for an empty tank or water at or below the cold-inlet temperature.
pub fn interval_heat_loss_kwh(
    volume_l: f64,
    temperature_c: f64,
    cold_inlet_c: f64,
    standby_loss_percent_per_day: f64,
    duration_hours: f64,
) -> f64 {
    if volume_l <= 0.0 || temperature_c <= cold_inlet_c {
        return 0.0;
    }
    let stored = volume_l * SPECIFIC_HEAT_KWH_PER_L_K * (temperature_c - cold_inlet_c);
    stored * (standby_loss_percent_per_day / 100.0 / 24.0) * duration_hours.max(0.0)
}

/// Input energy needed to heat `volume_l` litres by `delta_c` degrees at `efficiency`.
pub fn reheat_energy_kwh(volume_l: f64, delta_c: f64, efficiency: f64) -> f64 {
    if volume_l <= 0.0 || delta_c <= 0.0 || efficiency <= 0.0 {
        return 0.0;
    }
    volume_l * SPECIFIC_HEAT_KWH_PER_L_K * delta_c / efficiency
}

/// Outcome of one boiler interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThermalStep {
    /// Water temperature after the step (°C).
    pub water_temp_c: f64,
    /// Heat stored above cold-inlet temperature after the step (kWh).
    pub heat_energy_kwh: f64,
    /// Hot water drawn during the interval (L).
    pub hot_water_demand_l: f64,
    /// Input energy needed to reheat the draw-off replacement volume (kWh).
    pub energy_needed_kwh: f64,
    /// Surplus energy put into the tank (kWh).
    pub energy_used_kwh: f64,
    /// Standby heat loss (kWh).
    pub heat_loss_kwh: f64,
}

/// Hot-water tank heated from solar surplus, tracked by water temperature.
///
/// Each interval applies, in order, the cold-water mixing caused by draw-off,
/// the standby heat loss, and any heating from positive surplus. The
/// temperature never leaves `[cold_inlet_c, max_temp_c]`.
#[derive(Debug, Clone)]
pub struct ThermalStore {
    volume_l: f64,
    efficiency: f64,
    daily_usage_l: f64,
    cold_inlet_c: f64,
    max_temp_c: f64,
    standby_loss_percent_per_day: f64,
    profile: HourlyProfile,
    temperature_c: f64,
}

impl ThermalStore {
    /// Creates a fully heated tank.
    ///
    /// # Panics
    ///
    /// Panics if any quantity is not finite, if volume or usage is negative,
    /// or if efficiency is outside (0, 1].
    pub fn new(
        volume_l: f64,
        efficiency: f64,
        daily_usage_l: f64,
        temperature_rise_c: f64,
        cold_inlet_c: f64,
        standby_loss_percent_per_day: f64,
        profile: HourlyProfile,
    ) -> Self {
        assert!(
            [
                volume_l,
                daily_usage_l,
                temperature_rise_c,
                cold_inlet_c,
                standby_loss_percent_per_day,
            ]
            .iter()
            .all(|v| v.is_finite())
        );
        assert!(volume_l >= 0.0 && daily_usage_l >= 0.0);
        assert!(efficiency > 0.0 && efficiency <= 1.0);

        let max_temp_c = cold_inlet_c + temperature_rise_c.max(0.0);
        Self {
            volume_l,
            efficiency,
            daily_usage_l,
            cold_inlet_c,
            max_temp_c,
            standby_loss_percent_per_day: standby_loss_percent_per_day.max(0.0),
            profile,
            temperature_c: max_temp_c,
        }
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    pub fn volume_l(&self) -> f64 {
        self.volume_l
    }

    /// Lowest reachable temperature (°C).
    pub fn cold_inlet_c(&self) -> f64 {
        self.cold_inlet_c
    }

    /// Set-point temperature (°C).
    pub fn max_temp_c(&self) -> f64 {
        self.max_temp_c
    }

    /// Heat stored above the cold-inlet temperature (kWh).
    pub fn heat_energy_kwh(&self) -> f64 {
        self.volume_l * SPECIFIC_HEAT_KWH_PER_L_K * (self.temperature_c - self.cold_inlet_c)
    }

    /// Hot water drawn during an interval starting at `hour` (L).
    pub fn draw_off_l(&self, hour: u32, duration_hours: f64) -> f64 {
        self.daily_usage_l * self.profile.fraction(hour) * (duration_hours / PROFILE_SLOT_HOURS)
    }

    /// Input energy needed per day to heat the configured usage (kWh).
    pub fn daily_energy_needed_kwh(&self) -> f64 {
        reheat_energy_kwh(
            self.daily_usage_l,
            self.max_temp_c - self.cold_inlet_c,
            self.efficiency,
        )
    }

    /// Temperature change caused by `energy_kwh` of heat in the whole volume.
    fn degrees_for(&self, heat_kwh: f64) -> f64 {
        if self.volume_l > 0.0 {
            heat_kwh / (self.volume_l * SPECIFIC_HEAT_KWH_PER_L_K)
        } else {
            0.0
        }
    }

    /// Advances the tank by one interval.
    ///
    /// # Arguments
    ///
    /// * `hour` - Hour of day (0-23) the interval starts in
    /// * `duration_hours` - Interval length
    /// * `surplus_kwh` - Production minus consumption; only positive values heat
    pub fn step(&mut self, hour: u32, duration_hours: f64, surplus_kwh: f64) -> ThermalStep {
        let duration_hours = duration_hours.max(0.0);
        let demand_l = self.draw_off_l(hour, duration_hours);

        // 1. Draw-off replaced by cold inlet water
        if self.volume_l > 0.0 && demand_l > 0.0 {
            let replaced = demand_l.min(self.volume_l);
            self.temperature_c = (self.temperature_c * (self.volume_l - replaced)
                + self.cold_inlet_c * replaced)
                / self.volume_l;
            self.clamp_temperature();
        }

        // 2. Standby loss
        let heat_loss_kwh = interval_heat_loss_kwh(
            self.volume_l,
            self.temperature_c,
            self.cold_inlet_c,
            self.standby_loss_percent_per_day,
            duration_hours,
        );
        self.temperature_c -= self.degrees_for(heat_loss_kwh);
        self.clamp_temperature();

        // 3. Energy the draw-off replacement would need
        let replaced_l = if self.volume_l > 0.0 {
            demand_l.min(self.volume_l)
        } else {
            0.0
        };
        let energy_needed_kwh = reheat_energy_kwh(
            replaced_l,
            self.max_temp_c - self.cold_inlet_c,
            self.efficiency,
        );

        // 4. Surplus covers the draw-off reheat first
        let mut available = surplus_kwh.max(0.0);
        let for_draw_off = available.min(energy_needed_kwh);
        available -= for_draw_off;
        let mut energy_used_kwh = for_draw_off;
        self.temperature_c += self.degrees_for(for_draw_off * self.efficiency);
        self.clamp_temperature();

        // 5. Remainder lifts the bulk temperature
        if available > 0.0 && self.temperature_c < self.max_temp_c {
            let headroom = reheat_energy_kwh(
                self.volume_l,
                self.max_temp_c - self.temperature_c,
                self.efficiency,
            );
            let bulk = available.min(headroom);
            energy_used_kwh += bulk;
            self.temperature_c += self.degrees_for(bulk * self.efficiency);
            self.clamp_temperature();
        }

        // 6. A fully covered draw-off leaves the tank at set-point
        if energy_needed_kwh > 0.0 && energy_used_kwh >= energy_needed_kwh {
            self.temperature_c = self.max_temp_c;
        }

        ThermalStep {
            water_temp_c: self.temperature_c,
            heat_energy_kwh: self.heat_energy_kwh(),
            hot_water_demand_l: demand_l,
            energy_needed_kwh,
            energy_used_kwh,
            heat_loss_kwh,
        }
    }

    /// Returns the tank to its fully heated starting state.
    pub fn reset(&mut self) {
        self.temperature_c = self.max_temp_c;
    }

    fn clamp_temperature(&mut self) {
        self.temperature_c = self.temperature_c.clamp(self.cold_inlet_c, self.max_temp_c);
    }
}
