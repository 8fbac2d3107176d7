use serde::Serialize;

/// Energy flows of one reservoir step, all in kWh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReservoirStep {
    /// Stored energy after the step.
    pub charge_kwh: f64,
    /// Energy drawn into storage, before efficiency losses.
    pub charged_kwh: f64,
    /// Energy delivered from storage.
    pub discharged_kwh: f64,
    /// Positive surplus the reservoir could not accept.
    pub wasted_kwh: f64,
    /// Deficit left uncovered by the reservoir.
    pub grid_import_kwh: f64,
}

/// Cumulative reservoir results since construction or the last [`Reservoir::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReservoirTotals {
    pub total_charged_kwh: f64,
    pub total_discharged_kwh: f64,
    pub total_wasted_kwh: f64,
    pub final_charge_kwh: f64,
    pub final_soc_percent: f64,
}

/// A capacity-, rate- and efficiency-bounded energy reservoir stepped one interval at a time.
///
/// Models the home battery with a greedy policy: every positive surplus is
/// offered to the reservoir, every deficit is served from it as far as the
/// rate limits and state-of-charge window allow.
///
/// Round-trip efficiency is applied on the way in only. The running
/// `charged` total counts the energy drawn *before* efficiency losses.
#[derive(Debug, Clone)]
pub struct Reservoir {
    capacity_kwh: f64,
    efficiency: f64,
    max_charge_kw: f64,
    max_discharge_kw: f64,
    min_bound_kwh: f64,
    max_bound_kwh: f64,
    charge_kwh: f64,
    charged_kwh: f64,
    discharged_kwh: f64,
    wasted_kwh: f64,
}

impl Reservoir {
    /// Creates a reservoir holding its minimum charge.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Nominal capacity in kWh (0 gives an inert reservoir)
    /// * `efficiency` - Round-trip efficiency (0..1.0]
    /// * `max_charge_kw` - Maximum charging power in kW
    /// * `max_discharge_kw` - Maximum discharging power in kW
    /// * `min_soc_percent` - Lower state-of-charge bound as % of capacity
    /// * `max_soc_percent` - Upper state-of-charge bound as % of capacity
    ///
    /// Percentages are clamped to `0..=100` and the upper bound is raised to
    /// the lower one if they cross, so `min <= max <= capacity` always holds.
    ///
    /// # Panics
    ///
    /// Panics if any argument is not finite, if capacity or rates are
    /// negative, or if efficiency is outside (0, 1].
    pub fn new(
        capacity_kwh: f64,
        efficiency: f64,
        max_charge_kw: f64,
        max_discharge_kw: f64,
        min_soc_percent: f64,
        max_soc_percent: f64,
    ) -> Self {
        assert!(
            [capacity_kwh, max_charge_kw, max_discharge_kw, min_soc_percent, max_soc_percent]
                .iter()
                .all(|v| v.is_finite())
        );
        assert!(capacity_kwh >= 0.0);
        assert!(max_charge_kw >= 0.0 && max_discharge_kw >= 0.0);
        assert!(efficiency > 0.0 && efficiency <= 1.0);

        let min_pct = min_soc_percent.clamp(0.0, 100.0);
        let max_pct = max_soc_percent.clamp(min_pct, 100.0);
        let min_bound_kwh = capacity_kwh * (min_pct / 100.0);
        let max_bound_kwh = capacity_kwh * (max_pct / 100.0);

        Self {
            capacity_kwh,
            efficiency,
            max_charge_kw,
            max_discharge_kw,
            min_bound_kwh,
            max_bound_kwh,
            charge_kwh: min_bound_kwh,
            charged_kwh: 0.0,
            discharged_kwh: 0.0,
            wasted_kwh: 0.0,
        }
    }

    /// Nominal capacity (kWh).
    pub fn capacity_kwh(&self) -> f64 {
        self.capacity_kwh
    }

    /// Lowest allowed charge (kWh).
    pub fn min_bound_kwh(&self) -> f64 {
        self.min_bound_kwh
    }

    /// Highest allowed charge (kWh).
    pub fn max_bound_kwh(&self) -> f64 {
        self.max_bound_kwh
    }

    /// Current stored energy (kWh).
    pub fn charge_kwh(&self) -> f64 {
        self.charge_kwh
    }

    /// Current charge as a percentage of capacity (0 for a zero-capacity reservoir).
    pub fn soc_percent(&self) -> f64 {
        if self.capacity_kwh > 0.0 {
            self.charge_kwh / self.capacity_kwh * 100.0
        } else {
            0.0
        }
    }

    /// Advances the reservoir by one interval.
    ///
    /// # Arguments
    ///
    /// * `surplus_wh` - Production minus consumption during the interval (Wh)
    /// * `duration_hours` - Interval length used to turn rate limits into energy
    pub fn step(&mut self, surplus_wh: f64, duration_hours: f64) -> ReservoirStep {
        let surplus_kwh = surplus_wh / 1000.0;
        let duration_hours = duration_hours.max(0.0);

        let max_charge_kwh = (self.max_charge_kw * duration_hours)
            .min(self.max_bound_kwh - self.charge_kwh)
            .max(0.0);
        let max_discharge_kwh = (self.max_discharge_kw * duration_hours)
            .min(self.charge_kwh - self.min_bound_kwh)
            .max(0.0);

        let mut step = ReservoirStep::default();

        if surplus_kwh > 0.0 {
            let drawn = surplus_kwh.min(max_charge_kwh);
            self.charge_kwh += drawn * self.efficiency;
            step.charged_kwh = drawn;
            step.wasted_kwh = surplus_kwh - drawn;
        } else if surplus_kwh < 0.0 {
            let needed = -surplus_kwh;
            let delivered = needed.min(max_discharge_kwh);
            self.charge_kwh -= delivered;
            step.discharged_kwh = delivered;
            step.grid_import_kwh = needed - delivered;
        }

        self.charge_kwh = self.charge_kwh.clamp(self.min_bound_kwh, self.max_bound_kwh);

        self.charged_kwh += step.charged_kwh;
        self.discharged_kwh += step.discharged_kwh;
        self.wasted_kwh += step.wasted_kwh;

        step.charge_kwh = self.charge_kwh;
        step
    }

    /// Restores the minimum charge and clears all running totals.
    pub fn reset(&mut self) {
        self.charge_kwh = self.min_bound_kwh;
        self.charged_kwh = 0.0;
        self.discharged_kwh = 0.0;
        self.wasted_kwh = 0.0;
    }

    pub fn totals(&self) -> ReservoirTotals {
        ReservoirTotals {
            total_charged_kwh: self.charged_kwh,
            total_discharged_kwh: self.discharged_kwh,
            total_wasted_kwh: self.wasted_kwh,
            final_charge_kwh: self.charge_kwh,
            final_soc_percent: self.soc_percent(),
        }
    }
}
