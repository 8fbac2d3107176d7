//! Boiler strategy: surplus heats a hot-water tank that would otherwise burn gas.

use std::fmt;

use chrono::{Datelike, Timelike};
use serde::Serialize;
use tracing::{debug, warn};

use super::financial::{AnnualProjection, BoilerFinancials, gas_volume_m3, safe_ratio};
use super::types::BoilerStepResult;
use crate::config::{BoilerConfig, EconomicConfig};
use crate::series::InputSeries;
use crate::storage::{StorageCalculator, ThermalStore};

/// Rows and summary of one boiler run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoilerOutcome {
    pub rows: Vec<BoilerStepResult>,
    pub summary: BoilerSummary,
}

/// Whole-run totals and derived metrics for the boiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoilerSummary {
    pub interval_hours: f64,
    pub days: u32,
    /// Sum of positive surplus (kWh).
    pub total_surplus_kwh: f64,
    pub total_energy_needed_kwh: f64,
    pub total_energy_used_kwh: f64,
    pub total_heat_loss_kwh: f64,
    pub total_hot_water_l: f64,
    pub final_temp_c: f64,
    /// Share of positive surplus put into the tank (%).
    pub utilization_percent: f64,
    /// Energy used relative to the draw-off reheat need (%).
    pub coverage_percent: f64,
    /// Input energy to heat one day of configured usage (kWh).
    pub daily_energy_needed_kwh: f64,
    pub financials: BoilerFinancials,
    pub annual: AnnualProjection,
}

/// Runs a [`ThermalStore`] across an input series and values the gas it replaces.
#[derive(Debug, Clone)]
pub struct BoilerCalculator {
    boiler: BoilerConfig,
    economic: EconomicConfig,
    store: ThermalStore,
}

impl BoilerCalculator {
    /// # Panics
    ///
    /// Panics on boiler parameters that `StorageConfig::validate` rejects.
    pub fn new(boiler: &BoilerConfig, economic: &EconomicConfig) -> Self {
        Self {
            boiler: boiler.clone(),
            economic: economic.clone(),
            store: boiler.thermal_store(),
        }
    }

    /// Tank state after the last run.
    pub fn store(&self) -> &ThermalStore {
        &self.store
    }
}

impl StorageCalculator for BoilerCalculator {
    type Outcome = BoilerOutcome;

    fn calculate(&mut self, series: &InputSeries) -> BoilerOutcome {
        self.store.reset();
        if series.is_empty() {
            warn!("empty series, skipping boiler simulation");
            return BoilerOutcome::default();
        }

        let dt = series.detect_interval_hours();
        let days = series.days_spanned();
        let gas_energy = self.boiler.gas_energy_kwh_per_m3;
        let gas_price = self.economic.gas_price_per_m3;

        let mut rows = Vec::with_capacity(series.len());
        let mut total_surplus = 0.0;
        let mut total_needed = 0.0;
        let mut total_used = 0.0;
        let mut total_loss = 0.0;
        let mut total_water = 0.0;

        for (interval, surplus_wh) in series.intervals().iter().zip(self.surplus(series)) {
            let surplus_kwh = surplus_wh / 1000.0;
            let hour = interval.timestamp.hour();
            let step = self.store.step(hour, dt, surplus_kwh);

            total_surplus += surplus_kwh.max(0.0);
            total_needed += step.energy_needed_kwh;
            total_used += step.energy_used_kwh;
            total_loss += step.heat_loss_kwh;
            total_water += step.hot_water_demand_l;

            let gas_saved_m3 = gas_volume_m3(step.energy_used_kwh, gas_energy);
            rows.push(BoilerStepResult {
                timestamp: interval.timestamp,
                hour,
                weekday: interval.timestamp.weekday(),
                surplus_wh,
                surplus_kwh,
                water_temp_c: step.water_temp_c,
                heat_energy_kwh: step.heat_energy_kwh,
                hot_water_demand_l: step.hot_water_demand_l,
                energy_needed_kwh: step.energy_needed_kwh,
                energy_used_kwh: step.energy_used_kwh,
                heat_loss_kwh: step.heat_loss_kwh,
                gas_needed_m3: gas_volume_m3(step.energy_needed_kwh, gas_energy),
                gas_saved_m3,
                savings: gas_saved_m3 * gas_price,
            });
        }

        let financials = BoilerFinancials::new(total_needed, total_used, gas_energy, gas_price);
        let annual = AnnualProjection::project(
            total_used,
            financials.gas_saved_m3,
            financials.savings,
            days,
        );

        debug!(
            intervals = rows.len(),
            dt_hours = dt,
            used_kwh = total_used,
            needed_kwh = total_needed,
            "boiler simulation complete"
        );

        BoilerOutcome {
            rows,
            summary: BoilerSummary {
                interval_hours: dt,
                days,
                total_surplus_kwh: total_surplus,
                total_energy_needed_kwh: total_needed,
                total_energy_used_kwh: total_used,
                total_heat_loss_kwh: total_loss,
                total_hot_water_l: total_water,
                final_temp_c: self.store.temperature_c(),
                utilization_percent: safe_ratio(total_used, total_surplus) * 100.0,
                coverage_percent: safe_ratio(total_used, total_needed) * 100.0,
                daily_energy_needed_kwh: self.store.daily_energy_needed_kwh(),
                financials,
                annual,
            },
        }
    }
}

impl fmt::Display for BoilerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Boiler Report ---")?;
        writeln!(
            f,
            "Period:                {} days at {:.2} h intervals",
            self.days, self.interval_hours
        )?;
        writeln!(f, "Surplus available:     {:.2} kWh", self.total_surplus_kwh)?;
        writeln!(
            f,
            "Hot water drawn:       {:.0} L (needs {:.2} kWh/day)",
            self.total_hot_water_l, self.daily_energy_needed_kwh
        )?;
        writeln!(
            f,
            "Energy needed / used:  {:.2} / {:.2} kWh",
            self.total_energy_needed_kwh, self.total_energy_used_kwh
        )?;
        writeln!(f, "Standby loss:          {:.2} kWh", self.total_heat_loss_kwh)?;
        writeln!(f, "Final temperature:     {:.1} °C", self.final_temp_c)?;
        writeln!(f, "Surplus utilization:   {:.1}%", self.utilization_percent)?;
        writeln!(f, "Demand coverage:       {:.1}%", self.coverage_percent)?;
        writeln!(
            f,
            "Gas needed / saved:    {:.2} / {:.2} m³",
            self.financials.gas_needed_m3, self.financials.gas_saved_m3
        )?;
        writeln!(f, "Savings:               {:.2} €", self.financials.savings)?;
        write!(
            f,
            "Annual projection:     {:.0} kWh, {:.1} m³, {:.2} €",
            self.annual.energy_used_kwh, self.annual.gas_saved_m3, self.annual.savings
        )
    }
}
