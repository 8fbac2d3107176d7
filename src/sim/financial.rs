//! Post-hoc financial projection from simulation totals.
//!
//! Every ratio goes through [`safe_ratio`], so degenerate inputs (zero days,
//! zero capacity, zero savings) produce 0 or `f64::INFINITY` instead of NaN.

use std::fmt;

use serde::Serialize;

use crate::config::EconomicConfig;

/// Denominators with a magnitude below this are treated as zero.
pub const EPSILON: f64 = 1e-9;

const DAYS_PER_YEAR: f64 = 365.0;

/// `numerator / denominator`, or 0 when the denominator is (near) zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

/// `numerator / denominator`, or `f64::INFINITY` when the denominator is not positive.
fn ratio_or_infinite(numerator: f64, denominator: f64) -> f64 {
    if denominator < EPSILON {
        f64::INFINITY
    } else {
        numerator / denominator
    }
}

/// Cubic metres of natural gas holding `energy_kwh`.
pub fn gas_volume_m3(energy_kwh: f64, gas_energy_kwh_per_m3: f64) -> f64 {
    safe_ratio(energy_kwh, gas_energy_kwh_per_m3)
}

/// Money value of a battery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BatteryFinancials {
    /// Avoided grid purchases: discharged energy at the electricity price (€).
    pub import_savings: f64,
    /// Feed-in revenue given up: drawn energy at the feed-in tariff (€).
    pub export_loss: f64,
    /// `import_savings - export_loss` (€).
    pub net_savings: f64,
    /// Grid import without a battery (kWh).
    pub grid_import_without_kwh: f64,
    /// Grid import with the battery (kWh).
    pub grid_import_with_kwh: f64,
    /// Relative import reduction (%).
    pub grid_import_reduction_percent: f64,
}

impl BatteryFinancials {
    /// Values the battery's energy flows at the configured prices.
    ///
    /// # Arguments
    ///
    /// * `charged_kwh` - Surplus drawn into the battery, before efficiency losses
    /// * `discharged_kwh` - Energy delivered from the battery
    /// * `import_without_kwh` - Grid import if no battery were installed
    /// * `import_with_kwh` - Grid import with the battery
    pub fn new(
        charged_kwh: f64,
        discharged_kwh: f64,
        import_without_kwh: f64,
        import_with_kwh: f64,
        economic: &EconomicConfig,
    ) -> Self {
        let import_savings = discharged_kwh * economic.electricity_price_per_kwh;
        let export_loss = charged_kwh * economic.feed_in_tariff_per_kwh;
        Self {
            import_savings,
            export_loss,
            net_savings: import_savings - export_loss,
            grid_import_without_kwh: import_without_kwh,
            grid_import_with_kwh: import_with_kwh,
            grid_import_reduction_percent: safe_ratio(
                import_without_kwh - import_with_kwh,
                import_without_kwh,
            ) * 100.0,
        }
    }
}

/// Battery wear from cycling, compared with its calendar lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Degradation {
    /// Equivalent full cycles per day.
    pub daily_cycles: f64,
    /// Equivalent full cycles per year.
    pub annual_cycles: f64,
    /// Years until the rated cycle count is reached (`INFINITY` without cycling).
    pub years_to_cycle_limit: f64,
    /// Shorter of cycle life and calendar life (years).
    pub effective_lifetime_years: f64,
}

impl Degradation {
    pub fn estimate(
        discharged_kwh: f64,
        capacity_kwh: f64,
        days: u32,
        expected_cycles: f64,
        lifetime_years: f64,
    ) -> Self {
        let daily_cycles = safe_ratio(safe_ratio(discharged_kwh, capacity_kwh), f64::from(days));
        let annual_cycles = daily_cycles * DAYS_PER_YEAR;
        let years_to_cycle_limit = ratio_or_infinite(expected_cycles, annual_cycles);
        Self {
            daily_cycles,
            annual_cycles,
            years_to_cycle_limit,
            effective_lifetime_years: years_to_cycle_limit.min(lifetime_years),
        }
    }
}

/// Return on the battery investment, extrapolated from the simulated period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RoiMetrics {
    /// Days the projection is based on.
    pub days: u32,
    /// Average savings per day (€).
    pub daily_savings: f64,
    /// `total * 365 / days` (€).
    pub annual_savings: f64,
    /// Installation cost over annual savings (`INFINITY` when nothing is saved).
    pub payback_years: f64,
    /// Annual savings as % of installation cost.
    pub roi_percent: f64,
    /// Savings over the effective lifetime (€).
    pub lifetime_savings: f64,
    /// Lifetime savings minus installation cost (€).
    pub net_lifetime_benefit: f64,
}

impl RoiMetrics {
    /// Annualizes `total_savings` observed over `days` and relates it to the investment.
    pub fn project(
        total_savings: f64,
        days: u32,
        installation_cost: f64,
        effective_lifetime_years: f64,
    ) -> Self {
        let days_f = f64::from(days);
        let daily_savings = safe_ratio(total_savings, days_f);
        let annual_savings = safe_ratio(total_savings * DAYS_PER_YEAR, days_f);
        let payback_years = if annual_savings < EPSILON {
            f64::INFINITY
        } else {
            installation_cost / annual_savings
        };
        let roi_percent = if installation_cost < EPSILON {
            0.0
        } else {
            annual_savings / installation_cost * 100.0
        };
        let lifetime_savings = annual_savings * effective_lifetime_years;

        Self {
            days,
            daily_savings,
            annual_savings,
            payback_years,
            roi_percent,
            lifetime_savings,
            net_lifetime_benefit: lifetime_savings - installation_cost,
        }
    }
}

/// Money value of a boiler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoilerFinancials {
    /// Gas a gas-fired heater would need for the draw-off (m³).
    pub gas_needed_m3: f64,
    /// Gas replaced by surplus heating (m³).
    pub gas_saved_m3: f64,
    /// Value of the gas saved (€).
    pub savings: f64,
}

impl BoilerFinancials {
    pub fn new(
        energy_needed_kwh: f64,
        energy_used_kwh: f64,
        gas_energy_kwh_per_m3: f64,
        gas_price_per_m3: f64,
    ) -> Self {
        let gas_saved_m3 = gas_volume_m3(energy_used_kwh, gas_energy_kwh_per_m3);
        Self {
            gas_needed_m3: gas_volume_m3(energy_needed_kwh, gas_energy_kwh_per_m3),
            gas_saved_m3,
            savings: gas_saved_m3 * gas_price_per_m3,
        }
    }
}

/// Boiler results scaled to one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnnualProjection {
    pub days: u32,
    pub energy_used_kwh: f64,
    pub gas_saved_m3: f64,
    pub savings: f64,
}

impl AnnualProjection {
    pub fn project(energy_used_kwh: f64, gas_saved_m3: f64, savings: f64, days: u32) -> Self {
        let factor = safe_ratio(DAYS_PER_YEAR, f64::from(days));
        Self {
            days,
            energy_used_kwh: energy_used_kwh * factor,
            gas_saved_m3: gas_saved_m3 * factor,
            savings: savings * factor,
        }
    }
}

/// Formats a year count, rendering the no-payback sentinel as "never".
pub(crate) fn years(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1} years")
    } else {
        "never".to_string()
    }
}

impl fmt::Display for RoiMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Daily savings:         {:.2} €", self.daily_savings)?;
        writeln!(
            f,
            "Annual savings:        {:.2} € (from {} days)",
            self.annual_savings, self.days
        )?;
        writeln!(f, "Payback period:        {}", years(self.payback_years))?;
        writeln!(f, "ROI:                   {:.1}% per year", self.roi_percent)?;
        writeln!(f, "Lifetime savings:      {:.2} €", self.lifetime_savings)?;
        write!(f, "Net lifetime benefit:  {:.2} €", self.net_lifetime_benefit)
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Cycles:                {:.3}/day ({:.0}/year)",
            self.daily_cycles, self.annual_cycles
        )?;
        writeln!(f, "Cycle life reached in: {}", years(self.years_to_cycle_limit))?;
        write!(f, "Effective lifetime:    {}", years(self.effective_lifetime_years))
    }
}
