//! TOML-based storage configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{HourlyProfile, Reservoir, ThermalStore};

/// Top-level configuration parsed from TOML.
///
/// Every section and field has a default, so an empty document is valid.
/// Load from TOML with [`StorageConfig::from_toml_file`] or pick a built-in
/// preset with [`StorageConfig::from_preset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Energy prices and tariffs.
    #[serde(default)]
    pub economic: EconomicConfig,
    /// Hot-water boiler parameters.
    #[serde(default)]
    pub boiler: BoilerConfig,
    /// Home battery parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
}

/// Energy prices and tariffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicConfig {
    /// Grid electricity price (€/kWh).
    pub electricity_price_per_kwh: f64,
    /// Natural gas price (€/m³).
    pub gas_price_per_m3: f64,
    /// Compensation for energy exported to the grid (€/kWh).
    pub feed_in_tariff_per_kwh: f64,
}

impl Default for EconomicConfig {
    fn default() -> Self {
        Self {
            electricity_price_per_kwh: 0.22,
            gas_price_per_m3: 0.80,
            feed_in_tariff_per_kwh: 0.09,
        }
    }
}

/// Hot-water boiler parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoilerConfig {
    /// Tank volume (L).
    pub volume_l: f64,
    /// Heating efficiency (0.0–1.0].
    pub efficiency: f64,
    /// Hot water used per day (L).
    pub daily_usage_l: f64,
    /// Set-point above the cold inlet (°C).
    pub temperature_rise_c: f64,
    /// Cold inlet water temperature (°C).
    pub cold_inlet_c: f64,
    /// Standby heat loss (% of stored heat per day).
    pub standby_loss_percent_per_day: f64,
    /// Energy content of natural gas (kWh/m³).
    pub gas_energy_kwh_per_m3: f64,
    /// Fraction of daily usage drawn in each hour, 24 entries.
    pub usage_profile: HourlyProfile,
}

impl Default for BoilerConfig {
    fn default() -> Self {
        Self {
            volume_l: 80.0,
            efficiency: 0.9,
            daily_usage_l: 120.0,
            temperature_rise_c: 35.0,
            cold_inlet_c: 10.0,
            standby_loss_percent_per_day: 0.5,
            gas_energy_kwh_per_m3: 9.77,
            usage_profile: HourlyProfile::default(),
        }
    }
}

impl BoilerConfig {
    /// Builds a fully heated tank from these parameters.
    ///
    /// # Panics
    ///
    /// Panics on parameters that [`StorageConfig::validate`] rejects.
    pub fn thermal_store(&self) -> ThermalStore {
        ThermalStore::new(
            self.volume_l,
            self.efficiency,
            self.daily_usage_l,
            self.temperature_rise_c,
            self.cold_inlet_c,
            self.standby_loss_percent_per_day,
            self.usage_profile,
        )
    }
}

/// Home battery parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Nominal capacity (kWh).
    pub capacity_kwh: f64,
    /// Round-trip efficiency (0.0–1.0].
    pub efficiency: f64,
    /// Maximum charging power (kW).
    pub max_charge_kw: f64,
    /// Maximum discharging power (kW).
    pub max_discharge_kw: f64,
    /// Lower state-of-charge bound (% of capacity).
    pub min_soc_percent: f64,
    /// Upper state-of-charge bound (% of capacity).
    pub max_soc_percent: f64,
    /// Installed cost (€).
    pub installation_cost: f64,
    /// Calendar lifetime (years).
    pub lifetime_years: f64,
    /// Full cycles before end of life.
    pub expected_cycles: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            efficiency: 0.9,
            max_charge_kw: 3.6,
            max_discharge_kw: 3.6,
            min_soc_percent: 10.0,
            max_soc_percent: 90.0,
            installation_cost: 5000.0,
            lifetime_years: 10.0,
            expected_cycles: 3650.0,
        }
    }
}

impl BatteryConfig {
    /// Builds a reservoir at its minimum charge from these parameters.
    ///
    /// # Panics
    ///
    /// Panics on parameters that [`StorageConfig::validate`] rejects.
    pub fn reservoir(&self) -> Reservoir {
        Reservoir::new(
            self.capacity_kwh,
            self.efficiency,
            self.max_charge_kw,
            self.max_discharge_kw,
            self.min_soc_percent,
            self.max_soc_percent,
        )
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error, PartialEq)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl StorageConfig {
    /// Returns the reference household: 80 L boiler and a 10 kWh battery.
    pub fn default_home() -> Self {
        Self::default()
    }

    /// Returns the small-home preset: compact boiler and a 5 kWh battery.
    pub fn small_home() -> Self {
        Self {
            economic: EconomicConfig::default(),
            boiler: BoilerConfig {
                volume_l: 50.0,
                daily_usage_l: 80.0,
                ..BoilerConfig::default()
            },
            battery: BatteryConfig {
                capacity_kwh: 5.0,
                max_charge_kw: 2.5,
                max_discharge_kw: 2.5,
                installation_cost: 3500.0,
                ..BatteryConfig::default()
            },
        }
    }

    /// Returns the large-home preset: 150 L boiler and a 15 kWh battery.
    pub fn large_home() -> Self {
        Self {
            economic: EconomicConfig::default(),
            boiler: BoilerConfig {
                volume_l: 150.0,
                daily_usage_l: 200.0,
                ..BoilerConfig::default()
            },
            battery: BatteryConfig {
                capacity_kwh: 15.0,
                max_charge_kw: 5.0,
                max_discharge_kw: 5.0,
                installation_cost: 8000.0,
                expected_cycles: 6000.0,
                lifetime_years: 15.0,
                ..BatteryConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "small_home", "large_home"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default_home()),
            "small_home" => Ok(Self::small_home()),
            "large_home" => Ok(Self::large_home()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Every numeric field
    /// must be finite; a non-finite field is reported once, without its range
    /// check.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let eco = &self.economic;
        for (field, value) in [
            ("economic.electricity_price_per_kwh", eco.electricity_price_per_kwh),
            ("economic.gas_price_per_m3", eco.gas_price_per_m3),
            ("economic.feed_in_tariff_per_kwh", eco.feed_in_tariff_per_kwh),
        ] {
            check_field(&mut errors, field, value, value >= 0.0, "must be >= 0");
        }

        let b = &self.boiler;
        check_field(&mut errors, "boiler.volume_l", b.volume_l, b.volume_l >= 0.0, "must be >= 0");
        check_field(
            &mut errors,
            "boiler.efficiency",
            b.efficiency,
            b.efficiency > 0.0 && b.efficiency <= 1.0,
            "must be in (0.0, 1.0]",
        );
        check_field(
            &mut errors,
            "boiler.daily_usage_l",
            b.daily_usage_l,
            b.daily_usage_l >= 0.0,
            "must be >= 0",
        );
        check_field(
            &mut errors,
            "boiler.temperature_rise_c",
            b.temperature_rise_c,
            b.temperature_rise_c > 0.0,
            "must be > 0",
        );
        if !b.cold_inlet_c.is_finite() {
            errors.push(ConfigError::new("boiler.cold_inlet_c", "must be finite"));
        }
        check_field(
            &mut errors,
            "boiler.standby_loss_percent_per_day",
            b.standby_loss_percent_per_day,
            (0.0..=100.0).contains(&b.standby_loss_percent_per_day),
            "must be in [0, 100]",
        );
        check_field(
            &mut errors,
            "boiler.gas_energy_kwh_per_m3",
            b.gas_energy_kwh_per_m3,
            b.gas_energy_kwh_per_m3 > 0.0,
            "must be > 0",
        );
        if (0..24).any(|h| !(0.0..=1.0).contains(&b.usage_profile.fraction(h))) {
            errors.push(ConfigError::new(
                "boiler.usage_profile",
                "every fraction must be in [0.0, 1.0]",
            ));
        }

        let bat = &self.battery;
        check_field(
            &mut errors,
            "battery.capacity_kwh",
            bat.capacity_kwh,
            bat.capacity_kwh >= 0.0,
            "must be >= 0",
        );
        check_field(
            &mut errors,
            "battery.efficiency",
            bat.efficiency,
            bat.efficiency > 0.0 && bat.efficiency <= 1.0,
            "must be in (0.0, 1.0]",
        );
        check_field(
            &mut errors,
            "battery.max_charge_kw",
            bat.max_charge_kw,
            bat.max_charge_kw >= 0.0,
            "must be >= 0",
        );
        check_field(
            &mut errors,
            "battery.max_discharge_kw",
            bat.max_discharge_kw,
            bat.max_discharge_kw >= 0.0,
            "must be >= 0",
        );
        check_field(
            &mut errors,
            "battery.min_soc_percent",
            bat.min_soc_percent,
            (0.0..=100.0).contains(&bat.min_soc_percent),
            "must be in [0, 100]",
        );
        check_field(
            &mut errors,
            "battery.max_soc_percent",
            bat.max_soc_percent,
            (0.0..=100.0).contains(&bat.max_soc_percent),
            "must be in [0, 100]",
        );
        if bat.min_soc_percent.is_finite()
            && bat.max_soc_percent.is_finite()
            && bat.min_soc_percent > bat.max_soc_percent
        {
            errors.push(ConfigError::new(
                "battery.min_soc_percent",
                "must be <= battery.max_soc_percent",
            ));
        }
        check_field(
            &mut errors,
            "battery.installation_cost",
            bat.installation_cost,
            bat.installation_cost >= 0.0,
            "must be >= 0",
        );
        check_field(
            &mut errors,
            "battery.lifetime_years",
            bat.lifetime_years,
            bat.lifetime_years > 0.0,
            "must be > 0",
        );
        check_field(
            &mut errors,
            "battery.expected_cycles",
            bat.expected_cycles,
            bat.expected_cycles > 0.0,
            "must be > 0",
        );

        errors
    }
}

/// Reports `field` as non-finite, or with `message` when it fails its range check.
fn check_field(
    errors: &mut Vec<ConfigError>,
    field: &'static str,
    value: f64,
    in_range: bool,
    message: &str,
) {
    if !value.is_finite() {
        errors.push(ConfigError::new(field, "must be finite"));
    } else if !in_range {
        errors.push(ConfigError::new(field, message));
    }
}
