//! Storage models stepped one interval at a time, and the calculator contract
//! that drives them across a whole series.

pub mod reservoir;
pub mod thermal;

pub use reservoir::{Reservoir, ReservoirStep, ReservoirTotals};
pub use thermal::{HourlyProfile, SPECIFIC_HEAT_KWH_PER_L_K, ThermalStep, ThermalStore};

use crate::series::InputSeries;

/// A storage strategy evaluated over a complete input series.
///
/// Implementors own their simulator state; `calculate` resets it before
/// stepping, so repeated calls on the same series give identical outcomes.
pub trait StorageCalculator {
    /// Per-interval rows plus summary produced by one run.
    type Outcome;

    /// Surplus energy per interval (Wh).
    fn surplus(&self, series: &InputSeries) -> Vec<f64> {
        series.surplus_wh()
    }

    /// Runs the strategy over every interval of `series` in timestamp order.
    fn calculate(&mut self, series: &InputSeries) -> Self::Outcome;
}
