//! Solar surplus storage simulator: battery and hot-water boiler strategies
//! evaluated over metered production/consumption data.

pub mod analysis;
pub mod config;
pub mod io;
pub mod logging;
pub mod series;
/// Calculators, financial projection and aggregation.
pub mod sim;
pub mod storage;
pub mod synthetic;
