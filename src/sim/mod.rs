/// Calendar aggregation of result rows.
pub mod aggregate;
pub mod battery;
pub mod boiler;
/// Savings, payback and wear projections.
pub mod financial;
pub mod types;
