/// CSV export of result rows and aggregated tables.
pub mod export;
/// CSV loading of metered input data.
pub mod import;
