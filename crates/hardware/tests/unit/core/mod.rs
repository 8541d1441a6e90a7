
/// Functional units.
pub mod units;
