
/// Exception and error formatting.
pub mod error;
