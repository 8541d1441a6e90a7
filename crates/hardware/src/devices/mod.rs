//! Simulated peripheral devices.
//!
//! Devices never call into the kernel directly: they schedule events on the
//! simulator's timeline and do their work when the event fires.

/// Periodic or randomized timer interrupts.
pub mod timer;

pub use self::timer::Timer;
