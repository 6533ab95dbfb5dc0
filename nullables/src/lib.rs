//! Nullable infrastructure for deterministic testing.
//!
//! The only ambient dependency of the cooperative is the clock. `NullClock`
//! implements the same `Clock` trait as the system clock, returns a fixed
//! time and advances only when told to.

pub mod clock;

pub use clock::NullClock;
