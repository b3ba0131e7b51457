//! Numeric constants and unit conversions shared by the evaluators.
//!
//! The two-port front end takes inductance in millihenries and capacitance in
//! microfarads; resistance is already in ohms.

use std::f64::consts::PI;

/// Millihenries to henries.
pub const MILLIHENRY: f64 = 1.0e-3;
/// Microfarads to farads.
pub const MICROFARAD: f64 = 1.0e-6;

/// Number of log-spaced samples in a frequency-response sweep.
pub const SWEEP_POINTS: usize = 1000;
/// Gain recorded when the transfer function is zero or not finite.
pub const GAIN_FLOOR_DB: f64 = -120.0;
/// Bound applied to each component of a finite transfer function.
pub const TRANSFER_CLAMP: f64 = 1.0e6;
/// Absolute tolerance below which an impedance magnitude counts as a short.
pub const SHORT_CIRCUIT_TOLERANCE: f64 = 1.0e-12;

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: f64) -> f64 {
    2.0 * PI * hz
}
