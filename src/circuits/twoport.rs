//! Voltage transfer ratio of the series/shunt two-port divider.

use crate::constants::{SHORT_CIRCUIT_TOLERANCE, TRANSFER_CLAMP};
use crate::math::CScalar as C;

/// Voltage transfer ratio `H = Z2 / (Z1 + Z2)` of a series `z1`, shunt `z2` divider.
///
/// Degenerate impedances resolve in this order:
/// 1. either magnitude within tolerance of zero: `0`
/// 2. both infinite: `1`
/// 3. only `z1` infinite: `1`
/// 4. only `z2` infinite: `0`
///
/// Otherwise each component of the ratio is clamped to `±1e6`; a ratio that is
/// still not finite (e.g. `Z1 + Z2` cancels exactly) falls back to `0`.
#[must_use]
pub fn transfer_function(z1: C, z2: C) -> C {
    let (m1, m2) = (z1.norm(), z2.norm());
    if m1 < SHORT_CIRCUIT_TOLERANCE || m2 < SHORT_CIRCUIT_TOLERANCE {
        return C::new(0.0, 0.0);
    }
    match (m1.is_infinite(), m2.is_infinite()) {
        (true, _) => return C::new(1.0, 0.0),
        (false, true) => return C::new(0.0, 0.0),
        (false, false) => {}
    }
    let h = z2 / (z1 + z2);
    if h.re.is_nan() || h.im.is_nan() {
        return C::new(0.0, 0.0);
    }
    C::new(
        h.re.clamp(-TRANSFER_CLAMP, TRANSFER_CLAMP),
        h.im.clamp(-TRANSFER_CLAMP, TRANSFER_CLAMP),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Scalar;
    use approx::assert_relative_eq;

    #[test]
    fn matches_divider_formula() {
        let z1 = C::new(10.0, 5.0);
        let z2 = C::new(3.0, -7.0);
        let expected = z2 / (z1 + z2);
        let h = transfer_function(z1, z2);
        assert_relative_eq!(h.re, expected.re, epsilon = 1e-12);
        assert_relative_eq!(h.im, expected.im, epsilon = 1e-12);
    }

    #[test]
    fn equal_impedances_halve_the_voltage() {
        for z in [C::new(100.0, 0.0), C::new(33.3, -12.7), C::new(1e-3, 4e5)] {
            assert_eq!(transfer_function(z, z), C::new(0.5, 0.0));
        }
    }

    #[test]
    fn shorted_port_gives_zero() {
        let inf = C::new(Scalar::INFINITY, 0.0);
        assert_eq!(transfer_function(C::new(0.0, 0.0), C::new(100.0, 0.0)), C::new(0.0, 0.0));
        assert_eq!(transfer_function(C::new(100.0, 0.0), C::new(1e-15, 0.0)), C::new(0.0, 0.0));
        // Zero check wins over the open checks.
        assert_eq!(transfer_function(inf, C::new(0.0, 0.0)), C::new(0.0, 0.0));
    }

    #[test]
    fn open_ports() {
        let inf = C::new(Scalar::INFINITY, 0.0);
        let z = C::new(100.0, 20.0);
        assert_eq!(transfer_function(inf, inf), C::new(1.0, 0.0));
        assert_eq!(transfer_function(inf, z), C::new(1.0, 0.0));
        assert_eq!(transfer_function(z, inf), C::new(0.0, 0.0));
    }

    #[test]
    fn near_cancelling_divider_is_clamped() {
        // Z1 + Z2 is almost zero: series LC right at resonance.
        let z1 = C::new(1e-9, 100.0);
        let z2 = C::new(1e-9, -100.0);
        let h = transfer_function(z1, z2);
        assert!(h.re.abs() <= TRANSFER_CLAMP && h.im.abs() <= TRANSFER_CLAMP);
        assert!(h.re.is_finite() && h.im.is_finite());
    }

    #[test]
    fn exact_cancellation_falls_back_to_zero() {
        let h = transfer_function(C::new(0.0, 100.0), C::new(0.0, -100.0));
        assert_eq!(h, C::new(0.0, 0.0));
    }
}
