//! Shared numerical primitives.

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for impedances and phasors.
pub type CScalar = num_complex::Complex<Scalar>;

/// Returns the complex exponential `e^(j * theta)` using `Scalar` precision.
#[must_use]
pub fn phasor(theta: Scalar) -> CScalar {
    num_complex::Complex::from_polar(1.0, theta)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn phasor_has_unit_magnitude() {
        let p = phasor(0.75);
        assert_relative_eq!(p.norm(), 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(p.arg(), 0.75, epsilon = 1.0e-12);
    }
}
