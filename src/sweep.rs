//! Sample grids and Bode post-processing helpers.

use num_complex::Complex;

use crate::constants::GAIN_FLOOR_DB;
use crate::math::Scalar;

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Generates `n` logarithmically spaced samples between `start` and `stop` (Hz).
///
/// Returns an empty grid unless both bounds are positive and finite.
#[must_use]
pub fn logspace_hz(start_hz: Scalar, stop_hz: Scalar, n: usize) -> Vec<Scalar> {
    let valid = |f: Scalar| f > 0.0 && f.is_finite();
    if !valid(start_hz) || !valid(stop_hz) {
        return Vec::new();
    }
    match n {
        0 => Vec::new(),
        1 => vec![start_hz],
        _ => {
            let log_start = start_hz.log10();
            let log_stop = stop_hz.log10();
            let step = (log_stop - log_start) / (n as Scalar - 1.0);
            (0..n)
                .map(|i| match i {
                    0 => start_hz,
                    i if i == n - 1 => stop_hz,
                    i => 10f64.powf(log_start + step * i as Scalar),
                })
                .collect()
        }
    }
}

/// Applies `f` to each sample and collects results.
#[must_use]
pub fn sweep_map<I, F, T>(samples: I, f: F) -> Vec<T>
where
    I: IntoIterator<Item = Scalar>,
    F: FnMut(Scalar) -> T,
{
    samples.into_iter().map(f).collect()
}

fn plottable(h: Complex<Scalar>) -> bool {
    let magnitude = h.norm();
    magnitude > 0.0 && magnitude.is_finite() && h.arg().is_finite()
}

/// Gain `20 log10 |h|` in dB, or the -120 dB floor for zero or non-finite `h`.
#[must_use]
pub fn mag_db(h: Complex<Scalar>) -> Scalar {
    if plottable(h) {
        20.0 * h.norm().log10()
    } else {
        GAIN_FLOOR_DB
    }
}

/// Phase of `h` in degrees, or `0` wherever [`mag_db`] floors.
#[must_use]
pub fn phase_deg(h: Complex<Scalar>) -> Scalar {
    if plottable(h) {
        h.arg().to_degrees()
    } else {
        0.0
    }
}

/// Gain in dB and phase in degrees of a transfer ratio.
///
/// Zero or non-finite ratios map to `(-120 dB, 0°)`.
#[must_use]
pub fn bode(h: Complex<Scalar>) -> (Scalar, Scalar) {
    (mag_db(h), phase_deg(h))
}
