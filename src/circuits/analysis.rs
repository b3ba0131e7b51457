use std::io::{self, Write};

use num_complex::Complex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::constants::{angular_frequency, SWEEP_POINTS};
use crate::errors::{FilterError, Result};
use crate::math::Scalar;
use crate::sweep::{bode, logspace_hz, sweep_map};

use super::network::RlcNetwork;
use super::twoport::transfer_function;

/// Input and output networks forming a series/shunt voltage divider.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TwoPortModel {
    /// Series network between source and output node.
    #[serde(default)]
    pub input: RlcNetwork,
    /// Shunt network from output node to ground.
    #[serde(default)]
    pub output: RlcNetwork,
}

/// Transfer ratio evaluated at one frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyPoint {
    /// Frequency in Hz.
    pub frequency: Scalar,
    /// Input network impedance.
    pub z1: Complex<Scalar>,
    /// Output network impedance.
    pub z2: Complex<Scalar>,
    /// Voltage transfer ratio.
    pub h: Complex<Scalar>,
}

/// Bode data for a frequency sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyResponse {
    /// Frequencies in Hz, ascending.
    pub frequencies: Vec<Scalar>,
    /// Gain in dB per frequency.
    pub gain_db: Vec<Scalar>,
    /// Phase in degrees per frequency.
    pub phase_deg: Vec<Scalar>,
}

impl FrequencyResponse {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True if the sweep holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

impl TwoPortModel {
    /// Creates a model from its two networks.
    #[must_use]
    pub fn new(input: RlcNetwork, output: RlcNetwork) -> Self {
        Self { input, output }
    }

    /// Evaluates both impedances and `H` at `frequency_hz`.
    #[must_use]
    pub fn evaluate(&self, frequency_hz: Scalar) -> FrequencyPoint {
        let omega = angular_frequency(frequency_hz);
        let z1 = self.input.impedance(omega);
        let z2 = self.output.impedance(omega);
        FrequencyPoint {
            frequency: frequency_hz,
            z1,
            z2,
            h: transfer_function(z1, z2),
        }
    }

    /// Transfer ratio at `frequency_hz`.
    #[must_use]
    pub fn transfer(&self, frequency_hz: Scalar) -> Complex<Scalar> {
        self.evaluate(frequency_hz).h
    }

    /// Samples `H` at `SWEEP_POINTS` log-spaced frequencies in [min_hz, max_hz].
    pub fn frequency_response(&self, min_hz: Scalar, max_hz: Scalar) -> Result<FrequencyResponse> {
        self.frequency_response_with(min_hz, max_hz, SWEEP_POINTS)
    }

    /// Like [`frequency_response`](Self::frequency_response) with an explicit point count.
    pub fn frequency_response_with(&self, min_hz: Scalar, max_hz: Scalar, points: usize) -> Result<FrequencyResponse> {
        validate_sweep(min_hz, max_hz)?;
        let _span = info_span!("frequency_response", min_hz, max_hz, points).entered();
        let frequencies = logspace_hz(min_hz, max_hz, points);
        let (gain_db, phase_deg): (Vec<Scalar>, Vec<Scalar>) =
            sweep_map(frequencies.iter().copied(), |f| bode(self.transfer(f)))
                .into_iter()
                .unzip();
        debug!(samples = frequencies.len(), "sweep finished");
        Ok(FrequencyResponse {
            frequencies,
            gain_db,
            phase_deg,
        })
    }
}

fn validate_sweep(min_hz: Scalar, max_hz: Scalar) -> Result<()> {
    if !(min_hz > 0.0 && min_hz.is_finite()) {
        return Err(FilterError::InvalidSweep(format!("lower bound must be positive, got {min_hz}")));
    }
    if !(max_hz > min_hz && max_hz.is_finite()) {
        return Err(FilterError::InvalidSweep(format!(
            "upper bound must exceed lower bound, got [{min_hz}, {max_hz}]"
        )));
    }
    Ok(())
}

/// Writes a `FrequencyResponse` as CSV.
pub fn write_frequency_response_csv<W: Write>(mut w: W, response: &FrequencyResponse) -> io::Result<()> {
    writeln!(w, "frequency,gain_db,phase_deg")?;
    for ((f, g), p) in response
        .frequencies
        .iter()
        .zip(&response.gain_db)
        .zip(&response.phase_deg)
    {
        writeln!(w, "{:.6e},{:.6},{:.6}", f, g, p)?;
    }
    Ok(())
}
