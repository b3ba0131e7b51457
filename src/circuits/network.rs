use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::constants::{MICROFARAD, MILLIHENRY};
use crate::math::Scalar;

/// One switchable element of an [`RlcNetwork`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Branch {
    /// Whether the element is connected.
    #[serde(default)]
    pub enabled: bool,
    /// Element value in the network's front-end unit (Ω, mH or µF).
    #[serde(default)]
    pub value: Option<Scalar>,
}

impl Branch {
    /// Enabled branch with `value`.
    #[must_use]
    pub fn on(value: Scalar) -> Self {
        Self {
            enabled: true,
            value: Some(value),
        }
    }

    /// Disabled branch that remembers `value`.
    #[must_use]
    pub fn off(value: Scalar) -> Self {
        Self {
            enabled: false,
            value: Some(value),
        }
    }

    /// Value when the branch is enabled and strictly positive.
    #[must_use]
    pub fn active_value(&self) -> Option<Scalar> {
        self.value.filter(|v| self.enabled && *v > 0.0 && v.is_finite())
    }
}

/// Parallel combination of an optional resistor, inductor, capacitor and wire.
///
/// Inductance is given in millihenries and capacitance in microfarads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RlcNetwork {
    /// Resistance in ohms.
    #[serde(default)]
    pub resistance: Branch,
    /// Inductance in millihenries.
    #[serde(default)]
    pub inductance: Branch,
    /// Capacitance in microfarads.
    #[serde(default)]
    pub capacitance: Branch,
    /// Zero-ohm link across the network.
    #[serde(default)]
    pub wire: bool,
}

impl RlcNetwork {
    /// Network with only a resistor of `ohms`.
    #[must_use]
    pub fn resistor(ohms: Scalar) -> Self {
        Self {
            resistance: Branch::on(ohms),
            ..Self::default()
        }
    }

    /// Builder-style resistance setter.
    #[must_use]
    pub fn with_resistance(mut self, branch: Branch) -> Self {
        self.resistance = branch;
        self
    }

    /// Builder-style inductance setter (mH).
    #[must_use]
    pub fn with_inductance(mut self, branch: Branch) -> Self {
        self.inductance = branch;
        self
    }

    /// Builder-style capacitance setter (µF).
    #[must_use]
    pub fn with_capacitance(mut self, branch: Branch) -> Self {
        self.capacitance = branch;
        self
    }

    /// Builder-style wire toggle.
    #[must_use]
    pub fn with_wire(mut self, wire: bool) -> Self {
        self.wire = wire;
        self
    }

    /// Sum of the admittances of every active branch at `omega` (rad/s).
    ///
    /// Returns `None` when a branch is a short circuit (enabled wire, or an
    /// inductor at DC).
    #[must_use]
    pub fn admittance(&self, omega: Scalar) -> Option<Complex<Scalar>> {
        if self.wire {
            return None;
        }
        let mut total = Complex::<Scalar>::default();
        if let Some(r) = self.resistance.active_value() {
            total += Complex::new(1.0 / r, 0.0);
        }
        if let Some(l) = self.inductance.active_value() {
            let reactance = omega * l * MILLIHENRY;
            if reactance.abs() < Scalar::EPSILON {
                return None;
            }
            total += Complex::new(0.0, -1.0 / reactance);
        }
        if let Some(c) = self.capacitance.active_value() {
            total += Complex::new(0.0, omega * c * MICROFARAD);
        }
        Some(total)
    }

    /// Parallel impedance at `omega` (rad/s).
    ///
    /// No active branch gives an open circuit (`∞ + 0j`); a shorting branch gives
    /// `0 + 0j`.
    #[must_use]
    pub fn impedance(&self, omega: Scalar) -> Complex<Scalar> {
        match self.admittance(omega) {
            None => Complex::new(0.0, 0.0),
            Some(y) if y == Complex::new(0.0, 0.0) => Complex::new(Scalar::INFINITY, 0.0),
            // Plain 1/y underflows to NaN for very small |y|.
            Some(y) => y.finv(),
        }
    }

    /// True when no branch is active and the wire is off.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.wire
            && self.resistance.active_value().is_none()
            && self.inductance.active_value().is_none()
            && self.capacitance.active_value().is_none()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::constants::angular_frequency;

    #[test]
    fn single_resistor_is_real() {
        let z = RlcNetwork::resistor(100.0).impedance(angular_frequency(50.0));
        assert_relative_eq!(z.re, 100.0, max_relative = 1e-12);
        assert_relative_eq!(z.im, 0.0);
    }

    #[test]
    fn parallel_resistor_and_capacitor() {
        // 1 kΩ || 1 µF at 159.15 Hz: ωC = 1e-3 S, so Y = 1e-3 + 1e-3j.
        let omega = 1000.0;
        let net = RlcNetwork::resistor(1000.0).with_capacitance(Branch::on(1.0));
        let z = net.impedance(omega);
        assert_relative_eq!(z.re, 500.0, max_relative = 1e-9);
        assert_relative_eq!(z.im, -500.0, max_relative = 1e-9);
    }

    #[test]
    fn inductor_uses_millihenries() {
        let omega = 1000.0;
        let net = RlcNetwork::default().with_inductance(Branch::on(10.0));
        let z = net.impedance(omega);
        assert_relative_eq!(z.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(z.im, 10.0, max_relative = 1e-12);
    }

    #[test]
    fn disabled_and_zero_branches_are_ignored() {
        let net = RlcNetwork::default()
            .with_resistance(Branch::off(100.0))
            .with_capacitance(Branch::on(0.0))
            .with_inductance(Branch { enabled: true, value: None });
        assert!(net.is_open());
        let z = net.impedance(10.0);
        assert!(z.re.is_infinite());
        assert_eq!(z.im, 0.0);
    }

    #[test]
    fn wire_shorts_the_network() {
        let net = RlcNetwork::resistor(100.0).with_wire(true);
        assert_eq!(net.impedance(10.0), Complex::new(0.0, 0.0));
    }

    #[test]
    fn inductor_at_dc_is_a_short() {
        let net = RlcNetwork::resistor(100.0).with_inductance(Branch::on(1.0));
        assert_eq!(net.impedance(0.0), Complex::new(0.0, 0.0));
    }

    #[test]
    fn capacitor_alone_at_dc_is_open() {
        let net = RlcNetwork::default().with_capacitance(Branch::on(1.0));
        assert!(net.impedance(0.0).re.is_infinite());
    }

    #[test]
    fn finite_for_active_networks_above_dc() {
        let net = RlcNetwork::resistor(10.0)
            .with_inductance(Branch::on(5.0))
            .with_capacitance(Branch::on(2.0));
        for omega in [1e-3, 1.0, 1e3, 1e6] {
            let z = net.impedance(omega);
            assert!(z.re.is_finite() && z.im.is_finite());
        }
    }

    #[test]
    fn finite_for_extreme_component_values() {
        let omega = angular_frequency(50.0);
        let networks = [
            RlcNetwork::resistor(1e200),
            RlcNetwork::default().with_capacitance(Branch::on(1e-200)),
            RlcNetwork::default().with_inductance(Branch::on(1e200)),
            RlcNetwork::resistor(1e-200),
        ];
        for net in networks {
            let z = net.impedance(omega);
            assert!(z.re.is_finite() && z.im.is_finite(), "{net:?} gave {z}");
        }
        let z = RlcNetwork::resistor(1e200).impedance(omega);
        assert_relative_eq!(z.re, 1e200, max_relative = 1e-12);
        assert_eq!(z.im, 0.0);
    }
}
