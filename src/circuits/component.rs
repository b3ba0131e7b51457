use std::fmt;
use std::str::FromStr;

use crate::errors::FilterError;
use crate::math::Scalar;

/// Leaf element kinds a filter block can hold.
///
/// The declaration order is the order components are listed, numbered and drawn
/// within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    /// Capacitor (`C`).
    Capacitor,
    /// Inductor (`L`).
    Inductor,
    /// Resistor (`R`).
    Resistor,
    /// Ground reference (`G`).
    Ground,
}

impl ComponentKind {
    /// All kinds in listing order.
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Capacitor,
        ComponentKind::Inductor,
        ComponentKind::Resistor,
        ComponentKind::Ground,
    ];

    /// Single-letter tag used in netlists.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Capacitor => 'C',
            Self::Inductor => 'L',
            Self::Resistor => 'R',
            Self::Ground => 'G',
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Capacitor => "Capacitor",
            Self::Inductor => "Inductor",
            Self::Resistor => "Resistor",
            Self::Ground => "Ground",
        }
    }

    /// Units accepted for this kind, smallest first.
    #[must_use]
    pub fn units(self) -> &'static [Unit] {
        match self {
            Self::Capacitor => &[Unit::Picofarad, Unit::Nanofarad, Unit::Microfarad, Unit::Millifarad],
            Self::Inductor => &[Unit::Nanohenry, Unit::Microhenry, Unit::Millihenry, Unit::Henry],
            Self::Resistor => &[Unit::Ohm, Unit::Kiloohm, Unit::Megaohm],
            Self::Ground => &[Unit::Dimensionless],
        }
    }

    /// True for kinds that occupy a branch between two nodes.
    #[must_use]
    pub fn is_branch(self) -> bool {
        !matches!(self, Self::Ground)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "capacitor" => Ok(Self::Capacitor),
            "l" | "inductor" => Ok(Self::Inductor),
            "r" | "resistor" => Ok(Self::Resistor),
            "g" | "ground" | "gnd" => Ok(Self::Ground),
            _ => Err(FilterError::InvalidComponentKind(s.to_string())),
        }
    }
}

/// Unit tag attached to a component value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// pF
    Picofarad,
    /// nF
    Nanofarad,
    /// µF
    Microfarad,
    /// mF
    Millifarad,
    /// nH
    Nanohenry,
    /// µH
    Microhenry,
    /// mH
    Millihenry,
    /// H
    Henry,
    /// Ω
    Ohm,
    /// kΩ
    Kiloohm,
    /// MΩ
    Megaohm,
    /// Sentinel unit carried by ground references.
    Dimensionless,
}

impl Unit {
    /// Display symbol written into netlists.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Picofarad => "pF",
            Self::Nanofarad => "nF",
            Self::Microfarad => "µF",
            Self::Millifarad => "mF",
            Self::Nanohenry => "nH",
            Self::Microhenry => "µH",
            Self::Millihenry => "mH",
            Self::Henry => "H",
            Self::Ohm => "Ω",
            Self::Kiloohm => "kΩ",
            Self::Megaohm => "MΩ",
            Self::Dimensionless => "-",
        }
    }

    /// Factor converting a value in this unit to its SI base unit.
    #[must_use]
    pub fn multiplier(self) -> Scalar {
        match self {
            Self::Picofarad => 1e-12,
            Self::Nanofarad | Self::Nanohenry => 1e-9,
            Self::Microfarad | Self::Microhenry => 1e-6,
            Self::Millifarad | Self::Millihenry => 1e-3,
            Self::Henry | Self::Ohm | Self::Dimensionless => 1.0,
            Self::Kiloohm => 1e3,
            Self::Megaohm => 1e6,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = String;

    /// Accepts the display symbols plus ASCII spellings (`uF`, `ohm`, `kohm`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim() {
            "pF" => Self::Picofarad,
            "nF" => Self::Nanofarad,
            "µF" | "μF" | "uF" => Self::Microfarad,
            "mF" => Self::Millifarad,
            "nH" => Self::Nanohenry,
            "µH" | "μH" | "uH" => Self::Microhenry,
            "mH" => Self::Millihenry,
            "H" => Self::Henry,
            "Ω" | "ohm" | "Ohm" => Self::Ohm,
            "kΩ" | "kohm" | "kOhm" => Self::Kiloohm,
            "MΩ" | "Mohm" | "MOhm" => Self::Megaohm,
            "-" | "" => Self::Dimensionless,
            other => return Err(other.to_string()),
        };
        Ok(unit)
    }
}

/// A leaf circuit element owned by a filter block.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    kind: ComponentKind,
    value: Scalar,
    unit: Unit,
    pub(crate) node1: usize,
    pub(crate) node2: usize,
}

impl Component {
    /// Creates a component after checking the value and unit against `kind`.
    pub fn new(kind: ComponentKind, value: Scalar, unit: Unit) -> Result<Self, FilterError> {
        if !value.is_finite() || value < 0.0 {
            return Err(FilterError::InvalidValue(value));
        }
        if !kind.units().contains(&unit) {
            return Err(FilterError::InvalidUnit {
                kind,
                unit: unit.symbol().to_string(),
            });
        }
        Ok(Self {
            kind,
            value,
            unit,
            node1: 0,
            node2: 0,
        })
    }

    /// Ground reference (value 0, unit `-`).
    #[must_use]
    pub fn ground() -> Self {
        Self {
            kind: ComponentKind::Ground,
            value: 0.0,
            unit: Unit::Dimensionless,
            node1: 0,
            node2: 0,
        }
    }

    /// Component kind.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Value in the component's own unit.
    #[must_use]
    pub fn value(&self) -> Scalar {
        self.value
    }

    /// Unit tag.
    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Value converted to the SI base unit (F, H or Ω).
    #[must_use]
    pub fn base_value(&self) -> Scalar {
        self.value * self.unit.multiplier()
    }

    /// Entry node assigned by the last netlist compilation.
    #[must_use]
    pub fn node1(&self) -> usize {
        self.node1
    }

    /// Exit node assigned by the last netlist compilation.
    #[must_use]
    pub fn node2(&self) -> usize {
        self.node2
    }

    /// Text shown in block listings and diagrams.
    #[must_use]
    pub fn label(&self) -> String {
        match self.kind {
            ComponentKind::Ground => String::from("Ground"),
            kind => format!("{}: {} {}", kind.letter(), format_value(self.value), self.unit),
        }
    }

    /// Schematic glyph.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self.kind {
            ComponentKind::Capacitor => "C",
            ComponentKind::Inductor => "L",
            ComponentKind::Resistor => "R",
            ComponentKind::Ground => "⏚",
        }
    }
}

/// Formats a value so integral numbers keep one decimal (`100.0`) and others
/// use the shortest round-trip form (`4.7`, `0.001`).
///
/// Magnitudes below `1e-4` or from `1e16` up switch to exponent form with a
/// signed two-digit exponent (`1e-05`, `2.5e+16`).
#[must_use]
pub fn format_value(value: Scalar) -> String {
    let magnitude = value.abs();
    if value != 0.0 && value.is_finite() && !(1e-4..1e16).contains(&magnitude) {
        let text = format!("{value:e}");
        return match text.split_once('e') {
            Some((mantissa, exponent)) => match exponent.parse::<i32>() {
                Ok(exp) => {
                    let sign = if exp < 0 { '-' } else { '+' };
                    format!("{mantissa}e{sign}{:02}", exp.abs())
                }
                Err(_) => text,
            },
            None => text,
        };
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
