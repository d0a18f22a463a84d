use nalgebra::Matrix2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::fmt;
use std::str::FromStr;

use crate::error::QuantumError;

pub type Amplitude = Complex<f64>;
pub type Unitary = Matrix2<Amplitude>;

/// Single-object effect on a 2-level quantum object.
///
/// `fraction` is the exponent t of the corresponding Pauli gate (P^t), so
/// `fraction = 1.0` is the full gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Flip { fraction: f64 },
    Superposition,
    Phase { fraction: f64 },
    FlipPhase { fraction: f64 },
}

impl Effect {
    pub fn flip() -> Self {
        Effect::Flip { fraction: 1.0 }
    }

    pub fn superposition() -> Self {
        Effect::Superposition
    }

    pub fn phase() -> Self {
        Effect::Phase { fraction: 1.0 }
    }

    pub fn flip_phase(fraction: f64) -> Self {
        Effect::FlipPhase { fraction }
    }

    /// Rotation used by the RotY gate: moves EMPTY to a 1/3 : 2/3 split.
    pub fn third_rotation() -> Self {
        Effect::FlipPhase {
            fraction: -2.0 * (1.0 / 3.0_f64.sqrt()).acos() / PI,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Effect::Flip { .. } => "Flip",
            Effect::Superposition => "Superposition",
            Effect::Phase { .. } => "Phase",
            Effect::FlipPhase { .. } => "FlipPhase",
        }
    }

    /// Унитарная матрица эффекта (базис: EMPTY, FULL)
    pub fn unitary(&self) -> Unitary {
        let zero = Amplitude::new(0.0, 0.0);
        let one = Amplitude::new(1.0, 0.0);
        let i = Amplitude::new(0.0, 1.0);
        match *self {
            Effect::Flip { fraction } => pauli_power(Matrix2::new(zero, one, one, zero), fraction),
            Effect::Superposition => {
                let h = Amplitude::new(FRAC_1_SQRT_2, 0.0);
                Matrix2::new(h, h, h, -h)
            }
            Effect::Phase { fraction } => pauli_power(Matrix2::new(one, zero, zero, -one), fraction),
            Effect::FlipPhase { fraction } => pauli_power(Matrix2::new(zero, -i, i, zero), fraction),
        }
    }
}

/// P^t = e^{iπt/2} (cos(πt/2) I - i sin(πt/2) P), the eigen-gate power of a Pauli matrix.
/// The global phase is kept so controlled versions get the right relative phase.
fn pauli_power(pauli: Unitary, t: f64) -> Unitary {
    let half = PI * t / 2.0;
    let (sin, cos) = (snap(half.sin()), snap(half.cos()));
    let global = Amplitude::new(cos, sin);
    let identity = Unitary::identity();
    (identity * Amplitude::new(cos, 0.0) + pauli * Amplitude::new(0.0, -sin)) * global
}

// Integer powers must stay exact, otherwise "fully EMPTY" checks drift.
fn snap(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        0.0
    } else {
        x
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Effect::Superposition => write!(f, "Superposition"),
            Effect::Flip { fraction } | Effect::Phase { fraction } | Effect::FlipPhase { fraction } => {
                if fraction == 1.0 {
                    write!(f, "{}", self.name())
                } else {
                    write!(f, "{}(effect_fraction={})", self.name(), fraction)
                }
            }
        }
    }
}

impl FromStr for Effect {
    type Err = QuantumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Flip" => Ok(Effect::flip()),
            "Superposition" => Ok(Effect::superposition()),
            "Phase" => Ok(Effect::phase()),
            "FlipPhase" => Ok(Effect::flip_phase(1.0)),
            other => Err(QuantumError::UnknownEffect(other.to_string())),
        }
    }
}
