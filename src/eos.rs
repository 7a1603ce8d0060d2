//! Equations of state.
//!
//! The solver needs one thing from the equation of state: the squared
//! sound speed at a zone. Three closures of the Euler system are
//! supported:
//!
//! - `GammaLaw`: `cs^2 = gamma p / rho`, with the pressure taken from the
//!   primitive state and `gamma` the fixed law constant. This is the
//!   closure of the energy-carrying solver in this crate.
//! - `Isothermal`: a globally constant `cs^2`.
//! - `LocallyIsothermal`: `cs^2 = -phi(x, y) / mach^2`, where `phi` is the
//!   softened Newtonian potential of the current point-mass list. The
//!   temperature then tracks the local orbital velocity at a fixed Mach
//!   number, as in vertically-averaged thin-disk models.
//!
//! The isothermal flavors parameterize a pressure-less 2D variant of the
//! scheme; they are accepted here through the same record so that a driver
//! can carry one equation-of-state description for either solver.

use crate::source::gravity::gravitational_potential;
use crate::source::PointMass;
use crate::state::{Primitive, GAMMA_LAW_INDEX};

/// A closed description of the equation of state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EquationOfState {
    /// Ideal-gas closure with the crate-wide adiabatic index
    GammaLaw,
    /// Globally constant sound speed
    Isothermal {
        /// The squared sound speed
        sound_speed_squared: f64,
    },
    /// Sound speed tied to the local gravitational potential
    LocallyIsothermal {
        /// The squared orbital Mach number
        mach_number_squared: f64,
    },
}

impl EquationOfState {
    /// The squared sound speed at position `(x, y)` for the given
    /// primitive state.
    ///
    /// Only the `LocallyIsothermal` variant reads the position and the
    /// mass list; `GammaLaw` reads only the primitive state.
    #[inline]
    pub fn sound_speed_squared(
        &self,
        prim: &Primitive,
        masses: &[PointMass],
        x: f64,
        y: f64,
    ) -> f64 {
        match self {
            EquationOfState::GammaLaw => GAMMA_LAW_INDEX * prim.p / prim.rho,
            EquationOfState::Isothermal {
                sound_speed_squared,
            } => *sound_speed_squared,
            EquationOfState::LocallyIsothermal {
                mach_number_squared,
            } => -gravitational_potential(masses, x, y) / mach_number_squared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{PointMass, SinkModel};

    #[test]
    fn test_gamma_law_sound_speed() {
        let p = Primitive::new(2.0, 0.0, 0.0, 3.0);
        let eos = EquationOfState::GammaLaw;
        let cs2 = eos.sound_speed_squared(&p, &[], 0.0, 0.0);
        assert!((cs2 - GAMMA_LAW_INDEX * 1.5).abs() < 1e-14);
    }

    #[test]
    fn test_isothermal_ignores_state() {
        let eos = EquationOfState::Isothermal {
            sound_speed_squared: 0.25,
        };
        let p = Primitive::new(7.0, 1.0, -1.0, 42.0);
        assert_eq!(eos.sound_speed_squared(&p, &[], 3.0, -2.0), 0.25);
    }

    #[test]
    fn test_locally_isothermal_tracks_potential() {
        let mass = PointMass {
            mass: 1.0,
            sink_model: SinkModel::Inactive,
            ..PointMass::default()
        };
        let eos = EquationOfState::LocallyIsothermal {
            mach_number_squared: 100.0,
        };
        let p = Primitive::new(1.0, 0.0, 0.0, 1.0);
        // phi = -1/2 at r = 2, so cs^2 = (1/2) / 100.
        let cs2 = eos.sound_speed_squared(&p, &[mass], 2.0, 0.0);
        assert!((cs2 - 0.005).abs() < 1e-15);
    }
}
