//! Optically-thin (beta) cooling.
//!
//! The internal energy loses heat at the rate `d eps/dt = -C eps^4 /
//! rho^2`, which has the closed-form solution
//!
//! ```text
//! eps(t + dt) = eps * (1 + 3 C dt eps^3 / rho^2)^(-1/3)
//! ```
//!
//! with `eps = p / (gamma - 1)`. Because the update is the exact integral
//! of the rate equation, it keeps the internal energy positive and is
//! stable for any non-negative `dt`; no subcycling is ever needed. The
//! zone's total energy is decremented by `rho * (eps' - eps)`.

use crate::state::{Conserved, Primitive, GAMMA_LAW_INDEX};

/// Applies the cooling decrement over `dt` to the conserved state, given
/// the zone's primitive state.
#[inline]
pub fn cooling_term(cooling_coefficient: f64, dt: f64, prim: &Primitive, cons: &mut Conserved) {
    let sigma = prim.rho;
    let eps = prim.p / (GAMMA_LAW_INDEX - 1.0);
    let eps_cooled = eps
        * (1.0 + 3.0 * cooling_coefficient / sigma.powi(2) * eps.powi(3) * dt).powf(-1.0 / 3.0);

    cons.en += sigma * (eps_cooled - eps);
}
