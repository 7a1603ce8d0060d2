//! HLLE (Harten-Lax-van Leer-Einfeldt) approximate Riemann solver.
//!
//! The HLLE flux uses a two-wave approximation to the Riemann problem:
//!
//! ```text
//! F = (F_l a+ - F_r a- - (U_l - U_r) a+ a-) / (a+ - a-)
//! ```
//!
//! where `a-` and `a+` bound the outermost left- and right-going signal
//! speeds of both states, and both bounds include zero:
//!
//! ```text
//! a- = min(0, vl - c, vr - c),   a+ = max(0, vl + c, vr + c)
//! ```
//!
//! Including zero makes a one-sided supersonic face reduce exactly to the
//! pure upwind flux, and guarantees `a+ - a-` is positive whenever either
//! state carries a signal, so the division is safe. It is simpler than
//! solvers resolving the contact wave, more diffusive, and robust for
//! strong shocks.
//!
//! Reference: Toro, "Riemann Solvers and Numerical Methods for Fluid
//! Dynamics".

use crate::state::{Conserved, Direction, Primitive};

/// The HLLE flux through a face along the given axis, from the
/// face-reconstructed primitive states on either side.
///
/// Both states share one squared sound speed, evaluated by the caller at
/// the cell its face convention selects.
pub fn hlle_flux(pl: &Primitive, pr: &Primitive, cs2: f64, direction: Direction) -> Conserved {
    let ul = pl.to_conserved();
    let ur = pr.to_conserved();
    let fl = pl.flux(&ul, direction);
    let fr = pr.flux(&ur, direction);
    let (al_m, al_p) = pl.outer_wavespeeds(cs2, direction);
    let (ar_m, ar_p) = pr.outer_wavespeeds(cs2, direction);

    let am = f64::min(0.0, f64::min(al_m, ar_m));
    let ap = f64::max(0.0, f64::max(al_p, ar_p));

    let num = fl * ap - fr * am - (ul - ur) * (ap * am);
    Conserved {
        rho: num.rho / (ap - am),
        px: num.px / (ap - am),
        py: num.py / (ap - am),
        en: num.en / (ap - am),
    }
}
