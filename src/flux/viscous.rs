//! Shear strain and alpha-viscosity face fluxes.
//!
//! The traceless strain tensor of the 2D velocity field, evaluated from
//! per-zone PLM gradients `g` (which carry one-zone differences, hence the
//! division by the spacings):
//!
//! ```text
//! s_xx =  4/3 gx.vx / dx - 2/3 gy.vy / dy
//! s_yy = -2/3 gx.vx / dx + 4/3 gy.vy / dy
//! s_xy =  s_yx = gx.vy / dx + gy.vx / dy
//! ```
//!
//! The viscous stress `tau = nu rho s` is averaged between the two zones
//! adjoining a face and subtracted from the momentum components of the
//! advective flux; the energy flux carries the work term `v . tau` with
//! each zone contributing its own velocity.

use crate::state::{Conserved, Direction, Primitive};

/// The symmetric traceless strain tensor of a zone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrainTensor {
    /// xx component
    pub xx: f64,
    /// xy component
    pub xy: f64,
    /// yx component (equal to xy)
    pub yx: f64,
    /// yy component
    pub yy: f64,
}

/// The strain tensor of a zone from its directional PLM gradients.
#[inline]
pub fn shear_strain(gx: &Primitive, gy: &Primitive, dx: f64, dy: f64) -> StrainTensor {
    let sxx = 4.0 / 3.0 * gx.vx / dx - 2.0 / 3.0 * gy.vy / dy;
    let syy = -2.0 / 3.0 * gx.vx / dx + 4.0 / 3.0 * gy.vy / dy;
    let sxy = gx.vy / dx + gy.vx / dy;
    StrainTensor {
        xx: sxx,
        xy: sxy,
        yx: sxy,
        yy: syy,
    }
}

/// The viscous contribution to the face flux between two zones, to be
/// subtracted from the advective flux.
///
/// `left` and `right` are the (primitive, strain) pairs of the zones on
/// either side of the face; `nu` is the kinematic viscosity, taken from
/// the *central* zone of the update for all four of its faces (a
/// documented approximation of this scheme).
#[inline]
pub fn viscous_face_correction(
    nu: f64,
    left: (&Primitive, &StrainTensor),
    right: (&Primitive, &StrainTensor),
    direction: Direction,
) -> Conserved {
    let (pl, sl) = left;
    let (pr, sr) = right;
    let (sl_n, sl_t, sr_n, sr_t) = match direction {
        Direction::X => (sl.xx, sl.xy, sr.xx, sr.xy),
        Direction::Y => (sl.yx, sl.yy, sr.yx, sr.yy),
    };
    Conserved {
        rho: 0.0,
        px: 0.5 * nu * (pl.rho * sl_n + pr.rho * sr_n),
        py: 0.5 * nu * (pl.rho * sl_t + pr.rho * sr_t),
        en: 0.5 * nu * (pl.rho * sl_n * pl.vx + pr.rho * sr_n * pr.vx)
            + 0.5 * nu * (pl.rho * sl_t * pl.vy + pr.rho * sr_t * pr.vy),
    }
}
