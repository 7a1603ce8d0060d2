//! Point-mass gravity and accretion sinks.
//!
//! Each gravitating point mass pulls on the gas with a Plummer-softened
//! force and, if its sink is active, removes mass from its immediate
//! neighborhood at a rate with a steep quartic taper:
//!
//! ```text
//! F = -rho m (dx, dy) / ((r^2 + rs^2) r)
//! sink = sink_rate * exp(-(r / rs)^4)      for r < 4 rs, else 0
//! ```
//!
//! The softening and sink length `rs = h/2` follows the local disk
//! height, not a per-mass constant. What the sink does to the momentum
//! and energy of the gas is selected by the [`SinkModel`].
//!
//! The gravitational denominator is Plummer-softened with `rs`; the
//! disk-height denominator instead carries a tiny fixed regularization.
//! The two cutoffs are distinct.

use std::str::FromStr;

use crate::error::Error;
use crate::state::{Conserved, Primitive, GAMMA_LAW_INDEX};

/// How an accreting point mass exchanges momentum with the gas it
/// swallows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkModel {
    /// Mass and momentum leave together, so the gas velocity is unchanged
    AccelerationFree,
    /// Only the radial part of the relative momentum leaves, so the sink
    /// exerts no torque about the mass
    TorqueFree,
    /// Mass leaves but momentum stays
    ForceFree,
    /// The sink neither removes mass nor exerts drag
    #[default]
    Inactive,
}

impl FromStr for SinkModel {
    type Err = Error;

    /// Parse a sink-model name. Matching is case-insensitive on the
    /// hyphenated variant names.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "acceleration-free" => Ok(Self::AccelerationFree),
            "torque-free" => Ok(Self::TorqueFree),
            "force-free" => Ok(Self::ForceFree),
            "inactive" => Ok(Self::Inactive),
            _ => Err(Error::UnrecognizedName {
                kind: "sink model",
                value: name.to_owned(),
            }),
        }
    }
}

/// A gravitating point mass, immutable over a substage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointMass {
    /// Position `(x, y)` of the mass
    pub position: (f64, f64),
    /// Velocity `(vx, vy)` of the mass
    pub velocity: (f64, f64),
    /// Gravitating mass
    pub mass: f64,
    /// Peak sink rate
    pub sink_rate: f64,
    /// Potential softening length, read by the locally-isothermal
    /// equation of state (the Euler source terms soften with the disk
    /// height instead)
    pub softening_radius: f64,
    /// Sink momentum model
    pub sink_model: SinkModel,
}

/// The softened Newtonian potential of the mass list at `(x, y)`, each
/// mass softened by its own radius.
#[inline]
pub fn gravitational_potential(masses: &[PointMass], x: f64, y: f64) -> f64 {
    let mut phi = 0.0;
    for mass in masses {
        let dx = x - mass.position.0;
        let dy = y - mass.position.1;
        let r2_soft = dx * dx + dy * dy + mass.softening_radius * mass.softening_radius;
        phi -= mass.mass / r2_soft.sqrt();
    }
    phi
}

/// The local disk scale height,
/// `h = sqrt(p / rho) / sqrt(sum_p m_p / r_p^3)`.
///
/// The radius in the orbital-frequency sum carries a fixed `1e-12`
/// regularization so the expression stays finite on top of a point mass.
#[inline]
pub fn disk_height(masses: &[PointMass], x: f64, y: f64, prim: &Primitive) -> f64 {
    let mut omega_tilde2 = 0.0;
    for mass in masses {
        let dx = x - mass.position.0;
        let dy = y - mass.position.1;
        let r2 = dx * dx + dy * dy + 1e-12;
        omega_tilde2 += mass.mass / r2 / r2.sqrt();
    }
    (prim.p / prim.rho).sqrt() / omega_tilde2.sqrt()
}

/// The conserved-state delta contributed by a single point mass over `dt`,
/// for the gas state `prim` at position `(x, y)` and disk height `h`.
pub fn point_mass_source_term(
    mass: &PointMass,
    x: f64,
    y: f64,
    dt: f64,
    prim: &Primitive,
    h: f64,
) -> Conserved {
    let sigma = prim.rho;
    let eps = prim.p / (GAMMA_LAW_INDEX - 1.0) / sigma;

    let dx = x - mass.position.0;
    let dy = y - mass.position.1;
    let r2 = dx * dx + dy * dy;
    let rs = 0.5 * h;
    let r2_soft = r2 + rs * rs;
    let dr = r2.sqrt();
    let mag = sigma * mass.mass / r2_soft;
    let fx = -mag * dx / dr;
    let fy = -mag * dy / dr;

    let sink_rate = if dr < 4.0 * rs {
        mass.sink_rate * (-(dr / rs).powi(4)).exp()
    } else {
        0.0
    };
    let mdot = -sigma * sink_rate;

    match mass.sink_model {
        SinkModel::AccelerationFree => Conserved {
            rho: dt * mdot,
            px: dt * mdot * prim.vx + dt * fx,
            py: dt * mdot * prim.vy + dt * fy,
            en: dt * (mdot * eps + 0.5 * mdot * (prim.vx * prim.vx + prim.vy * prim.vy))
                + dt * (fx * prim.vx + fy * prim.vy),
        },
        SinkModel::TorqueFree => {
            // Project the gas velocity, in the frame of the mass, onto the
            // radial direction; the sink swallows that component only.
            let (vx0, vy0) = mass.velocity;
            let rhat_x = dx / dr;
            let rhat_y = dy / dr;
            let dv_dot_rhat = (prim.vx - vx0) * rhat_x + (prim.vy - vy0) * rhat_y;
            let vx_star = dv_dot_rhat * rhat_x + vx0;
            let vy_star = dv_dot_rhat * rhat_y + vy0;
            Conserved {
                rho: dt * mdot,
                px: dt * mdot * vx_star + dt * fx,
                py: dt * mdot * vy_star + dt * fy,
                en: dt * (mdot * eps + 0.5 * mdot * (vx_star * vx_star + vy_star * vy_star))
                    + dt * (fx * prim.vx + fy * prim.vy),
            }
        }
        SinkModel::ForceFree => Conserved {
            rho: dt * mdot,
            px: dt * fx,
            py: dt * fy,
            en: dt * (fx * prim.vx + fy * prim.vy),
        },
        SinkModel::Inactive => Conserved::default(),
    }
}

/// Accumulates the source-term deltas of the whole mass list onto `cons`.
pub fn point_masses_source_term(
    masses: &[PointMass],
    x: f64,
    y: f64,
    dt: f64,
    prim: &Primitive,
    h: f64,
    cons: &mut Conserved,
) {
    for mass in masses {
        *cons = *cons + point_mass_source_term(mass, x, y, dt, prim, h);
    }
}
