//! # fv-rs
//!
//! A second-order Godunov finite-volume library for 2D accretion-disk
//! hydrodynamics.
//!
//! This crate provides the per-zone numerical update for a compressible
//! Euler solver on a uniform cartesian patch, together with the small data
//! model it operates on:
//! - Piecewise-linear (PLM) reconstruction with a generalized-minmod limiter
//! - HLLE approximate Riemann fluxes
//! - Alpha-viscosity shear stress at zone faces
//! - Gravitating point masses with selectable sink models
//! - A Keplerian buffer (wave-damping) ring
//! - Closed-form beta-cooling
//! - One zone kernel dispatched over serial, thread-parallel, and
//!   device-parallel backends
//!
//! The crate is deliberately a *core*: time-step control, guard-zone
//! exchange, and all I/O belong to the driver. Every public operation is a
//! pure function of its inputs except for the single output array it fills.
//!
//! # Example
//!
//! ```
//! use fv_rs::{
//!     compute_conserved_euler_2d, compute_rk_substage_euler_2d, AdvanceConfig,
//!     EquationOfState, ExecutionMode, StructuredMesh, NCONS, NUM_GUARD,
//! };
//!
//! let mesh = StructuredMesh::square(1.0, 16);
//! let prim_len = (mesh.ni() + 2 * NUM_GUARD) * (mesh.nj() + 2 * NUM_GUARD) * NCONS;
//!
//! // A uniform fluid at rest is a fixed point of the update.
//! let mut p = vec![0.0; prim_len];
//! for zone in p.chunks_mut(NCONS) {
//!     zone.copy_from_slice(&[1.0, 0.0, 0.0, 1.0]);
//! }
//! let mut u_rk = vec![0.0; mesh.total_zones() * NCONS];
//! compute_conserved_euler_2d(&mesh, &p, &mut u_rk, ExecutionMode::Serial);
//! let mut p_out = vec![0.0; prim_len];
//!
//! let config = AdvanceConfig::new(EquationOfState::GammaLaw).with_dt(1e-3);
//! compute_rk_substage_euler_2d(&mesh, &u_rk, &p, &mut p_out, &config, ExecutionMode::Serial);
//! ```

pub mod eos;
pub mod error;
pub mod flux;
pub mod limiter;
pub mod mesh;
pub mod patch;
pub mod solver;
pub mod source;
pub mod state;

pub use crate::eos::EquationOfState;
pub use crate::error::Error;
pub use crate::limiter::{plm_gradient, PLM_THETA};
pub use crate::mesh::StructuredMesh;
pub use crate::patch::{Patch, PatchMut, NUM_GUARD};
pub use crate::solver::{
    compute_conserved_euler_2d, compute_max_wavespeed_euler_2d, compute_rk_substage_euler_2d,
    AdvanceConfig, ExecutionMode,
};
pub use crate::source::{BufferZone, KeplerianBuffer, PointMass, SinkModel};
pub use crate::state::{Conserved, Direction, Primitive, GAMMA_LAW_INDEX, NCONS};

/// Returns whether the crate was compiled with the rayon thread pool,
/// `feature = "parallel"`.
pub fn compiled_with_parallel() -> bool {
    cfg!(feature = "parallel")
}

/// Returns whether the crate was compiled with the wgpu compute backend,
/// `feature = "gpu"`.
pub fn compiled_with_gpu() -> bool {
    cfg!(feature = "gpu")
}
