//! Source terms applied inside the zone update.
//!
//! Three families of sources act on the conserved state of a zone, in the
//! order the kernel applies them:
//! - [`buffer`]: relaxation toward a Keplerian reference state in an outer
//!   damping ring
//! - [`gravity`]: point-mass gravitational forces and mass sinks
//! - [`cooling`]: closed-form beta-cooling of the internal energy
//!
//! All sources are pure functions of the local state, the zone position,
//! and the timestep; they know nothing about the mesh iteration.

pub mod buffer;
pub mod cooling;
pub mod gravity;

pub use buffer::{BufferZone, KeplerianBuffer};
pub use gravity::{PointMass, SinkModel};
