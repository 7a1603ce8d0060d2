//! Numerical fluxes at zone faces.
//!
//! The advective flux is the two-wave HLLE approximation ([`hlle`]); the
//! diffusive alpha-viscosity contribution is assembled from face-averaged
//! shear strains ([`viscous`]) and subtracted from the advective momentum
//! and energy components.

pub mod hlle;
pub mod viscous;

pub use hlle::hlle_flux;
pub use viscous::{shear_strain, viscous_face_correction, StrainTensor};
