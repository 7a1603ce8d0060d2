//! Error types for driver-facing operations.
//!
//! The numerical kernel itself never returns errors: non-physical states
//! are repaired in place by floors and ceilings (see
//! [`Conserved::to_primitive`](crate::Conserved::to_primitive)). The
//! variants here cover the configuration boundary around the kernel,
//! where a driver parses enum descriptions or brings up a compute device.

use thiserror::Error;

/// Errors produced at the configuration boundary of the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A string description did not name any variant of the given kind.
    #[error("'{value}' is not a recognized {kind}")]
    UnrecognizedName {
        /// What was being parsed ("sink model", "execution mode", ...)
        kind: &'static str,
        /// The string that failed to parse
        value: String,
    },

    /// The device-parallel backend could not be initialized.
    #[cfg(feature = "gpu")]
    #[error("gpu device error: {0}")]
    Device(String),
}
