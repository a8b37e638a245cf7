//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration and the two pipeline preconditions: line-only input and a
//! non-empty species list for every required plant type.
use thiserror::Error;

use crate::species::PlantType;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("feature {feature} is not a line geometry (found {found})")]
    NotLineGeometry { feature: usize, found: String },

    #[error("no {plant_type} species in catalog, but the policy requires at least one")]
    EmptySpeciesList { plant_type: PlantType },
}
