//! Error types for recipe registration and chain resolution

use thiserror::Error;

use crate::models::ResourceId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("recipe '{0}' lists its own output as an input")]
    SelfReferentialRecipe(ResourceId),

    #[error("recipe '{0}' is defined more than once")]
    DuplicateRecipe(ResourceId),

    #[error("raw resource '{0}' is declared more than once")]
    DuplicateRawResource(ResourceId),

    #[error("'{0}' is declared as a raw resource but also has a recipe")]
    RawResourceHasRecipe(ResourceId),

    #[error("invalid recipe '{id}': {reason}")]
    InvalidRecipe { id: ResourceId, reason: String },

    #[error("invalid extraction rate for '{id}': {rate}")]
    InvalidRawRate { id: ResourceId, rate: f64 },

    #[error("cyclic dependency: {}", format_chain(.chain))]
    CyclicDependency { chain: Vec<ResourceId> },

    #[error("unknown resource '{0}' (neither a recipe nor a raw resource)")]
    UnknownResource(ResourceId),

    #[error("'{0}' is a raw resource and has no recipe to size")]
    NotARecipe(ResourceId),

    #[error("target rate must be positive, got {0}")]
    InvalidTargetRate(f64),

    #[error("no extraction rate for raw resource '{resource}' (needed by '{recipe}')")]
    MissingRawRate {
        recipe: ResourceId,
        resource: ResourceId,
    },

    #[error("{value} is outside the supported rounding range (max {ceiling})")]
    OutOfRange { value: f64, ceiling: u64 },
}

fn format_chain(chain: &[ResourceId]) -> String {
    chain
        .iter()
        .map(ResourceId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, CalcError>;
