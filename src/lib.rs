//! Production chain planner
//!
//! Flattens recipe graphs down to raw resources, sizes facility counts
//! against fixed extraction rates and rounds counts to 3-smooth layouts.

pub mod calculator;
pub mod error;
pub mod extract;
pub mod models;
pub mod registry;
pub mod resolver;
pub mod rounding;
pub mod sample;

pub use calculator::{BuildingCount, PlanSummary, TargetSizing, ThroughputCalculator};
pub use error::CalcError;
pub use models::{FlattenedVector, Recipe, ResourceId};
pub use registry::{RawRates, RecipeRegistry, RegistryBuilder};
pub use resolver::Resolver;
pub use rounding::SmoothRounder;
