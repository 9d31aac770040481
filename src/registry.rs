//! Recipe registry and raw extraction rates
//!
//! Both tables are assembled once at startup and are read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CalcError, Result};
use crate::models::{Recipe, ResourceId};

/// Collects recipes and raw resource declarations, rejecting duplicates.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    recipes: BTreeMap<ResourceId, Recipe>,
    raw: BTreeSet<ResourceId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a terminal resource (one with no recipe).
    pub fn raw(&mut self, id: impl Into<ResourceId>) -> Result<&mut Self> {
        let id = id.into();
        if self.recipes.contains_key(&id) {
            return Err(CalcError::RawResourceHasRecipe(id));
        }
        if !self.raw.insert(id.clone()) {
            return Err(CalcError::DuplicateRawResource(id));
        }
        Ok(self)
    }

    pub fn recipe(&mut self, recipe: Recipe) -> Result<&mut Self> {
        if self.raw.contains(&recipe.output) {
            return Err(CalcError::RawResourceHasRecipe(recipe.output));
        }
        if self.recipes.contains_key(&recipe.output) {
            return Err(CalcError::DuplicateRecipe(recipe.output));
        }
        self.recipes.insert(recipe.output.clone(), recipe);
        Ok(self)
    }

    pub fn build(self) -> RecipeRegistry {
        RecipeRegistry {
            recipes: self.recipes,
            raw: self.raw,
        }
    }
}

/// Immutable lookup of recipes by output and of declared raw resources.
#[derive(Debug, Clone, Default)]
pub struct RecipeRegistry {
    recipes: BTreeMap<ResourceId, Recipe>,
    raw: BTreeSet<ResourceId>,
}

impl RecipeRegistry {
    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    pub fn is_raw(&self, id: &str) -> bool {
        self.raw.contains(id)
    }

    /// Recipes in identifier order.
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    pub fn raw_resources(&self) -> impl Iterator<Item = &ResourceId> {
        self.raw.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Units of each raw resource suppliable per minute.
///
/// A rate of 0 marks a resource that never limits production.
#[derive(Debug, Clone, Default)]
pub struct RawRates {
    rates: BTreeMap<ResourceId, f64>,
}

impl RawRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<ResourceId>, per_minute: f64) -> Result<()> {
        let id = id.into();
        if !(per_minute.is_finite() && per_minute >= 0.0) {
            return Err(CalcError::InvalidRawRate {
                id,
                rate: per_minute,
            });
        }
        if self.rates.contains_key(&id) {
            return Err(CalcError::DuplicateRawResource(id));
        }
        self.rates.insert(id, per_minute);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.rates.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, f64)> {
        self.rates.iter().map(|(id, rate)| (id, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
