//! Flattening of recipe input graphs down to raw resources

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::{CalcError, Result};
use crate::models::{round_amount, FlattenedVector, Recipe, ResourceId};
use crate::registry::RecipeRegistry;

/// Resolves recipes into per-unit raw resource vectors.
///
/// Each recipe's vector is computed on first request and cached for the
/// lifetime of the resolver. The resolver is `Sync`; concurrent first
/// requests for the same recipe may both compute, but only the first
/// result is published and every caller receives that one.
pub struct Resolver<'r> {
    registry: &'r RecipeRegistry,
    cache: HashMap<ResourceId, OnceLock<Arc<FlattenedVector>>>,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r RecipeRegistry) -> Self {
        let cache = registry
            .recipes()
            .map(|recipe| (recipe.output.clone(), OnceLock::new()))
            .collect();
        Self { registry, cache }
    }

    pub fn registry(&self) -> &'r RecipeRegistry {
        self.registry
    }

    /// Raw resources consumed per one unit of `id`.
    ///
    /// A raw resource flattens to itself with coefficient 1.
    pub fn flatten(&self, id: &str) -> Result<Arc<FlattenedVector>> {
        let mut in_progress = Vec::new();
        self.flatten_inner(id, &mut in_progress)
    }

    /// Flattened vectors for every registered recipe, in identifier order.
    pub fn flatten_all(&self) -> Result<Vec<(ResourceId, Arc<FlattenedVector>)>> {
        self.registry
            .recipes()
            .map(|recipe| {
                let vector = self.flatten(recipe.output.as_str())?;
                Ok((recipe.output.clone(), vector))
            })
            .collect()
    }

    fn flatten_inner(
        &self,
        id: &str,
        in_progress: &mut Vec<ResourceId>,
    ) -> Result<Arc<FlattenedVector>> {
        let (Some(recipe), Some(slot)) = (self.registry.recipe(id), self.cache.get(id)) else {
            if self.registry.is_raw(id) {
                return Ok(Arc::new(FlattenedVector::from_entries([(
                    ResourceId::new(id),
                    1.0,
                )])));
            }
            return Err(CalcError::UnknownResource(ResourceId::new(id)));
        };

        if let Some(cached) = slot.get() {
            return Ok(Arc::clone(cached));
        }

        if let Some(start) = in_progress.iter().position(|p| p.as_str() == id) {
            let mut chain = in_progress[start..].to_vec();
            chain.push(recipe.output.clone());
            return Err(CalcError::CyclicDependency { chain });
        }

        in_progress.push(recipe.output.clone());
        let computed = self.accumulate(recipe, in_progress);
        in_progress.pop();
        let vector = computed?;

        debug!(recipe = %recipe.output, raw = vector.len(), "flattened recipe");
        Ok(Arc::clone(slot.get_or_init(|| Arc::new(vector))))
    }

    fn accumulate(
        &self,
        recipe: &Recipe,
        in_progress: &mut Vec<ResourceId>,
    ) -> Result<FlattenedVector> {
        let mut totals: BTreeMap<ResourceId, f64> = BTreeMap::new();

        for (input, quantity) in &recipe.inputs {
            let upstream = self.flatten_inner(input.as_str(), in_progress)?;
            let per_unit = quantity / recipe.amount_produced;
            for (raw, amount) in upstream.iter() {
                *totals.entry(raw.clone()).or_default() += amount * per_unit;
            }
        }

        Ok(FlattenedVector::from_entries(
            totals
                .into_iter()
                .map(|(raw, amount)| (raw, round_amount(amount))),
        ))
    }
}
