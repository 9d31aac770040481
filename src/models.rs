//! Data models for recipes and flattened resource vectors

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::error::{CalcError, Result};

/// Decimal places kept when accumulating flattened amounts and building
/// counts. Suppresses floating noise that would otherwise split ties.
pub const ROUNDING_PLACES: i32 = 10;

/// Magnitude above which [`round_amount`] returns its input unchanged;
/// scaling larger values loses the fraction anyway and can overflow.
const ROUNDING_LIMIT: f64 = 1e15;

/// Round to [`ROUNDING_PLACES`] decimal places.
pub fn round_amount(value: f64) -> f64 {
    if !value.is_finite() || value.abs() > ROUNDING_LIMIT {
        return value;
    }
    let scale = 10f64.powi(ROUNDING_PLACES);
    (value * scale).round() / scale
}

/// Name of a raw or produced resource, e.g. "iron-ore" or "iron-plate".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(Arc<str>);

impl ResourceId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ResourceId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A production recipe, identified by the resource it outputs.
///
/// Quantities are per production cycle. Byproducts are recorded but never
/// credited against demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub output: ResourceId,
    pub seconds_to_produce: f64,
    pub amount_produced: f64,
    pub inputs: Vec<(ResourceId, f64)>,
    pub byproducts: Vec<(ResourceId, f64)>,
}

impl Recipe {
    pub fn builder(
        output: impl Into<ResourceId>,
        seconds_to_produce: f64,
        amount_produced: f64,
    ) -> RecipeBuilder {
        RecipeBuilder {
            output: output.into(),
            seconds_to_produce,
            amount_produced,
            inputs: Vec::new(),
            byproducts: Vec::new(),
        }
    }

    /// Units of output per minute for one facility.
    pub fn rate_per_minute(&self) -> f64 {
        self.amount_produced / self.seconds_to_produce * 60.0
    }
}

#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    output: ResourceId,
    seconds_to_produce: f64,
    amount_produced: f64,
    inputs: Vec<(ResourceId, f64)>,
    byproducts: Vec<(ResourceId, f64)>,
}

impl RecipeBuilder {
    pub fn input(mut self, resource: impl Into<ResourceId>, quantity: f64) -> Self {
        self.inputs.push((resource.into(), quantity));
        self
    }

    pub fn byproduct(mut self, resource: impl Into<ResourceId>, quantity: f64) -> Self {
        self.byproducts.push((resource.into(), quantity));
        self
    }

    /// Validate and produce the recipe.
    pub fn build(self) -> Result<Recipe> {
        let invalid = |reason: String| CalcError::InvalidRecipe {
            id: self.output.clone(),
            reason,
        };

        if !(self.seconds_to_produce.is_finite() && self.seconds_to_produce > 0.0) {
            return Err(invalid(format!(
                "production time must be positive, got {}",
                self.seconds_to_produce
            )));
        }
        if !(self.amount_produced.is_finite() && self.amount_produced > 0.0) {
            return Err(invalid(format!(
                "amount produced must be positive, got {}",
                self.amount_produced
            )));
        }

        if self.inputs.iter().any(|(id, _)| *id == self.output) {
            return Err(CalcError::SelfReferentialRecipe(self.output));
        }

        for (kind, entries) in [("input", &self.inputs), ("byproduct", &self.byproducts)] {
            for (i, (id, qty)) in entries.iter().enumerate() {
                if !(qty.is_finite() && *qty >= 0.0) {
                    return Err(invalid(format!("{} '{}' has quantity {}", kind, id, qty)));
                }
                if entries[..i].iter().any(|(other, _)| other == id) {
                    return Err(invalid(format!("{} '{}' is listed twice", kind, id)));
                }
            }
        }

        Ok(Recipe {
            output: self.output,
            seconds_to_produce: self.seconds_to_produce,
            amount_produced: self.amount_produced,
            inputs: self.inputs,
            byproducts: self.byproducts,
        })
    }
}

/// Raw resources consumed per one unit of a recipe's output.
///
/// Entries are sorted by descending amount, ties broken by identifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlattenedVector {
    entries: Vec<(ResourceId, f64)>,
}

impl FlattenedVector {
    pub fn from_entries(entries: impl IntoIterator<Item = (ResourceId, f64)>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    pub fn get(&self, resource: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(id, _)| id.as_str() == resource)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, f64)> {
        self.entries.iter().map(|(id, amount)| (id, *amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for FlattenedVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (id, amount)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", id, amount)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_per_minute_from_cycle() {
        let plate = Recipe::builder("iron-plate", 6.0, 2.0)
            .input("iron-ingot", 3.0)
            .build()
            .unwrap();
        assert_eq!(plate.rate_per_minute(), 20.0);
    }

    #[test]
    fn self_reference_is_rejected() {
        let err = Recipe::builder("loop", 1.0, 1.0)
            .input("loop", 1.0)
            .build()
            .unwrap_err();
        assert_eq!(err, CalcError::SelfReferentialRecipe("loop".into()));
    }

    #[test]
    fn non_positive_time_is_rejected() {
        let err = Recipe::builder("x", 0.0, 1.0).build().unwrap_err();
        assert!(matches!(err, CalcError::InvalidRecipe { .. }));
    }

    #[test]
    fn duplicate_input_is_rejected() {
        let err = Recipe::builder("x", 1.0, 1.0)
            .input("a", 1.0)
            .input("a", 2.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, CalcError::InvalidRecipe { .. }));
    }

    #[test]
    fn flattened_vector_sorts_by_amount_then_name() {
        let v = FlattenedVector::from_entries([
            (ResourceId::new("b"), 1.0),
            (ResourceId::new("c"), 3.0),
            (ResourceId::new("a"), 1.0),
        ]);
        let order: Vec<_> = v.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
        assert_eq!(v.to_string(), "{c: 3, a: 1, b: 1}");
    }

    #[test]
    fn round_amount_drops_float_noise() {
        assert_eq!(round_amount(0.1 + 0.2), 0.3);
    }

    #[test]
    fn round_amount_leaves_huge_values_finite() {
        assert_eq!(round_amount(1e300), 1e300);
        assert_eq!(round_amount(-2e20), -2e20);
        assert!(round_amount(f64::INFINITY).is_infinite());
    }
}
