//! Facility sizing against fixed raw extraction rates

use std::fmt;

use crate::error::{CalcError, Result};
use crate::models::{round_amount, ResourceId};
use crate::registry::RawRates;
use crate::resolver::Resolver;
use crate::rounding::SmoothRounder;

/// How many facilities the raw supply can sustain, and what runs out first.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingCount {
    /// Breakeven facility count; fractional values are meaningful.
    /// `f64::INFINITY` when no raw input constrains the recipe.
    pub count: f64,
    /// Every raw resource achieving the minimum, in identifier order.
    pub limiting_factors: Vec<ResourceId>,
}

/// Facilities needed for a target output rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSizing {
    pub target_per_minute: f64,
    pub facilities: f64,
    pub rounded_facilities: u64,
    /// Raw demand per minute at the target rate.
    pub raw_demand: Vec<(ResourceId, f64)>,
}

/// Everything the reporting layer shows for one recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub recipe: ResourceId,
    pub rate_per_minute: f64,
    pub consumption_per_facility: Vec<(ResourceId, f64)>,
    pub building_count: BuildingCount,
    /// `None` when the count is unbounded or too large to round.
    pub rounded_count: Option<u64>,
}

/// Turns flattened vectors into per-minute consumption and facility counts.
pub struct ThroughputCalculator<'a> {
    resolver: &'a Resolver<'a>,
    rates: &'a RawRates,
    rounder: SmoothRounder,
}

impl<'a> ThroughputCalculator<'a> {
    pub fn new(resolver: &'a Resolver<'a>, rates: &'a RawRates) -> Self {
        Self {
            resolver,
            rates,
            rounder: SmoothRounder::new(),
        }
    }

    pub fn rounder(&self) -> &SmoothRounder {
        &self.rounder
    }

    fn rate_per_minute(&self, id: &str) -> Result<f64> {
        let registry = self.resolver.registry();
        match registry.recipe(id) {
            Some(recipe) => Ok(recipe.rate_per_minute()),
            None if registry.is_raw(id) => Err(CalcError::NotARecipe(ResourceId::new(id))),
            None => Err(CalcError::UnknownResource(ResourceId::new(id))),
        }
    }

    /// Raw units per minute consumed by one facility running `id`.
    pub fn consumption_per_minute(&self, id: &str) -> Result<Vec<(ResourceId, f64)>> {
        let rate = self.rate_per_minute(id)?;
        let flat = self.resolver.flatten(id)?;
        Ok(flat
            .iter()
            .map(|(raw, coefficient)| (raw.clone(), round_amount(coefficient * rate)))
            .collect())
    }

    /// Number of facilities that exactly saturates the raw supply.
    pub fn building_count(&self, id: &str) -> Result<BuildingCount> {
        let rate = self.rate_per_minute(id)?;
        let flat = self.resolver.flatten(id)?;

        let mut count = f64::INFINITY;
        let mut limiting_factors: Vec<ResourceId> = Vec::new();

        for (raw, coefficient) in flat.iter() {
            let supply = self
                .rates
                .get(raw.as_str())
                .ok_or_else(|| CalcError::MissingRawRate {
                    recipe: ResourceId::new(id),
                    resource: raw.clone(),
                })?;

            // Zero supply marks an unconstrained input.
            if coefficient <= 0.0 || supply <= 0.0 {
                continue;
            }

            let buildings = round_amount(supply / (rate * coefficient));
            if buildings < count {
                count = buildings;
                limiting_factors.clear();
                limiting_factors.push(raw.clone());
            } else if buildings == count {
                limiting_factors.push(raw.clone());
            }
        }

        limiting_factors.sort();
        Ok(BuildingCount {
            count,
            limiting_factors,
        })
    }

    /// Facilities and raw demand needed to output `target_per_minute` of `id`.
    pub fn facilities_for(&self, id: &str, target_per_minute: f64) -> Result<TargetSizing> {
        if !(target_per_minute.is_finite() && target_per_minute > 0.0) {
            return Err(CalcError::InvalidTargetRate(target_per_minute));
        }
        let rate = self.rate_per_minute(id)?;
        let flat = self.resolver.flatten(id)?;

        let facilities = round_amount(target_per_minute / rate);
        let rounded_facilities = self.rounder.round_up(facilities)?;
        let raw_demand = flat
            .iter()
            .map(|(raw, coefficient)| (raw.clone(), round_amount(coefficient * target_per_minute)))
            .collect();

        Ok(TargetSizing {
            target_per_minute,
            facilities,
            rounded_facilities,
            raw_demand,
        })
    }

    pub fn plan(&self, id: &str) -> Result<PlanSummary> {
        let consumption_per_facility = self.consumption_per_minute(id)?;
        let building_count = self.building_count(id)?;
        let rounded_count = if building_count.count.is_finite() {
            match self.rounder.round_up(building_count.count) {
                Ok(rounded) => Some(rounded),
                Err(CalcError::OutOfRange { .. }) => None,
                Err(err) => return Err(err),
            }
        } else {
            None
        };

        Ok(PlanSummary {
            recipe: ResourceId::new(id),
            rate_per_minute: self.rate_per_minute(id)?,
            consumption_per_facility,
            building_count,
            rounded_count,
        })
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.recipe)?;
        writeln!(f, "Output per facility: {:.3}/min", self.rate_per_minute)?;
        writeln!(f)?;

        writeln!(f, "Raw inputs per facility:")?;
        for (raw, per_minute) in &self.consumption_per_facility {
            writeln!(f, "  {} @ {:.3}/min", raw, per_minute)?;
        }
        writeln!(f)?;

        if self.building_count.count.is_finite() {
            writeln!(f, "Facilities at full supply: {:.3}", self.building_count.count)?;
            let names: Vec<_> = self
                .building_count
                .limiting_factors
                .iter()
                .map(ResourceId::as_str)
                .collect();
            writeln!(f, "Limited by: {}", names.join(", "))?;
        } else {
            writeln!(f, "Facilities at full supply: unconstrained")?;
        }
        match self.rounded_count {
            Some(rounded) => writeln!(f, "Buildable layout: {} facilities", rounded)?,
            None if self.building_count.count.is_finite() => {
                writeln!(f, "Buildable layout: count too large to round")?
            }
            None => {}
        }

        Ok(())
    }
}

impl fmt::Display for TargetSizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Target: {:.3}/min", self.target_per_minute)?;
        writeln!(
            f,
            "Facilities required: {:.3} (build {})",
            self.facilities, self.rounded_facilities
        )?;
        writeln!(f)?;
        writeln!(f, "Raw inputs required:")?;
        for (raw, per_minute) in &self.raw_demand {
            writeln!(f, "  {} @ {:.3}/min", raw, per_minute)?;
        }
        Ok(())
    }
}
