//! Built-in production table, used when no recipe file is given

use anyhow::Result;

use crate::extract::{parse_table, RecipeTable};
use crate::registry::{RawRates, RecipeRegistry};

pub const SAMPLE_TABLE: &str = include_str!("../data/satisfactory.recipes");

pub fn load() -> Result<RecipeTable> {
    parse_table(SAMPLE_TABLE, "built-in")
}

pub fn registry() -> Result<RecipeRegistry> {
    Ok(load()?.registry)
}

pub fn raw_rates() -> Result<RawRates> {
    Ok(load()?.rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::ThroughputCalculator;
    use crate::models::ResourceId;
    use crate::resolver::Resolver;

    #[test]
    fn every_sample_recipe_resolves() {
        let table = load().unwrap();
        let resolver = Resolver::new(&table.registry);
        for (id, vector) in resolver.flatten_all().unwrap() {
            assert!(!vector.is_empty(), "{} has no raw inputs", id);
        }
    }

    #[test]
    fn known_reductions() {
        let table = load().unwrap();
        let resolver = Resolver::new(&table.registry);

        let plate = resolver.flatten("iron-plate").unwrap();
        assert_eq!(plate.get("iron-ore"), Some(1.5));

        let reinforced = resolver.flatten("reinforced-plate").unwrap();
        assert_eq!(reinforced.get("iron-ore"), Some(12.0));

        let smart = resolver.flatten("smart-plating").unwrap();
        assert_eq!(smart.get("iron-ore"), Some(23.25));

        let steel = resolver.flatten("steel-beam").unwrap();
        assert_eq!(steel.get("iron-ore"), Some(4.0));
        assert_eq!(steel.get("coal"), Some(4.0));
    }

    #[test]
    fn plastic_never_limits() {
        let table = load().unwrap();
        let resolver = Resolver::new(&table.registry);
        let calc = ThroughputCalculator::new(&resolver, &table.rates);

        // 4 copper-ore and 4 plastic per board at 7.5 boards/min per facility.
        let count = calc.building_count("circuit-board").unwrap();
        assert_eq!(count.count, 16.0);
        assert_eq!(count.limiting_factors, vec![ResourceId::new("copper-ore")]);
    }
}
