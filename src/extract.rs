//! Recipe table loading
//!
//! Reads the plain-text recipe table format, one statement per line:
//!
//! ```text
//! # comment
//! raw iron-ore 480
//! raw plastic
//! recipe iron-plate 6s x2 <- iron-ingot 3
//! recipe steel-ingot 4s x3 <- iron-ore 3, coal 3 ; byproducts slag 1/2
//! ```
//!
//! A raw line without a rate declares the resource but leaves it out of
//! the rate table.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use tracing::info;
use walkdir::WalkDir;

use crate::models::Recipe;
use crate::registry::{RawRates, RecipeRegistry, RegistryBuilder};

/// File extension picked up when loading a directory.
pub const TABLE_EXTENSION: &str = "recipes";

/// A fully loaded recipe table.
#[derive(Debug)]
pub struct RecipeTable {
    pub registry: RecipeRegistry,
    pub rates: RawRates,
}

#[derive(Debug, Default)]
pub struct LoadStats {
    pub files: usize,
    pub recipes: usize,
    pub raw_resources: usize,
    pub rates: usize,
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} recipes, {} raw resources ({} with rates) from {} file(s)",
            self.recipes, self.raw_resources, self.rates, self.files
        )
    }
}

struct TableParser {
    raw_re: Regex,
    recipe_re: Regex,
    entry_re: Regex,
    builder: RegistryBuilder,
    rates: RawRates,
    stats: LoadStats,
}

impl TableParser {
    fn new() -> Result<Self> {
        Ok(Self {
            raw_re: Regex::new(r"^raw\s+([\w.-]+)(?:\s+(\S+))?$")?,
            recipe_re: Regex::new(
                r"^recipe\s+([\w.-]+)\s+(\S+?)s\s+x(\S+)(?:\s*<-\s*([^;]*?))?(?:\s*;\s*byproducts?\s+(.*?))?$",
            )?,
            entry_re: Regex::new(r"^([\w.-]+)\s+(\S+)$")?,
            builder: RegistryBuilder::new(),
            rates: RawRates::new(),
            stats: LoadStats::default(),
        })
    }

    fn parse(&mut self, source: &str, origin: &str) -> Result<()> {
        for (index, line) in source.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            self.parse_line(line)
                .with_context(|| format!("{}:{}: {}", origin, index + 1, line))?;
        }
        self.stats.files += 1;
        Ok(())
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if let Some(cap) = self.raw_re.captures(line) {
            let id = &cap[1];
            self.builder.raw(id)?;
            self.stats.raw_resources += 1;
            if let Some(rate) = cap.get(2) {
                self.rates.insert(id, parse_quantity(rate.as_str())?)?;
                self.stats.rates += 1;
            }
            return Ok(());
        }

        if let Some(cap) = self.recipe_re.captures(line) {
            let mut recipe = Recipe::builder(
                &cap[1],
                parse_quantity(&cap[2])?,
                parse_quantity(&cap[3])?,
            );
            if let Some(inputs) = cap.get(4) {
                for (id, qty) in self.parse_entries(inputs.as_str())? {
                    recipe = recipe.input(id, qty);
                }
            }
            if let Some(byproducts) = cap.get(5) {
                for (id, qty) in self.parse_entries(byproducts.as_str())? {
                    recipe = recipe.byproduct(id, qty);
                }
            }
            self.builder.recipe(recipe.build()?)?;
            self.stats.recipes += 1;
            return Ok(());
        }

        bail!("unrecognized statement")
    }

    fn parse_entries<'s>(&self, list: &'s str) -> Result<Vec<(&'s str, f64)>> {
        list.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let cap = self
                    .entry_re
                    .captures(entry)
                    .ok_or_else(|| anyhow!("expected '<resource> <quantity>', got '{}'", entry))?;
                let (_, [id, quantity]) = cap.extract();
                Ok((id, parse_quantity(quantity)?))
            })
            .collect()
    }

    fn finish(self) -> (RecipeTable, LoadStats) {
        let table = RecipeTable {
            registry: self.builder.build(),
            rates: self.rates,
        };
        (table, self.stats)
    }
}

/// Parse a decimal (`1.5`) or fraction (`3/2`).
pub fn parse_quantity(text: &str) -> Result<f64> {
    let value = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().with_context(|| format!("bad number '{}'", text))?;
            let den: f64 = den.trim().parse().with_context(|| format!("bad number '{}'", text))?;
            if den == 0.0 {
                bail!("division by zero in '{}'", text);
            }
            num / den
        }
        None => text.parse().with_context(|| format!("bad number '{}'", text))?,
    };
    Ok(value)
}

/// Parse a single recipe table held in memory.
pub fn parse_table(source: &str, origin: &str) -> Result<RecipeTable> {
    let mut parser = TableParser::new()?;
    parser.parse(source, origin)?;
    Ok(parser.finish().0)
}

/// Find all recipe table files under a directory, in path order.
pub fn find_table_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == TABLE_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Load a recipe table file, or every table file under a directory into
/// one registry. Duplicates across files are rejected.
pub fn load_path(path: &Path) -> Result<(RecipeTable, LoadStats)> {
    let files = if path.is_dir() {
        find_table_files(path)?
    } else {
        vec![path.to_path_buf()]
    };
    if files.is_empty() {
        bail!("no .{} files found under {}", TABLE_EXTENSION, path.display());
    }

    let mut parser = TableParser::new()?;
    for file in &files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        parser.parse(&source, &file.display().to_string())?;
    }

    let (table, stats) = parser.finish();
    info!(%stats, "loaded recipe table");
    Ok((table, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;

    const TABLE: &str = "
        # ores
        raw iron-ore 480
        raw coal 240
        raw plastic

        recipe iron-plate 6s x2 <- iron-ingot 3
        recipe iron-ingot 2s x1 <- iron-ore 1
        recipe steel-ingot 4s x3 <- iron-ore 3, coal 3 ; byproducts slag 1/2
    ";

    #[test]
    fn parses_raw_and_recipes() {
        let table = parse_table(TABLE, "test").unwrap();
        assert!(table.registry.is_raw("plastic"));
        assert_eq!(table.rates.get("iron-ore"), Some(480.0));
        assert_eq!(table.rates.get("plastic"), None);
        assert_eq!(table.rates.len(), 2);

        let steel = table.registry.recipe("steel-ingot").unwrap();
        assert_eq!(steel.seconds_to_produce, 4.0);
        assert_eq!(steel.amount_produced, 3.0);
        assert_eq!(steel.inputs.len(), 2);
        assert_eq!(steel.byproducts, vec![(crate::models::ResourceId::new("slag"), 0.5)]);
    }

    #[test]
    fn recipe_without_inputs() {
        let table = parse_table("recipe water 1s x2", "test").unwrap();
        let water = table.registry.recipe("water").unwrap();
        assert!(water.inputs.is_empty());
        assert_eq!(water.rate_per_minute(), 120.0);
    }

    #[test]
    fn fractions_and_decimals() {
        assert_eq!(parse_quantity("3/2").unwrap(), 1.5);
        assert_eq!(parse_quantity("0.25").unwrap(), 0.25);
        assert!(parse_quantity("1/0").is_err());
        assert!(parse_quantity("lots").is_err());
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse_table("raw ore 1\nbogus line", "table.recipes").unwrap_err();
        assert!(format!("{:#}", err).contains("table.recipes:2"));
    }

    #[test]
    fn duplicate_recipe_is_rejected() {
        let source = "recipe a 1s x1\nrecipe a 2s x1";
        let err = parse_table(source, "test").unwrap_err();
        assert_eq!(
            err.downcast_ref::<CalcError>(),
            Some(&CalcError::DuplicateRecipe("a".into()))
        );
    }

    #[test]
    fn self_reference_is_rejected() {
        let err = parse_table("recipe a 1s x1 <- a 1", "test").unwrap_err();
        assert_eq!(
            err.downcast_ref::<CalcError>(),
            Some(&CalcError::SelfReferentialRecipe("a".into()))
        );
    }

    #[test]
    fn loads_directory_of_tables() {
        let dir = std::env::temp_dir().join(format!("chain-planner-{}", std::process::id()));
        let nested = dir.join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.join("raw.recipes"), "raw ore 60\n").unwrap();
        fs::write(nested.join("ingot.recipes"), "recipe ingot 2s x1 <- ore 1\n").unwrap();
        fs::write(dir.join("notes.txt"), "not a table").unwrap();

        let (table, stats) = load_path(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.recipes, 1);
        assert!(table.registry.recipe("ingot").is_some());
        assert_eq!(table.rates.get("ore"), Some(60.0));
    }
}
