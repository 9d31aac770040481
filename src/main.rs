//! Production chain planner CLI

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chain_planner::extract::{self, RecipeTable};
use chain_planner::{sample, Resolver, ThroughputCalculator};

#[derive(Parser)]
#[command(name = "chain-planner")]
#[command(about = "Raw-resource flattening and facility sizing for production chains")]
struct Cli {
    /// Recipe table file, or a directory of *.recipes files (default: built-in table)
    #[arg(short, long, global = true)]
    recipes: Option<PathBuf>,

    /// Log loading and cache activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Raw resources consumed per unit of a recipe's output
    Flatten {
        /// Recipe or raw resource (e.g., "iron-plate")
        resource: String,
    },

    /// Facilities the raw supply sustains, and the limiting input
    Count {
        /// Recipe to size (e.g., "motor")
        resource: String,
    },

    /// Facilities and raw input needed for a target output rate
    Need {
        /// Recipe to size
        resource: String,

        /// Target output in units per minute
        #[arg(long, default_value = "60.0")]
        rate: f64,
    },

    /// Round a facility count up to the next 2^a * 3^b
    Round {
        count: f64,
    },

    /// Flattened vectors for every recipe
    List,

    /// Raw extraction rates
    Raw,
}

fn load_table(path: Option<&PathBuf>) -> Result<RecipeTable> {
    match path {
        Some(path) => Ok(extract::load_path(path)?.0),
        None => sample::load(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let table = load_table(cli.recipes.as_ref())?;
    let resolver = Resolver::new(&table.registry);
    let calculator = ThroughputCalculator::new(&resolver, &table.rates);

    match cli.command {
        Commands::Flatten { resource } => {
            let vector = resolver.flatten(&resource)?;
            println!("{} {}", resource, vector);
        }

        Commands::Count { resource } => {
            let plan = calculator.plan(&resource)?;
            println!("{}", plan);
        }

        Commands::Need { resource, rate } => {
            let sizing = calculator.facilities_for(&resource, rate)?;
            println!("=== {} ===", resource);
            println!("{}", sizing);
        }

        Commands::List => {
            if table.registry.is_empty() {
                println!("No recipes loaded.");
            } else {
                for (id, vector) in resolver.flatten_all()? {
                    println!("{} {}", id, vector);
                }
            }
        }

        Commands::Raw => {
            println!("{:<24} {:>12}", "Resource", "Rate (/min)");
            println!("{}", "-".repeat(37));
            for id in table.registry.raw_resources() {
                match table.rates.get(id.as_str()) {
                    Some(rate) if rate > 0.0 => println!("{:<24} {:>12.1}", id, rate),
                    Some(_) => println!("{:<24} {:>12}", id, "unlimited"),
                    None => println!("{:<24} {:>12}", id, "-"),
                }
            }
        }

        Commands::Round { count } => {
            println!("{}", calculator.rounder().round_up(count)?);
        }
    }

    Ok(())
}
