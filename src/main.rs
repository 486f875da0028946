use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridmst::{
    compute_mst_cost,
    steiner::{GeneticConfig, GeneticSearch},
    Grid,
};
use std::{env, fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Opt {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the MST cost of points given as encoded positions `x * side_len + y`
    Cost {
        #[arg(long)]
        side_len: i64,

        #[arg(required = true, allow_negative_numbers = true)]
        positions: Vec<i64>,
    },
    /// Search for Steiner cells that shorten the MST over a set of pins
    Steiner {
        #[arg(long)]
        side_len: usize,

        /// Pin coordinate as `x,y`
        #[arg(long = "pin", required = true, value_parser = parse_coordinate)]
        pins: Vec<[usize; 2]>,

        /// JSON file with genetic algorithm settings
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        population: Option<usize>,

        #[arg(long)]
        generations: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_coordinate(s: &str) -> Result<[usize; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{}`", s))?;
    let parse = |c: &str| {
        c.trim()
            .parse::<usize>()
            .map_err(|e| format!("bad coordinate `{}`: {}", c, e))
    };
    Ok([parse(x)?, parse(y)?])
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let filter = match env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) if opt.verbose => EnvFilter::new("gridmst=debug"),
        Err(_) => EnvFilter::new("gridmst=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match opt.command {
        Command::Cost {
            side_len,
            positions,
        } => {
            let cost = compute_mst_cost(side_len, &positions)?;
            println!("{}", cost);
        }
        Command::Steiner {
            side_len,
            pins,
            config,
            population,
            generations,
            seed,
            json,
        } => {
            let mut genetic_config = match config {
                Some(path) => {
                    let contents = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str(&contents)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => GeneticConfig::default(),
            };
            if let Some(population) = population {
                genetic_config.population = population;
            }
            if let Some(generations) = generations {
                genetic_config.generations = generations;
            }
            if seed.is_some() {
                genetic_config.seed = seed;
            }

            let grid = Grid::new(side_len)?;
            let pin_map = grid.occupancy(&pins)?;
            info!("Searching over {} pins on a {1}x{1} grid", pins.len(), side_len);
            let outcome = GeneticSearch::new(grid, pin_map, genetic_config)?.run()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.cost);
                for [x, y] in &outcome.steiner_cells {
                    println!("{} {}", x, y);
                }
            }
        }
    }

    Ok(())
}
