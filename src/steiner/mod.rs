use bitvec::prelude::*;
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::StdRng,
    seq::index,
    Rng, SeedableRng,
};
use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::{graph::mst::prim_cost, CellMap, Error, Grid, Result};

mod config;

pub use config::{GeneticConfig, Selection};

/// Encoded positions of every cell that is a pin or a chosen Steiner cell, ascending.
pub fn vertex_positions(pins: &BitSlice<u8, Msb0>, chromosome: &BitSlice<u8, Msb0>) -> Vec<usize> {
    pins.iter()
        .by_vals()
        .zip(chromosome.iter().by_vals())
        .enumerate()
        .filter_map(|(position, (pin, steiner))| (pin || steiner).then_some(position))
        .collect()
}

/// Cost of the MST connecting the pins and the Steiner cells of `chromosome`.
///
/// The lowest occupied cell is the root of the tree.
pub fn evaluate(grid: &Grid, pins: &BitSlice<u8, Msb0>, chromosome: &BitSlice<u8, Msb0>) -> u64 {
    prim_cost(grid, &vertex_positions(pins, chromosome))
}

#[derive(Clone, Debug, Serialize)]
pub struct Outcome {
    /// MST cost of the pins and the chosen Steiner cells
    pub cost: u64,
    /// MST cost of the pins alone
    pub pins_cost: u64,
    /// Chosen `[x, y]` cells that are not already pins
    pub steiner_cells: Vec<[usize; 2]>,
    #[serde(skip)]
    pub chromosome: CellMap,
    /// Cheapest cost in the initial population, then after each generation
    pub history: Vec<u64>,
}

/// Genetic search for Steiner cells that shorten the rectilinear MST over a fixed set of pins.
///
/// Each individual is a bitmap over the grid; its fitness is the negated MST cost of
/// the pins together with the cells it marks.
pub struct GeneticSearch {
    grid: Grid,
    pins: CellMap,
    config: GeneticConfig,
    rng: StdRng,
    costs: HashMap<CellMap, u64>,
}

impl GeneticSearch {
    pub fn new(grid: Grid, pins: CellMap, config: GeneticConfig) -> Result<Self> {
        config.validate()?;
        if grid.cells() != Some(pins.len()) {
            return Err(Error::InvalidArgument(format!(
                "pin map has {} cells but the grid has side length {}",
                pins.len(),
                grid.side_len()
            )));
        }
        if pins.not_any() {
            return Err(Error::InvalidArgument(
                "at least one pin is required".to_string(),
            ));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            grid,
            pins,
            config,
            rng,
            costs: HashMap::default(),
        })
    }

    pub fn run(&mut self) -> Result<Outcome> {
        let pins_cost = self.cost(&bitvec![u8, Msb0; 0; self.pins.len()]);

        let mut population = self.initialize();
        let mut costs = self.evaluate_population(&population);
        let (index, mut best_cost) = fittest(&costs);
        let mut best = population[index].clone();
        let mut history = Vec::with_capacity(self.config.generations + 1);
        history.push(best_cost);
        info!("Pins alone cost {}, initial best {}", pins_cost, best_cost);

        for generation in 1..=self.config.generations {
            let mating_pool = self.select_parents(&population, &costs)?;
            let mut offspring = self.recombine(mating_pool);
            self.mutate(&mut offspring);
            population = offspring;
            costs = self.evaluate_population(&population);

            let (index, cost) = fittest(&costs);
            history.push(cost);
            if cost < best_cost {
                best = population[index].clone();
                best_cost = cost;
            }
            info!("Generation {}: best {}", generation, cost);
        }

        let steiner_cells = best
            .iter_ones()
            .filter(|position| !self.pins[*position])
            .map(|position| self.grid.decode(position))
            .collect();
        Ok(Outcome {
            cost: best_cost,
            pins_cost,
            steiner_cells,
            chromosome: best,
            history,
        })
    }

    fn initialize(&mut self) -> Vec<CellMap> {
        let cells = self.pins.len();
        let rng = &mut self.rng;
        (0..self.config.population)
            .map(|_| (0..cells).map(|_| rng.gen::<bool>()).collect())
            .collect()
    }

    fn cost(&mut self, chromosome: &CellMap) -> u64 {
        if let Some(cost) = self.costs.get(chromosome) {
            return *cost;
        }
        let cost = evaluate(&self.grid, &self.pins, chromosome);
        self.costs.insert(chromosome.clone(), cost);
        cost
    }

    fn evaluate_population(&mut self, population: &[CellMap]) -> Vec<u64> {
        let known = self.costs.len();
        let costs: Vec<u64> = population
            .iter()
            .map(|chromosome| self.cost(chromosome))
            .collect();
        debug!(
            "Evaluated {} individuals, {} new",
            population.len(),
            self.costs.len() - known
        );
        costs
    }

    fn select_parents(&mut self, population: &[CellMap], costs: &[u64]) -> Result<Vec<CellMap>> {
        let pool = match self.config.selection {
            Selection::Tournament { size } => (0..population.len())
                .map(|_| {
                    index::sample(&mut self.rng, population.len(), size)
                        .iter()
                        .min_by_key(|competitor| costs[*competitor])
                        // size is at least 1
                        .unwrap_or(0)
                })
                .collect::<Vec<_>>(),
            Selection::RouletteWheel => {
                let worst = costs.iter().copied().max().unwrap_or(0);
                let wheel = WeightedIndex::new(costs.iter().map(|cost| worst - cost + 1))?;
                (0..population.len())
                    .map(|_| wheel.sample(&mut self.rng))
                    .collect()
            }
        };
        Ok(pool
            .into_iter()
            .map(|parent| population[parent].clone())
            .collect())
    }

    /// One point crossover of consecutive pairs. An odd parent out is carried over as is.
    fn recombine(&mut self, mating_pool: Vec<CellMap>) -> Vec<CellMap> {
        let mut offspring = Vec::with_capacity(mating_pool.len());
        let mut parents = mating_pool.into_iter();
        loop {
            match (parents.next(), parents.next()) {
                (Some(first), Some(second)) => {
                    let len = first.len();
                    if len >= 2 && self.rng.gen_bool(self.config.crossover_probability) {
                        let split = self.rng.gen_range(1..len);
                        let mut child1 = first[..split].to_bitvec();
                        child1.extend_from_bitslice(&second[split..]);
                        let mut child2 = second[..split].to_bitvec();
                        child2.extend_from_bitslice(&first[split..]);
                        offspring.push(child1);
                        offspring.push(child2);
                    } else {
                        offspring.push(first);
                        offspring.push(second);
                    }
                }
                (Some(odd), None) => offspring.push(odd),
                _ => break,
            }
        }
        offspring
    }

    /// Drop Steiner cells at random. Mutation never adds cells.
    fn mutate(&mut self, offspring: &mut [CellMap]) {
        for child in offspring {
            for position in 0..child.len() {
                if self.rng.gen_bool(self.config.mutation_probability) {
                    child.set(position, false);
                }
            }
        }
    }
}

/// Index and cost of the cheapest individual, the first one on ties.
fn fittest(costs: &[u64]) -> (usize, u64) {
    costs
        .iter()
        .copied()
        .enumerate()
        .fold((0, u64::MAX), |best, (i, cost)| {
            if cost < best.1 {
                (i, cost)
            } else {
                best
            }
        })
}
