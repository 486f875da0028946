use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How parents are drawn from the population for the mating pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// Draw `size` distinct individuals and keep the cheapest.
    Tournament { size: usize },
    /// Draw proportionally to how much cheaper an individual is than the worst one.
    RouletteWheel,
}

impl Default for Selection {
    fn default() -> Self {
        Self::Tournament { size: 2 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneticConfig {
    pub population: usize,
    pub generations: usize,
    pub selection: Selection,
    /// Probability that a pair of parents is recombined instead of copied
    pub crossover_probability: f64,
    /// Per-bit probability that a Steiner cell is dropped from a child
    pub mutation_probability: f64,
    /// Fixed seed for reproducible runs, else seeded from the OS
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population: 200,
            generations: 30,
            selection: Selection::default(),
            crossover_probability: 1.0,
            mutation_probability: 0.1,
            seed: None,
        }
    }
}

impl GeneticConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population < 2 {
            return Err(Error::InvalidArgument(format!(
                "population must hold at least 2 individuals, got {}",
                self.population
            )));
        }
        if let Selection::Tournament { size } = self.selection {
            if size == 0 || size > self.population {
                return Err(Error::InvalidArgument(format!(
                    "tournament size must be within 1..={}, got {}",
                    self.population, size
                )));
            }
        }
        for (name, probability) in [
            ("crossover", self.crossover_probability),
            ("mutation", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(Error::InvalidArgument(format!(
                    "{} probability must be within [0, 1], got {}",
                    name, probability
                )));
            }
        }
        Ok(())
    }
}
