use rand::prelude::*;
use thiserror::Error;

use crate::catalog::Catalogs;
use crate::composer::{Composer, Composition, TRAINING_ITERATIONS};
use crate::rules::Evaluator;

/// Hyper-parameters of a run.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub population_count: usize,
    pub crossover_count: usize,
    pub generation_count: usize,
    pub mutation_rate: f64,
    pub notes: usize,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            population_count: 25,
            crossover_count: 10,
            generation_count: 100,
            mutation_rate: 0.05,
            notes: crate::composer::TRAINING_NOTE_COUNT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("population count must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("crossover count must be between 2 and the population count, got {0}")]
    CrossoverOutOfRange(usize),
    #[error("generation count must be at least 1")]
    NoGenerations,
    #[error("mutation rate must be between 0.0 and 1.0, got {0}")]
    MutationRateOutOfRange(f64),
    #[error("compositions need at least 2 note pairs, got {0}")]
    NotesTooFew(usize),
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_count < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_count));
        }
        if self.crossover_count < 2 || self.crossover_count > self.population_count {
            return Err(ConfigError::CrossoverOutOfRange(self.crossover_count));
        }
        if self.generation_count < 1 {
            return Err(ConfigError::NoGenerations);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRateOutOfRange(self.mutation_rate));
        }
        if self.notes < 2 {
            return Err(ConfigError::NotesTooFew(self.notes));
        }
        Ok(())
    }
}

/// Per-generation summary emitted while the run progresses.
#[derive(Clone, Copy, Debug)]
pub struct GenerationStats {
    pub number: usize,
    pub average_score: f64,
    pub best_score: u32,
    pub all_time_best: u32,
    pub all_time_worst: u32,
}

/// Where run progress gets reported.
pub trait ProgressSink {
    fn hyper_parameters(&mut self, config: &EngineConfig);
    fn generation(&mut self, stats: &GenerationStats);
}

/// Prints progress to stdout.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn hyper_parameters(&mut self, config: &EngineConfig) {
        println!();
        println!("Running genetic algorithm with the following hyper-parameters:\n");
        println!("Population count: {}", config.population_count);
        println!("Crossover count: {}", config.crossover_count);
        println!("Generation count: {}", config.generation_count);
        println!("Mutation rate: {}%", (config.mutation_rate * 100.0) as i64);
        println!();
        println!("Error rates:\n");
    }

    fn generation(&mut self, stats: &GenerationStats) {
        // Scores are reported in tenths of an error.
        println!(
            "{:<15}{:<18}{:<15}{:<24}{}",
            format!("Generation {}", stats.number),
            format!(" | Average: {:.2}", stats.average_score / 10.0),
            format!(" | Best: {:.2}", stats.best_score as f64 / 10.0),
            format!(" | All Time Best: {:.2}", stats.all_time_best as f64 / 10.0),
            format!(" | All Time Worst: {:.2}", stats.all_time_worst as f64 / 10.0),
        );
    }
}

/// Discards progress. Used when no reporting is wanted.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn hyper_parameters(&mut self, _config: &EngineConfig) {}
    fn generation(&mut self, _stats: &GenerationStats) {}
}

const MUTATION_RATE_MINIMUM_TOLERANCE: f64 = 1e-5;

/// The evolving pool of composers.
pub struct Population {
    config: EngineConfig,
    composers: Vec<Composer>,
}

impl Population {
    pub fn new(config: EngineConfig) -> Population {
        Population {
            config,
            composers: Vec::new(),
        }
    }

    pub fn initialize(&mut self, catalogs: &Catalogs, rng: &mut impl Rng) {
        self.composers = (0..self.config.population_count)
            .map(|_| {
                let mut composer = Composer::new();
                composer.initialize_strategy(catalogs, rng);
                composer
            })
            .collect();
    }

    pub fn composers(&self) -> &[Composer] {
        &self.composers
    }

    /// Runs the configured number of generations: train everyone, report
    /// the generation's scores, then cross over the best and mutate.
    pub fn run(
        &mut self,
        catalogs: &Catalogs,
        evaluator: &Evaluator,
        progress: &mut dyn ProgressSink,
        rng: &mut impl Rng,
    ) {
        progress.hyper_parameters(&self.config);

        let mut all_time_best = u32::MAX;
        let mut all_time_worst = u32::MIN;

        for number in 1..=self.config.generation_count {
            self.train(catalogs, evaluator, rng);

            let scores: Vec<u32> = self
                .composers
                .iter()
                .map(|composer| composer.average_score)
                .collect();
            let average_score = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
            let best_score = scores.iter().copied().min().unwrap_or(0);
            let worst_score = scores.iter().copied().max().unwrap_or(0);

            all_time_best = all_time_best.min(best_score);
            all_time_worst = all_time_worst.max(worst_score);

            progress.generation(&GenerationStats {
                number,
                average_score,
                best_score,
                all_time_best,
                all_time_worst,
            });

            self.crossover(catalogs, rng);
            self.mutate(catalogs, rng);
        }
    }

    fn train(&mut self, catalogs: &Catalogs, evaluator: &Evaluator, rng: &mut impl Rng) {
        for composer in &mut self.composers {
            composer.train(TRAINING_ITERATIONS, self.config.notes, catalogs, evaluator, rng);
        }
    }

    /// Breeds the next generation from the best composers: rank by score,
    /// shuffle the top slice so mates pair up randomly, then breed each
    /// adjacent pair. The children replace the old population entirely.
    fn crossover(&mut self, catalogs: &Catalogs, rng: &mut impl Rng) {
        self.composers.sort_by_key(|composer| composer.average_score);

        let mut top: Vec<&Composer> = self
            .composers
            .iter()
            .take(self.config.crossover_count)
            .collect();
        top.shuffle(rng);

        let mut children = Vec::new();
        for pair in top.windows(2) {
            children.extend(pair[0].breed(pair[1]));
        }

        self.composers = children;
        self.correct_population_count(catalogs, rng);
    }

    /// Trims an oversized generation by evicting random individuals, or
    /// tops up an undersized one with fresh random composers.
    fn correct_population_count(&mut self, catalogs: &Catalogs, rng: &mut impl Rng) {
        while self.composers.len() > self.config.population_count {
            let index = rng.random_range(0..self.composers.len());
            self.composers.remove(index);
        }

        while self.composers.len() < self.config.population_count {
            let mut composer = Composer::new();
            composer.initialize_strategy(catalogs, rng);
            self.composers.push(composer);
        }
    }

    fn mutate(&mut self, catalogs: &Catalogs, rng: &mut impl Rng) {
        if self.config.mutation_rate.abs() < MUTATION_RATE_MINIMUM_TOLERANCE {
            return;
        }

        let mutation_count = (self.composers.len() as f64 * self.config.mutation_rate) as usize;
        for _ in 0..mutation_count {
            let index = rng.random_range(0..self.composers.len());
            self.composers[index].mutate(catalogs, self.config.mutation_rate, rng);
        }
    }

    /// Has every composer write a final piece and returns the one with the
    /// fewest rule violations.
    pub fn final_composition(
        &mut self,
        catalogs: &Catalogs,
        evaluator: &Evaluator,
        rng: &mut impl Rng,
    ) -> Composition {
        let mut scores = Vec::with_capacity(self.composers.len());
        for composer in &mut self.composers {
            composer.compose(self.config.notes, catalogs, rng);
            scores.push(evaluator.score(&mut composer.composition));
        }

        // Ties go to the earliest composer.
        let (best, _) = scores
            .iter()
            .enumerate()
            .min_by_key(|&(index, &score)| (score, index))
            .expect("population is empty");

        self.composers[best].composition.clone()
    }
}
