use rand::prelude::*;

use crate::catalog::{Catalogs, Choice, Context};
use crate::weights::{self, WeightedRange};

/// One entry of a strategy row: a choice and the slice of roll space that
/// selects it.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedChoice {
    pub range: WeightedRange,
    pub choice: Choice,
}

/// The weight a detrimental choice is squeezed down to.
const SUPPRESSED_WEIGHT: i64 = 1;

/// A composer's probability table: one weighted row of choices per context
/// in the catalog, stored in catalog order so that merging and mutation are
/// deterministic for a fixed catalog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Strategy {
    rows: Vec<Vec<RankedChoice>>,
}

impl Strategy {
    pub fn new() -> Strategy {
        Strategy { rows: Vec::new() }
    }

    /// Fills the table with a freshly rolled weight partition for every
    /// context in the catalog.
    pub fn initialize(&mut self, catalogs: &Catalogs, rng: &mut impl Rng) {
        self.rows = (0..catalogs.contexts.len())
            .map(|_| fresh_row(catalogs, rng))
            .collect();
    }

    pub fn is_initialized(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Picks the next choice for `context` by rolling against the row's
    /// weighted ranges.
    ///
    /// The roll space is the sum of the row's current weights, so rows that
    /// have been repeatedly reinforced roll over a smaller space than the
    /// nominal 1000-per-choice total. That drift is part of the algorithm;
    /// renormalizing here would change its convergence behavior.
    ///
    /// Panics if no range contains the roll: that means the partition
    /// invariant is broken and the table is corrupt, which is not a
    /// recoverable state.
    pub fn next_choice(&self, catalogs: &Catalogs, context: Context, rng: &mut impl Rng) -> Choice {
        let row = self.row_for(catalogs, context);

        let roll_space: i64 = row.iter().map(|entry| entry.range.weight).sum();
        let roll = weights::roll(roll_space, rng);

        row.iter()
            .find(|entry| entry.range.contains(roll))
            .unwrap_or_else(|| {
                panic!("no weighted range contains roll {roll}: strategy row is corrupt")
            })
            .choice
    }

    /// Squeezes the weight of a choice that produced a rule violation down
    /// to a single slot, handing the freed space to its neighbor so the row
    /// stays contiguous. A choice not present in the row is ignored.
    ///
    /// The edit is local: only the entry and one neighbor change, and the
    /// row total is allowed to shrink below its original sum.
    pub fn reinforce(&mut self, catalogs: &Catalogs, context: Context, detrimental: Choice) {
        let index = catalogs
            .contexts
            .index_of(context)
            .unwrap_or_else(|| panic!("context missing from catalog: {context:?}"));
        let row = &mut self.rows[index];

        if row.len() < 2 {
            return;
        }

        let Some(position) = row.iter().position(|entry| entry.choice == detrimental) else {
            return;
        };

        if position == 0 {
            row[0].range.weight = SUPPRESSED_WEIGHT;
            row[0].range.ceiling = SUPPRESSED_WEIGHT;

            row[1].range.floor = SUPPRESSED_WEIGHT + 1;
            row[1].range.weight = row[1].range.ceiling - row[1].range.floor;
        } else if position == row.len() - 1 {
            let floor = weights::target_sum(row.len()) - SUPPRESSED_WEIGHT;
            row[position].range.weight = SUPPRESSED_WEIGHT;
            row[position].range.floor = floor;

            row[position - 1].range.ceiling = floor - 1;
            row[position - 1].range.weight =
                row[position - 1].range.ceiling - row[position - 1].range.floor;
        } else {
            row[position].range.weight = SUPPRESSED_WEIGHT;
            row[position].range.ceiling = row[position].range.floor + SUPPRESSED_WEIGHT;

            row[position + 1].range.floor = row[position].range.ceiling + 1;
            row[position + 1].range.weight =
                row[position + 1].range.ceiling - row[position + 1].range.floor;
        }
    }

    /// Crossover: builds a child table that alternates rows between the two
    /// parents in catalog order (even rows from `self`, odd from `other`).
    pub fn merge(&self, other: &Strategy) -> Strategy {
        let rows = self
            .rows
            .iter()
            .zip(other.rows.iter())
            .enumerate()
            .map(|(i, (own, theirs))| {
                if i % 2 == 0 {
                    own.clone()
                } else {
                    theirs.clone()
                }
            })
            .collect();

        Strategy { rows }
    }

    /// Replaces a `rate` fraction of randomly chosen rows with fresh
    /// partitions. Full replacement, not perturbation.
    pub fn mutate(&mut self, catalogs: &Catalogs, rate: f64, rng: &mut impl Rng) {
        let mutation_count = (self.rows.len() as f64 * rate) as usize;

        for _ in 0..mutation_count {
            let index = weights::roll(self.rows.len() as i64, rng) as usize;
            self.rows[index] = fresh_row(catalogs, rng);
        }
    }

    fn row_for(&self, catalogs: &Catalogs, context: Context) -> &[RankedChoice] {
        let index = catalogs
            .contexts
            .index_of(context)
            .unwrap_or_else(|| panic!("context missing from catalog: {context:?}"));
        &self.rows[index]
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<RankedChoice>] {
        &self.rows
    }
}

fn fresh_row(catalogs: &Catalogs, rng: &mut impl Rng) -> Vec<RankedChoice> {
    weights::generate_partition(catalogs.choices.len(), rng)
        .into_iter()
        .zip(catalogs.choices.iter())
        .map(|(range, choice)| RankedChoice {
            range,
            choice: *choice,
        })
        .collect()
}
