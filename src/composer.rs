use std::fmt;

use rand::prelude::*;
use serde::Serialize;

use crate::catalog::{Catalogs, Choice, Context};
use crate::notes::{NoteMotion, ScaleDegree};
use crate::rules::Evaluator;
use crate::strategy::Strategy;

/// The default number of note pairs in a training composition.
pub const TRAINING_NOTE_COUNT: usize = 1000;

/// The default number of compositions a composer trains on per generation.
pub const TRAINING_ITERATIONS: usize = 1;

const STARTING_CANTUS_FIRMUS_NOTE: i32 = 1;

/// Two octaves above the cantus firmus' starting note.
const STARTING_COUNTERPOINT_NOTE: i32 = 15;

/// Offset applied to the starting pitches so the random walk cannot reach
/// negative pitch space.
/// TODO: replace with proper per-voice pitch ranges on the choices.
const STARTING_NOTE_OFFSET: i32 = 7000;

/// A pair of simultaneous notes, along with the context and choice that
/// produced it and the blame flag set during evaluation.
#[derive(Clone, Debug, Serialize)]
pub struct NotePair {
    pub cantus_firmus: i32,
    pub counterpoint: i32,
    pub cantus_firmus_decorations: Vec<i32>,
    pub counterpoint_decorations: Vec<i32>,
    pub arrived_from_context: Context,
    pub arrived_from_choice: Choice,
    pub detrimental: bool,
}

impl NotePair {
    pub fn is_dissonant(&self) -> bool {
        ScaleDegree::from_note(self.cantus_firmus)
            .is_dissonant_with(ScaleDegree::from_note(self.counterpoint))
    }
}

/// An ordered two-voice line pair, built up one note pair at a time.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Composition {
    pairs: Vec<NotePair>,
}

impl Composition {
    pub fn new() -> Composition {
        Composition { pairs: Vec::new() }
    }

    pub fn add_notes(
        &mut self,
        cantus_firmus: i32,
        counterpoint: i32,
        arrived_from_context: Context,
        arrived_from_choice: Choice,
    ) {
        self.pairs.push(NotePair {
            cantus_firmus,
            counterpoint,
            cantus_firmus_decorations: Vec::new(),
            counterpoint_decorations: Vec::new(),
            arrived_from_context,
            arrived_from_choice,
            detrimental: false,
        });
    }

    pub fn pairs(&self) -> &[NotePair] {
        &self.pairs
    }

    pub fn pairs_mut(&mut self) -> &mut [NotePair] {
        &mut self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The most recently emitted pair. Only called while composing, after
    /// the starting pair has been seeded.
    pub fn current_pair(&self) -> &NotePair {
        self.pairs.last().expect("composition has no notes yet")
    }

    /// The context in force right now: derived from the last two pairs, or
    /// the fixed starting context while fewer than two exist.
    pub fn current_context(&self) -> Context {
        if self.pairs.len() > 1 {
            let previous = &self.pairs[self.pairs.len() - 2];
            let current = &self.pairs[self.pairs.len() - 1];
            Context::between(
                previous.cantus_firmus,
                previous.counterpoint,
                current.cantus_firmus,
                current.counterpoint,
            )
        } else {
            Context::start()
        }
    }

    /// The (context, choice) blame pairs recorded on detrimental notes.
    pub fn detrimental_blame(&self) -> Vec<(Context, Choice)> {
        self.pairs
            .iter()
            .filter(|pair| pair.detrimental)
            .map(|pair| (pair.arrived_from_context, pair.arrived_from_choice))
            .collect()
    }

    pub fn reset(&mut self) {
        self.pairs.clear();
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in self.pairs.iter().take(100) {
            write!(
                f,
                "Cantus Firmus: {:?} ({})",
                ScaleDegree::from_note(pair.cantus_firmus),
                pair.cantus_firmus
            )?;
            for decoration in &pair.cantus_firmus_decorations {
                write!(f, ", {:?} ({})", ScaleDegree::from_note(*decoration), decoration)?;
            }
            write!(
                f,
                " | Counterpoint: {:?} ({})",
                ScaleDegree::from_note(pair.counterpoint),
                pair.counterpoint
            )?;
            for decoration in &pair.counterpoint_decorations {
                write!(f, ", {:?} ({})", ScaleDegree::from_note(*decoration), decoration)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One individual of the population: a strategy and the composition it is
/// currently working on.
pub struct Composer {
    pub strategy: Strategy,
    pub composition: Composition,
    pub average_score: u32,
}

impl Composer {
    pub fn new() -> Composer {
        Composer {
            strategy: Strategy::new(),
            composition: Composition::new(),
            average_score: 0,
        }
    }

    pub fn initialize_strategy(&mut self, catalogs: &Catalogs, rng: &mut impl Rng) {
        self.strategy.initialize(catalogs, rng);
    }

    /// Generates a composition of `total_notes` pairs: seed the two fixed
    /// starting pitches, then repeatedly ask the strategy for the next
    /// choice given the running context and apply it to the last pair.
    pub fn compose(&mut self, total_notes: usize, catalogs: &Catalogs, rng: &mut impl Rng) {
        self.composition.reset();

        let context = self.composition.current_context();
        self.composition.add_notes(
            STARTING_CANTUS_FIRMUS_NOTE + STARTING_NOTE_OFFSET,
            STARTING_COUNTERPOINT_NOTE + STARTING_NOTE_OFFSET,
            context,
            Choice::default(),
        );

        for _ in 0..total_notes.saturating_sub(1) {
            let context = self.composition.current_context();
            let choice = self.strategy.next_choice(catalogs, context, rng);
            let current = self.composition.current_pair();

            let next_cantus_firmus = apply_motion(
                current.cantus_firmus,
                choice.cantus_firmus_motion,
                choice.cantus_firmus_degree_change,
            );
            let next_counterpoint = apply_motion(
                current.counterpoint,
                choice.counterpoint_motion,
                choice.counterpoint_degree_change,
            );

            self.composition
                .add_notes(next_cantus_firmus, next_counterpoint, context, choice);
        }
    }

    /// Trains the composer: compose, score, and suppress the weight of
    /// every choice the evaluator blamed. The average score over all
    /// iterations becomes this composer's fitness.
    pub fn train(
        &mut self,
        iterations: usize,
        total_notes: usize,
        catalogs: &Catalogs,
        evaluator: &Evaluator,
        rng: &mut impl Rng,
    ) {
        let mut total_score = 0;

        for _ in 0..iterations {
            self.compose(total_notes, catalogs, rng);
            total_score += evaluator.score(&mut self.composition);

            for (context, choice) in self.composition.detrimental_blame() {
                self.strategy.reinforce(catalogs, context, choice);
            }
        }

        self.average_score = total_score / iterations as u32;
    }

    /// Produces two children by merging the parents' strategies, once in
    /// each order so the two children differ.
    pub fn breed(&self, mate: &Composer) -> [Composer; 2] {
        let mut first = Composer::new();
        let mut second = Composer::new();

        first.strategy = mate.strategy.merge(&self.strategy);
        second.strategy = self.strategy.merge(&mate.strategy);

        [first, second]
    }

    pub fn mutate(&mut self, catalogs: &Catalogs, rate: f64, rng: &mut impl Rng) {
        self.strategy.mutate(catalogs, rate, rng);
    }
}

fn apply_motion(note: i32, motion: NoteMotion, degree_change: i32) -> i32 {
    match motion {
        NoteMotion::Ascending => note + degree_change,
        NoteMotion::Descending | NoteMotion::Oblique => note - degree_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;
    use rand::rngs::StdRng;

    fn initialized_composer(seed: u64, catalogs: &Catalogs) -> Composer {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut composer = Composer::new();
        composer.initialize_strategy(catalogs, &mut rng);
        composer
    }

    #[test]
    fn compose_emits_the_requested_number_of_pairs() {
        let catalogs = Catalogs::new();
        let mut composer = initialized_composer(21, &catalogs);
        let mut rng = StdRng::seed_from_u64(22);

        composer.compose(64, &catalogs, &mut rng);

        assert_eq!(composer.composition.len(), 64);

        let first = &composer.composition.pairs()[0];
        assert_eq!(first.cantus_firmus, STARTING_CANTUS_FIRMUS_NOTE + STARTING_NOTE_OFFSET);
        assert_eq!(first.counterpoint, STARTING_COUNTERPOINT_NOTE + STARTING_NOTE_OFFSET);
        assert_eq!(first.arrived_from_context, Context::start());
    }

    #[test]
    fn composed_motion_never_exceeds_the_maximum_degree_change() {
        let catalogs = Catalogs::new();
        let mut composer = initialized_composer(23, &catalogs);
        let mut rng = StdRng::seed_from_u64(24);

        composer.compose(128, &catalogs, &mut rng);

        for window in composer.composition.pairs().windows(2) {
            assert!((window[1].cantus_firmus - window[0].cantus_firmus).abs() <= 3);
            assert!((window[1].counterpoint - window[0].counterpoint).abs() <= 3);
        }
    }

    #[test]
    fn recorded_contexts_match_the_running_state() {
        let catalogs = Catalogs::new();
        let mut composer = initialized_composer(25, &catalogs);
        let mut rng = StdRng::seed_from_u64(26);

        composer.compose(32, &catalogs, &mut rng);
        let pairs = composer.composition.pairs();

        // A pair's recorded context describes the state its choice was made
        // in: derived from the two pairs preceding it.
        for i in 2..pairs.len() {
            let expected = Context::between(
                pairs[i - 2].cantus_firmus,
                pairs[i - 2].counterpoint,
                pairs[i - 1].cantus_firmus,
                pairs[i - 1].counterpoint,
            );
            assert_eq!(pairs[i].arrived_from_context, expected);
        }
    }

    #[test]
    fn training_scores_and_reinforces() {
        let catalogs = Catalogs::new();
        let evaluator = Evaluator::new(&RuleKind::ALL);
        let mut composer = initialized_composer(27, &catalogs);
        let mut rng = StdRng::seed_from_u64(28);

        let before = composer.strategy.clone();
        composer.train(2, 64, &catalogs, &evaluator, &mut rng);

        assert_eq!(composer.composition.len(), 64);
        // A 64-pair random walk against the full rule set essentially always
        // trips at least one rule, which reinforces the strategy.
        assert_ne!(before, composer.strategy);
    }

    #[test]
    fn breeding_swaps_parent_order_between_the_two_children() {
        let catalogs = Catalogs::new();
        let left = initialized_composer(29, &catalogs);
        let right = initialized_composer(30, &catalogs);

        let children = left.breed(&right);

        assert_eq!(children[0].strategy, right.strategy.merge(&left.strategy));
        assert_eq!(children[1].strategy, left.strategy.merge(&right.strategy));
        assert_ne!(children[0].strategy, children[1].strategy);
    }
}
