use clap::ValueEnum;

use crate::composer::Composition;
use crate::notes::{is_perfect_interval, span_between, MotionSpan, NoteMotion, ScaleDegree};

/// A voice-leading rule. Evaluation counts violations and flags the note
/// pairs to blame so that training can suppress the choices behind them.
pub trait CompositionRule {
    fn evaluate(&self, composition: &mut Composition) -> u32;
}

/// Flags a seventh that was reached by ascending motion and does not resolve
/// up to the root.
pub struct AscendingSeventh;

impl CompositionRule for AscendingSeventh {
    fn evaluate(&self, composition: &mut Composition) -> u32 {
        let mut errors = 0;
        let pairs = composition.pairs_mut();

        for i in 1..pairs.len().saturating_sub(1) {
            // The next pair's context records the motion that arrived at the
            // current pair.
            let arrived = pairs[i + 1].arrived_from_context;

            let cantus_firmus_unresolved = incorrectly_resolves(
                pairs[i].cantus_firmus,
                pairs[i + 1].cantus_firmus,
                arrived.cantus_firmus_motion,
            );
            let counterpoint_unresolved = incorrectly_resolves(
                pairs[i].counterpoint,
                pairs[i + 1].counterpoint,
                arrived.counterpoint_motion,
            );

            if cantus_firmus_unresolved || counterpoint_unresolved {
                pairs[i + 1].detrimental = true;
                errors += 1;
            }
        }

        errors
    }
}

fn incorrectly_resolves(current_note: i32, next_note: i32, arrived_from: NoteMotion) -> bool {
    ScaleDegree::from_note(current_note) == ScaleDegree::Seventh
        && arrived_from == NoteMotion::Ascending
        && ScaleDegree::from_note(next_note) != ScaleDegree::Root
}

/// Flags every vertically dissonant note pair.
pub struct Dissonance;

impl CompositionRule for Dissonance {
    fn evaluate(&self, composition: &mut Composition) -> u32 {
        let mut errors = 0;

        for pair in composition.pairs_mut() {
            if pair.is_dissonant() {
                pair.detrimental = true;
                errors += 1;
            }
        }

        errors
    }
}

/// Flags a melodic leap whose endpoints form a dissonant interval.
pub struct DissonantLeap;

impl CompositionRule for DissonantLeap {
    fn evaluate(&self, composition: &mut Composition) -> u32 {
        let mut errors = 0;
        let pairs = composition.pairs_mut();

        for i in 0..pairs.len().saturating_sub(1) {
            if is_dissonant_leap(pairs[i].cantus_firmus, pairs[i + 1].cantus_firmus)
                || is_dissonant_leap(pairs[i].counterpoint, pairs[i + 1].counterpoint)
            {
                pairs[i + 1].detrimental = true;
                errors += 1;
            }
        }

        errors
    }
}

fn is_dissonant_leap(current_note: i32, next_note: i32) -> bool {
    span_between(current_note, next_note) == MotionSpan::Leap
        && ScaleDegree::from_note(current_note)
            .is_dissonant_with(ScaleDegree::from_note(next_note))
}

/// Flags both voices leaping simultaneously in the same direction.
pub struct DoubledLeap;

impl CompositionRule for DoubledLeap {
    fn evaluate(&self, composition: &mut Composition) -> u32 {
        let mut errors = 0;
        let pairs = composition.pairs_mut();

        for i in 0..pairs.len().saturating_sub(1) {
            let arrived = pairs[i + 1].arrived_from_context;

            if arrived.cantus_firmus_span == MotionSpan::Leap
                && arrived.counterpoint_span == MotionSpan::Leap
                && arrived.cantus_firmus_motion == arrived.counterpoint_motion
            {
                pairs[i].detrimental = true;
                errors += 1;
            }
        }

        errors
    }
}

/// Flags the two voices landing on the same scale degree. The starting pair
/// is exempt since both voices begin on the root.
pub struct DoubledNote;

impl CompositionRule for DoubledNote {
    fn evaluate(&self, composition: &mut Composition) -> u32 {
        let mut errors = 0;

        for pair in composition.pairs_mut().iter_mut().skip(1) {
            if ScaleDegree::from_note(pair.cantus_firmus)
                == ScaleDegree::from_note(pair.counterpoint)
            {
                pair.detrimental = true;
                errors += 1;
            }
        }

        errors
    }
}

/// Flags a counterpoint leap that is not answered by a step back in the
/// opposite direction.
pub struct LeapReturn;

impl CompositionRule for LeapReturn {
    fn evaluate(&self, composition: &mut Composition) -> u32 {
        let mut errors = 0;
        let pairs = composition.pairs_mut();

        for i in 0..pairs.len().saturating_sub(2) {
            let current = pairs[i].arrived_from_context;
            let next = pairs[i + 1].arrived_from_context;

            if current.counterpoint_span != MotionSpan::Leap {
                continue;
            }

            let returns_correctly = next.counterpoint_span == MotionSpan::Step
                && current.counterpoint_motion != next.counterpoint_motion;

            if !returns_correctly {
                pairs[i].detrimental = true;
                errors += 1;
            }
        }

        errors
    }
}

/// Flags consecutive leaps in the same direction in either voice.
pub struct MultipleLeap;

impl CompositionRule for MultipleLeap {
    fn evaluate(&self, composition: &mut Composition) -> u32 {
        let mut errors = 0;
        let pairs = composition.pairs_mut();

        for i in 0..pairs.len().saturating_sub(1) {
            let current = pairs[i].arrived_from_context;
            let next = pairs[i + 1].arrived_from_context;

            let cantus_firmus_repeats = is_multiple_leap(
                current.cantus_firmus_motion,
                next.cantus_firmus_motion,
                current.cantus_firmus_span,
                next.cantus_firmus_span,
            );
            let counterpoint_repeats = is_multiple_leap(
                current.counterpoint_motion,
                next.counterpoint_motion,
                current.counterpoint_span,
                next.counterpoint_span,
            );

            if cantus_firmus_repeats || counterpoint_repeats {
                pairs[i].detrimental = true;
                errors += 1;
            }
        }

        errors
    }
}

fn is_multiple_leap(
    current_motion: NoteMotion,
    next_motion: NoteMotion,
    current_span: MotionSpan,
    next_span: MotionSpan,
) -> bool {
    current_span == MotionSpan::Leap && next_span == current_span && next_motion == current_motion
}

/// Flags a perfect interval that moves directly to another perfect interval.
pub struct ParallelPerfects;

impl CompositionRule for ParallelPerfects {
    fn evaluate(&self, composition: &mut Composition) -> u32 {
        let mut errors = 0;
        let pairs = composition.pairs_mut();

        for i in 0..pairs.len().saturating_sub(1) {
            if is_perfect_interval(pairs[i].cantus_firmus, pairs[i].counterpoint)
                && is_perfect_interval(pairs[i + 1].cantus_firmus, pairs[i + 1].counterpoint)
            {
                pairs[i + 1].detrimental = true;
                errors += 1;
            }
        }

        errors
    }
}

/// The rules selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RuleKind {
    /// Ascending sevenths must resolve up to the root.
    AscendingSeventh,
    /// No vertical dissonance between the voices.
    Dissonance,
    /// No melodic leaps across a dissonant interval.
    DissonantLeap,
    /// The voices must not leap in the same direction at once.
    DoubledLeap,
    /// The voices must not double the same scale degree.
    DoubledNote,
    /// A leap must be answered by a step in the opposite direction.
    LeapReturn,
    /// No consecutive leaps in the same direction.
    MultipleLeap,
    /// No perfect interval moving directly to another perfect interval.
    ParallelPerfects,
}

impl RuleKind {
    pub const ALL: [RuleKind; 8] = [
        RuleKind::AscendingSeventh,
        RuleKind::Dissonance,
        RuleKind::DissonantLeap,
        RuleKind::DoubledLeap,
        RuleKind::DoubledNote,
        RuleKind::LeapReturn,
        RuleKind::MultipleLeap,
        RuleKind::ParallelPerfects,
    ];

    fn build(self) -> Box<dyn CompositionRule> {
        match self {
            RuleKind::AscendingSeventh => Box::new(AscendingSeventh),
            RuleKind::Dissonance => Box::new(Dissonance),
            RuleKind::DissonantLeap => Box::new(DissonantLeap),
            RuleKind::DoubledLeap => Box::new(DoubledLeap),
            RuleKind::DoubledNote => Box::new(DoubledNote),
            RuleKind::LeapReturn => Box::new(LeapReturn),
            RuleKind::MultipleLeap => Box::new(MultipleLeap),
            RuleKind::ParallelPerfects => Box::new(ParallelPerfects),
        }
    }
}

/// The active rule set. Scoring a composition sums the violation counts of
/// every rule and marks the offending note pairs along the way.
pub struct Evaluator {
    rules: Vec<Box<dyn CompositionRule>>,
}

impl Evaluator {
    /// Builds an evaluator from the chosen rules; an empty selection means
    /// all of them.
    pub fn new(kinds: &[RuleKind]) -> Evaluator {
        let kinds = if kinds.is_empty() { &RuleKind::ALL[..] } else { kinds };

        Evaluator {
            rules: kinds.iter().map(|kind| kind.build()).collect(),
        }
    }

    pub fn score(&self, composition: &mut Composition) -> u32 {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(composition))
            .sum()
    }
}
