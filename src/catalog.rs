use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::notes::{motion_between, span_between, MotionSpan, NoteMotion, ScaleDegree};

/// A snapshot of where the composition currently stands: motion, motion span
/// and scale degree for both voices. Used as the key into a strategy table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    pub counterpoint_motion: NoteMotion,
    pub counterpoint_span: MotionSpan,
    pub counterpoint_degree: ScaleDegree,
    pub cantus_firmus_motion: NoteMotion,
    pub cantus_firmus_span: MotionSpan,
    pub cantus_firmus_degree: ScaleDegree,
}

impl Context {
    /// The context in force before any motion has happened: both voices
    /// descending, stepwise, on the root.
    pub fn start() -> Context {
        Context {
            counterpoint_motion: NoteMotion::Descending,
            counterpoint_span: MotionSpan::Step,
            counterpoint_degree: ScaleDegree::Root,
            cantus_firmus_motion: NoteMotion::Descending,
            cantus_firmus_span: MotionSpan::Step,
            cantus_firmus_degree: ScaleDegree::Root,
        }
    }

    /// Derives the context in force after moving from the previous note pair
    /// to the current one.
    pub fn between(
        previous_cantus_firmus: i32,
        previous_counterpoint: i32,
        current_cantus_firmus: i32,
        current_counterpoint: i32,
    ) -> Context {
        Context {
            counterpoint_motion: motion_between(previous_counterpoint, current_counterpoint),
            counterpoint_span: span_between(previous_counterpoint, current_counterpoint),
            counterpoint_degree: ScaleDegree::from_note(current_counterpoint),
            cantus_firmus_motion: motion_between(previous_cantus_firmus, current_cantus_firmus),
            cantus_firmus_span: span_between(previous_cantus_firmus, current_cantus_firmus),
            cantus_firmus_degree: ScaleDegree::from_note(current_cantus_firmus),
        }
    }
}

/// A candidate next move: motion direction and scale-degree delta for each
/// voice. An oblique voice always has a delta of zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    pub counterpoint_motion: NoteMotion,
    pub cantus_firmus_motion: NoteMotion,
    pub counterpoint_degree_change: i32,
    pub cantus_firmus_degree_change: i32,
}

impl Default for Choice {
    fn default() -> Choice {
        Choice {
            counterpoint_motion: NoteMotion::Oblique,
            cantus_firmus_motion: NoteMotion::Oblique,
            counterpoint_degree_change: 0,
            cantus_firmus_degree_change: 0,
        }
    }
}

/// The largest scale-degree delta a single choice may move a voice.
const MAX_DEGREE_CHANGE: i32 = 3;

/// The fixed catalog of every context that can occur in a composition, with
/// a value-keyed index for table lookups.
pub struct ContextCatalog {
    contexts: Vec<Context>,
    index: HashMap<Context, usize>,
}

impl ContextCatalog {
    pub fn new() -> ContextCatalog {
        const MOTIONS: [NoteMotion; 3] =
            [NoteMotion::Ascending, NoteMotion::Descending, NoteMotion::Oblique];
        const SPANS: [MotionSpan; 2] = [MotionSpan::Step, MotionSpan::Leap];

        let mut contexts = Vec::new();

        for counterpoint_motion in MOTIONS {
            for counterpoint_span in SPANS {
                for counterpoint_degree in ScaleDegree::ALL {
                    for cantus_firmus_motion in MOTIONS {
                        for cantus_firmus_span in SPANS {
                            for cantus_firmus_degree in ScaleDegree::ALL {
                                contexts.push(Context {
                                    counterpoint_motion,
                                    counterpoint_span,
                                    counterpoint_degree,
                                    cantus_firmus_motion,
                                    cantus_firmus_span,
                                    cantus_firmus_degree,
                                });
                            }
                        }
                    }
                }
            }
        }

        let index = contexts
            .iter()
            .enumerate()
            .map(|(i, context)| (*context, i))
            .collect();

        ContextCatalog { contexts, index }
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn get(&self, index: usize) -> Context {
        self.contexts[index]
    }

    /// Finds the catalog position of a context by value. Every context built
    /// from actual notes resolves to exactly one catalog entry.
    pub fn index_of(&self, context: Context) -> Option<usize> {
        self.index.get(&context).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.contexts.iter()
    }
}

/// The fixed catalog of every next-step choice: all both-voice combinations
/// plus the two one-voice-only (oblique) families.
pub struct ChoiceCatalog {
    choices: Vec<Choice>,
}

impl ChoiceCatalog {
    pub fn new() -> ChoiceCatalog {
        const MOTIONS: [NoteMotion; 2] = [NoteMotion::Ascending, NoteMotion::Descending];

        let mut choices = Vec::new();

        // Both voices move.
        for counterpoint_degree_change in 1..=MAX_DEGREE_CHANGE {
            for cantus_firmus_degree_change in 1..=MAX_DEGREE_CHANGE {
                for counterpoint_motion in MOTIONS {
                    for cantus_firmus_motion in MOTIONS {
                        choices.push(Choice {
                            counterpoint_motion,
                            cantus_firmus_motion,
                            counterpoint_degree_change,
                            cantus_firmus_degree_change,
                        });
                    }
                }
            }
        }

        // Only the counterpoint moves.
        for counterpoint_degree_change in 1..=MAX_DEGREE_CHANGE {
            for counterpoint_motion in MOTIONS {
                choices.push(Choice {
                    counterpoint_motion,
                    cantus_firmus_motion: NoteMotion::Oblique,
                    counterpoint_degree_change,
                    cantus_firmus_degree_change: 0,
                });
            }
        }

        // Only the cantus firmus moves.
        for cantus_firmus_degree_change in 1..=MAX_DEGREE_CHANGE {
            for cantus_firmus_motion in MOTIONS {
                choices.push(Choice {
                    counterpoint_motion: NoteMotion::Oblique,
                    cantus_firmus_motion,
                    counterpoint_degree_change: 0,
                    cantus_firmus_degree_change,
                });
            }
        }

        ChoiceCatalog { choices }
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn get(&self, index: usize) -> Choice {
        self.choices[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Choice> {
        self.choices.iter()
    }
}

/// Both catalogs, built once at startup and shared read-only everywhere.
pub struct Catalogs {
    pub contexts: ContextCatalog,
    pub choices: ChoiceCatalog,
}

impl Catalogs {
    pub fn new() -> Catalogs {
        Catalogs {
            contexts: ContextCatalog::new(),
            choices: ChoiceCatalog::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn context_catalog_is_the_full_cartesian_product() {
        let catalog = ContextCatalog::new();
        assert_eq!(catalog.len(), 3 * 2 * 7 * 3 * 2 * 7);

        let unique: HashSet<Context> = catalog.iter().copied().collect();
        assert_eq!(unique.len(), catalog.len());
    }

    #[test]
    fn choice_catalog_has_both_voice_and_oblique_families() {
        let catalog = ChoiceCatalog::new();
        // 36 both-voice combinations plus 6 counterpoint-only plus 6
        // cantus-firmus-only.
        assert_eq!(catalog.len(), 48);

        let unique: HashSet<Choice> = catalog.iter().copied().collect();
        assert_eq!(unique.len(), catalog.len());

        for choice in catalog.iter() {
            if choice.counterpoint_motion == NoteMotion::Oblique {
                assert_eq!(choice.counterpoint_degree_change, 0);
            }
            if choice.cantus_firmus_motion == NoteMotion::Oblique {
                assert_eq!(choice.cantus_firmus_degree_change, 0);
            }
            assert!(
                choice.counterpoint_degree_change != 0 || choice.cantus_firmus_degree_change != 0
            );
        }
    }

    #[test]
    fn every_context_resolves_to_a_catalog_index() {
        let catalog = ContextCatalog::new();

        for (i, context) in catalog.iter().enumerate() {
            assert_eq!(catalog.index_of(*context), Some(i));
        }

        assert!(catalog.index_of(Context::start()).is_some());
    }

    #[test]
    fn context_between_notes_matches_motion_and_degree() {
        let context = Context::between(1, 15, 2, 12);

        assert_eq!(context.cantus_firmus_motion, NoteMotion::Ascending);
        assert_eq!(context.cantus_firmus_span, MotionSpan::Step);
        assert_eq!(context.cantus_firmus_degree, ScaleDegree::Second);
        assert_eq!(context.counterpoint_motion, NoteMotion::Descending);
        assert_eq!(context.counterpoint_span, MotionSpan::Leap);
        assert_eq!(context.counterpoint_degree, ScaleDegree::Fifth);
    }
}
