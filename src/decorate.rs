use rand::prelude::*;

use crate::composer::Composition;
use crate::notes::ScaleDegree;

/// An ornament applied to a finished composition. Decorators only look at
/// melodic motion, so they run after evaluation and never affect scoring.
pub trait Decorator {
    /// The ornament notes for `current_note` moving to `next_note`, or an
    /// empty list when the figure does not apply or the coin flip says no.
    fn decorations(&self, current_note: i32, next_note: i32, rng: &mut dyn RngCore) -> Vec<i32>;

    /// Walks consecutive note pairs and fills in ornaments for both voices.
    /// A voice that already carries a decoration is left alone.
    fn decorate(&self, composition: &mut Composition, rng: &mut dyn RngCore) {
        let pairs = composition.pairs_mut();

        for i in 0..pairs.len().saturating_sub(1) {
            let next_counterpoint = pairs[i + 1].counterpoint;
            let next_cantus_firmus = pairs[i + 1].cantus_firmus;
            let current = &mut pairs[i];

            if current.counterpoint_decorations.is_empty() {
                current.counterpoint_decorations =
                    self.decorations(current.counterpoint, next_counterpoint, rng);
            }

            if current.cantus_firmus_decorations.is_empty() {
                current.cantus_firmus_decorations =
                    self.decorations(current.cantus_firmus, next_cantus_firmus, rng);
            }
        }
    }
}

fn coin_flip(rng: &mut dyn RngCore) -> bool {
    rng.random_bool(0.5)
}

/// Fills the gap of a melodic third with the note in between.
pub struct PassingTone;

impl Decorator for PassingTone {
    fn decorations(&self, current_note: i32, next_note: i32, rng: &mut dyn RngCore) -> Vec<i32> {
        let current = ScaleDegree::from_note(current_note);
        let next = ScaleDegree::from_note(next_note);

        if !current.is_third_with(next) || !coin_flip(rng) {
            return Vec::new();
        }

        vec![(current_note + next_note) / 2]
    }
}

/// A quick dip to the lower (or upper) neighbor before a stepwise move.
pub struct Mordent;

impl Decorator for Mordent {
    fn decorations(&self, current_note: i32, next_note: i32, rng: &mut dyn RngCore) -> Vec<i32> {
        let current = ScaleDegree::from_note(current_note);
        let next = ScaleDegree::from_note(next_note);

        if !current.is_adjacent_to(next) || !coin_flip(rng) {
            return Vec::new();
        }

        if current_note < next_note {
            vec![current_note - 1, current_note]
        } else if current != ScaleDegree::Sixth {
            vec![current_note + 1, current_note]
        } else {
            Vec::new()
        }
    }
}

/// A leaning figure around the current note before a stepwise move.
pub struct Appogiatura;

impl Decorator for Appogiatura {
    fn decorations(&self, current_note: i32, next_note: i32, rng: &mut dyn RngCore) -> Vec<i32> {
        let current = ScaleDegree::from_note(current_note);
        let next = ScaleDegree::from_note(next_note);

        if !current.is_adjacent_to(next) || !coin_flip(rng) {
            return Vec::new();
        }

        if current_note < next_note {
            vec![current_note + 1, current_note - 1, current_note]
        } else if current != ScaleDegree::Sixth {
            vec![current_note - 1, current_note + 1, current_note]
        } else {
            Vec::new()
        }
    }
}

/// Applies every ornament type in a fixed order. Because each voice only
/// takes its first decoration, earlier figures win over later ones.
pub fn decorate_composition(composition: &mut Composition, rng: &mut dyn RngCore) {
    PassingTone.decorate(composition, rng);
    Mordent.decorate(composition, rng);
    Appogiatura.decorate(composition, rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Choice;
    use rand::rngs::StdRng;

    fn composition_of(pairs: &[(i32, i32)]) -> Composition {
        let mut composition = Composition::new();
        for &(cantus_firmus, counterpoint) in pairs {
            let context = composition.current_context();
            composition.add_notes(cantus_firmus, counterpoint, context, Choice::default());
        }
        composition
    }

    fn first_flip<F: Fn(&mut StdRng) -> Vec<i32>>(produce: F) -> Vec<i32> {
        // Try seeds until the coin flip lands heads; the figure itself is
        // deterministic once it does.
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let decorations = produce(&mut rng);
            if !decorations.is_empty() {
                return decorations;
            }
        }
        panic!("no seed produced a decoration");
    }

    #[test]
    fn passing_tone_fills_a_third() {
        let decorations = first_flip(|rng| PassingTone.decorations(1, 3, rng));
        assert_eq!(decorations, vec![2]);
    }

    #[test]
    fn passing_tone_ignores_steps_and_leaps() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..32 {
            assert!(PassingTone.decorations(1, 2, &mut rng).is_empty());
            assert!(PassingTone.decorations(1, 5, &mut rng).is_empty());
        }
    }

    #[test]
    fn mordent_dips_below_on_the_way_up() {
        let decorations = first_flip(|rng| Mordent.decorations(3, 4, rng));
        assert_eq!(decorations, vec![2, 3]);
    }

    #[test]
    fn mordent_rises_above_on_the_way_down() {
        let decorations = first_flip(|rng| Mordent.decorations(4, 3, rng));
        assert_eq!(decorations, vec![5, 4]);
    }

    #[test]
    fn descending_mordent_skips_the_sixth() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..32 {
            assert!(Mordent.decorations(6, 5, &mut rng).is_empty());
        }
    }

    #[test]
    fn appogiatura_leans_around_the_note() {
        let ascending = first_flip(|rng| Appogiatura.decorations(3, 4, rng));
        assert_eq!(ascending, vec![4, 2, 3]);

        let descending = first_flip(|rng| Appogiatura.decorations(4, 3, rng));
        assert_eq!(descending, vec![3, 5, 4]);
    }

    #[test]
    fn decoration_only_fills_empty_slots() {
        let mut composition = composition_of(&[(1, 1), (3, 2), (5, 3)]);
        composition.pairs_mut()[0].cantus_firmus_decorations = vec![99];

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..32 {
            decorate_composition(&mut composition, &mut rng);
        }

        assert_eq!(composition.pairs()[0].cantus_firmus_decorations, vec![99]);
        // The last pair has no successor and is never decorated.
        assert!(composition.pairs()[2].cantus_firmus_decorations.is_empty());
        assert!(composition.pairs()[2].counterpoint_decorations.is_empty());
    }
}
