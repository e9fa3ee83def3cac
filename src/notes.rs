use serde::{Deserialize, Serialize};

/// The melodic motion used to arrive at a note from the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteMotion {
    Ascending,
    Descending,
    Oblique,
}

/// How far a single melodic motion travels: stepwise or a leap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionSpan {
    Step,
    Leap,
}

/// A degree of the diatonic scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleDegree {
    Root,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
}

/// The number of unique notes in the diatonic scale.
pub const NOTES_PER_SCALE: i32 = 7;

/// The maximum distance between two notes that still counts as stepwise.
pub const MAX_STEP_DISTANCE: i32 = 2;

impl ScaleDegree {
    pub const ALL: [ScaleDegree; 7] = [
        ScaleDegree::Root,
        ScaleDegree::Second,
        ScaleDegree::Third,
        ScaleDegree::Fourth,
        ScaleDegree::Fifth,
        ScaleDegree::Sixth,
        ScaleDegree::Seventh,
    ];

    /// Classifies a raw pitch into its scale degree. Pitches are plain
    /// integers where 1 is the root, so 8 wraps back to the root, 7 and 14
    /// are sevenths, and so on.
    pub fn from_note(note: i32) -> ScaleDegree {
        match note.rem_euclid(NOTES_PER_SCALE) {
            0 => ScaleDegree::Seventh,
            1 => ScaleDegree::Root,
            2 => ScaleDegree::Second,
            3 => ScaleDegree::Third,
            4 => ScaleDegree::Fourth,
            5 => ScaleDegree::Fifth,
            6 => ScaleDegree::Sixth,
            _ => unreachable!(),
        }
    }

    /// Are the two degrees neighbors in the scale?
    pub fn is_adjacent_to(self, other: ScaleDegree) -> bool {
        (self as i32 - other as i32).abs() == 1
    }

    /// Are the two degrees a third apart?
    pub fn is_third_with(self, other: ScaleDegree) -> bool {
        (self as i32 - other as i32).abs() == 2
    }

    /// Do the two degrees form a tritone (the fourth against the seventh)?
    pub fn is_tritone_with(self, other: ScaleDegree) -> bool {
        matches!(
            (self, other),
            (ScaleDegree::Seventh, ScaleDegree::Fourth) | (ScaleDegree::Fourth, ScaleDegree::Seventh)
        )
    }

    /// Do the two degrees form a seventh (the root against the seventh)?
    pub fn is_seventh_with(self, other: ScaleDegree) -> bool {
        matches!(
            (self, other),
            (ScaleDegree::Root, ScaleDegree::Seventh) | (ScaleDegree::Seventh, ScaleDegree::Root)
        )
    }

    /// Is the sonority of the two degrees dissonant? Seconds, sevenths and
    /// the tritone all count.
    pub fn is_dissonant_with(self, other: ScaleDegree) -> bool {
        self.is_adjacent_to(other) || self.is_tritone_with(other) || self.is_seventh_with(other)
    }

    /// Do the two degrees form a perfect interval?
    pub fn is_perfect_with(self, other: ScaleDegree) -> bool {
        use ScaleDegree::*;
        matches!(
            (self, other),
            (Root, Fifth)
                | (Fifth, Root)
                | (Second, Sixth)
                | (Sixth, Second)
                | (Third, Seventh)
                | (Seventh, Third)
                | (Fourth, Root)
                | (Root, Fourth)
        )
    }
}

/// The motion taken to get from one pitch to the next.
pub fn motion_between(previous_note: i32, current_note: i32) -> NoteMotion {
    if previous_note == current_note {
        NoteMotion::Oblique
    } else if previous_note < current_note {
        NoteMotion::Ascending
    } else {
        NoteMotion::Descending
    }
}

/// The span of the motion from one pitch to the next.
pub fn span_between(previous_note: i32, current_note: i32) -> MotionSpan {
    if (previous_note - current_note).abs() > MAX_STEP_DISTANCE {
        MotionSpan::Leap
    } else {
        MotionSpan::Step
    }
}

/// Do the two pitches form a perfect interval?
pub fn is_perfect_interval(left_note: i32, right_note: i32) -> bool {
    ScaleDegree::from_note(left_note).is_perfect_with(ScaleDegree::from_note(right_note))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_scale_degrees_across_octaves() {
        let cases = [
            (1, ScaleDegree::Root),
            (8, ScaleDegree::Root),
            (7, ScaleDegree::Seventh),
            (9, ScaleDegree::Second),
            (10, ScaleDegree::Third),
            (700025, ScaleDegree::Fourth),
            (12, ScaleDegree::Fifth),
            (13, ScaleDegree::Sixth),
            (14, ScaleDegree::Seventh),
            (3 + 7 * 1000, ScaleDegree::Third),
            (7001, ScaleDegree::Root),
            (7015, ScaleDegree::Root),
        ];

        for (note, expected) in cases {
            assert_eq!(ScaleDegree::from_note(note), expected, "note {}", note);
        }
    }

    #[test]
    fn motion_between_notes() {
        assert_eq!(motion_between(5, 6), NoteMotion::Ascending);
        assert_eq!(motion_between(6, 3), NoteMotion::Descending);
        assert_eq!(motion_between(6, 6), NoteMotion::Oblique);
    }

    #[test]
    fn span_between_notes() {
        assert_eq!(span_between(5, 6), MotionSpan::Step);
        assert_eq!(span_between(6, 6), MotionSpan::Step);
        assert_eq!(span_between(6, 4), MotionSpan::Step);
        assert_eq!(span_between(600, 500), MotionSpan::Leap);
        assert_eq!(span_between(500, 600), MotionSpan::Leap);
    }

    #[test]
    fn dissonance_covers_seconds_sevenths_and_tritone() {
        assert!(ScaleDegree::Root.is_dissonant_with(ScaleDegree::Second));
        assert!(ScaleDegree::Root.is_dissonant_with(ScaleDegree::Seventh));
        assert!(ScaleDegree::Fourth.is_dissonant_with(ScaleDegree::Seventh));
        assert!(!ScaleDegree::Root.is_dissonant_with(ScaleDegree::Third));
        assert!(!ScaleDegree::Root.is_dissonant_with(ScaleDegree::Fifth));
    }

    #[test]
    fn perfect_intervals_in_both_orders() {
        assert!(ScaleDegree::Root.is_perfect_with(ScaleDegree::Fifth));
        assert!(ScaleDegree::Fifth.is_perfect_with(ScaleDegree::Root));
        assert!(ScaleDegree::Fourth.is_perfect_with(ScaleDegree::Root));
        assert!(!ScaleDegree::Second.is_perfect_with(ScaleDegree::Third));
        assert!(is_perfect_interval(1, 5));
        assert!(!is_perfect_interval(2, 4));
    }
}
