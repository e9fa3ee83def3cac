use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Every choice in a freshly generated row is worth 1000 units of roll
/// space on average; a row of `n` choices partitions `[0, 1000n - 1]`.
pub const WEIGHT_PER_CHOICE: i64 = 1000;

/// A weight and the contiguous slice of roll space it occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedRange {
    pub weight: i64,
    pub floor: i64,
    pub ceiling: i64,
}

impl WeightedRange {
    pub fn contains(&self, roll: i64) -> bool {
        self.floor <= roll && roll <= self.ceiling
    }
}

/// The nominal total roll space for a row of `count` choices.
pub fn target_sum(count: usize) -> i64 {
    WEIGHT_PER_CHOICE * count as i64
}

/// Generates `count` positive weights summing to exactly `1000 * count`,
/// with contiguous, non-overlapping ranges derived from them.
///
/// Weights start as uniform draws, get scaled down to the target sum, and
/// the rounding shortfall is paid back one unit at a time to randomly
/// chosen weights. Any weight left at zero takes a unit from a larger one
/// so that every choice keeps at least one reachable slot.
pub fn generate_partition(count: usize, rng: &mut impl Rng) -> Vec<WeightedRange> {
    let target = target_sum(count);

    let mut weights: Vec<i64> = (0..count).map(|_| rng.random_range(0..target)).collect();

    let mut sum: i64 = weights.iter().sum();
    if sum > 0 {
        let scale = target as f64 / sum as f64;
        for weight in weights.iter_mut() {
            *weight = (*weight as f64 * scale) as i64;
        }
    }

    sum = weights.iter().sum();
    while sum < target {
        let i = rng.random_range(0..count);
        weights[i] += 1;
        sum += 1;
    }
    while sum > target {
        let i = rng.random_range(0..count);
        if weights[i] > 0 {
            weights[i] -= 1;
            sum -= 1;
        }
    }

    while let Some(empty) = weights.iter().position(|&weight| weight == 0) {
        let donors: Vec<usize> = (0..count).filter(|&i| weights[i] > 1).collect();
        let donor = *donors
            .choose(rng)
            .expect("a zero weight always has a donor when the sum is 1000 per choice");
        weights[donor] -= 1;
        weights[empty] += 1;
    }

    let mut ranges = Vec::with_capacity(count);
    let mut floor = 0;
    for &weight in &weights {
        ranges.push(WeightedRange {
            weight,
            floor,
            ceiling: floor + weight - 1,
        });
        floor += weight;
    }

    ranges
}

/// Draws a uniform integer in `[0, space)`.
pub fn roll(space: i64, rng: &mut impl Rng) -> i64 {
    rng.random_range(0..space)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn assert_valid_partition(ranges: &[WeightedRange], count: usize) {
        let sum: i64 = ranges.iter().map(|range| range.weight).sum();
        assert_eq!(sum, target_sum(count));

        assert_eq!(ranges[0].floor, 0);
        assert_eq!(ranges[ranges.len() - 1].ceiling, target_sum(count) - 1);

        for range in ranges {
            assert!(range.weight >= 1);
            assert_eq!(range.ceiling - range.floor, range.weight - 1);
        }

        for pair in ranges.windows(2) {
            assert_eq!(pair[1].floor, pair[0].ceiling + 1);
        }
    }

    #[test]
    fn partitions_are_exact_and_contiguous() {
        let mut rng = StdRng::seed_from_u64(7);

        for count in [2, 5, 13, 48] {
            for _ in 0..50 {
                let ranges = generate_partition(count, &mut rng);
                assert_eq!(ranges.len(), count);
                assert_valid_partition(&ranges, count);
            }
        }
    }

    #[test]
    fn single_choice_takes_the_whole_space() {
        let mut rng = StdRng::seed_from_u64(7);
        let ranges = generate_partition(1, &mut rng);

        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].weight, WEIGHT_PER_CHOICE);
        assert_eq!(ranges[0].floor, 0);
        assert_eq!(ranges[0].ceiling, WEIGHT_PER_CHOICE - 1);
    }

    #[test]
    fn every_roll_lands_inside_some_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let ranges = generate_partition(48, &mut rng);

        for _ in 0..1000 {
            let value = roll(target_sum(48), &mut rng);
            assert!(ranges.iter().any(|range| range.contains(value)));
        }
    }

    #[test]
    fn two_partitions_both_satisfy_the_invariant_without_matching() {
        let mut rng = StdRng::seed_from_u64(13);
        let first = generate_partition(48, &mut rng);
        let second = generate_partition(48, &mut rng);

        assert_valid_partition(&first, 48);
        assert_valid_partition(&second, 48);
    }
}
