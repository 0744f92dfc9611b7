use crate::decimal::Decimal;

/// Running statistics for one key.
///
/// Records are values: folding a reading in produces a new record rather than
/// mutating the old one, so whatever a map slot holds is always a consistent
/// snapshot. `min` and `max` carry meaning only once `count > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatRecord {
    pub min: Decimal,
    pub max: Decimal,
    pub sum: Decimal,
    pub count: u64,
}

impl StatRecord {
    /// Identity element: combining with it changes nothing.
    pub const EMPTY: StatRecord = StatRecord {
        min: Decimal::ZERO,
        max: Decimal::ZERO,
        sum: Decimal::ZERO,
        count: 0,
    };

    pub fn of(value: Decimal) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    #[must_use]
    pub fn with_value(self, value: Decimal) -> Self {
        if self.is_empty() {
            return Self::of(value);
        }
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
            sum: self.sum + value,
            count: self.count + 1,
        }
    }

    #[must_use]
    pub fn combine(self, other: StatRecord) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            sum: self.sum + other.sum,
            count: self.count + other.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean in tenths as reported: the sum is rounded half-up to tenths
    /// first, then the quotient is rounded half-up again.
    pub fn mean_tenths(&self) -> i128 {
        if self.count == 0 {
            return 0;
        }
        let count = self.count as i128;
        // floor(sum / count + 1/2)
        (2 * self.sum.round_tenths() + count).div_euclid(2 * count)
    }
}

impl Default for StatRecord {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn fold(values: &[&str]) -> StatRecord {
        values
            .iter()
            .map(|v| d(v))
            .fold(StatRecord::EMPTY, StatRecord::with_value)
    }

    #[test]
    fn identity_is_neutral() {
        let r = fold(&["4.5", "-1.0"]);
        assert_eq!(r.combine(StatRecord::EMPTY), r);
        assert_eq!(StatRecord::EMPTY.combine(r), r);
        assert!(StatRecord::default().is_empty());
    }

    #[test]
    fn with_value_tracks_bounds() {
        let r = fold(&["3.0", "-2.5", "7.25", "0.0"]);
        assert_eq!(r.min, d("-2.5"));
        assert_eq!(r.max, d("7.25"));
        assert_eq!(r.sum, d("7.75"));
        assert_eq!(r.count, 4);
    }

    #[test]
    fn positive_first_value_sets_min() {
        // the zeroed identity fields must not leak into the bounds
        let r = fold(&["5.0", "6.0"]);
        assert_eq!((r.min, r.max), (d("5"), d("6")));
        let r = fold(&["-5.0", "-6.0"]);
        assert_eq!((r.min, r.max), (d("-6"), d("-5")));
    }

    #[test]
    fn combine_matches_sequential_fold() {
        let left = fold(&["0.1", "9.0"]);
        let right = fold(&["-4.0", "0.2", "0.3"]);
        let all = fold(&["0.1", "9.0", "-4.0", "0.2", "0.3"]);
        assert_eq!(left.combine(right), all);
        assert_eq!(right.combine(left), all);
        assert_eq!(all.sum, d("5.6"));
    }

    #[test]
    fn mean_rounds_sum_then_quotient() {
        assert_eq!(fold(&["12.0", "14.0"]).mean_tenths(), 130);
        // 5.0 / 3 = 1.666..
        assert_eq!(fold(&["1.0", "2.0", "2.0"]).mean_tenths(), 17);
        // sum 0.25 rounds to 0.3 before dividing
        assert_eq!(fold(&["0.25"]).mean_tenths(), 3);
        assert_eq!(fold(&["-1.5", "-1.5"]).mean_tenths(), -15);
        assert_eq!(StatRecord::EMPTY.mean_tenths(), 0);
    }
}
