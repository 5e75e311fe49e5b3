use serde::Serialize;

use crate::model::Score;

/// Flat bonus for the first completion of a lesson.
pub const LESSON_COMPLETION_BONUS: u64 = 100;

/// Bonus per badge unlocked.
pub const BADGE_UNLOCK_BONUS: u64 = 50;

//
// ─── POINTS EARNED ─────────────────────────────────────────────────────────────
//

/// Points awarded by a single completion event, split by rule.
///
/// # Examples
///
/// ```
/// # use literacy_core::ledger::PointsEarned;
/// # use literacy_core::model::Score;
/// let earned = PointsEarned::compute(true, None, Some(Score::new(90).unwrap()), 1);
/// assert_eq!(earned.total(), 240);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsEarned {
    pub lesson_completion: u64,
    pub improvement: u64,
    pub badges: u64,
}

impl PointsEarned {
    /// Applies the three point rules.
    ///
    /// - `+100` when the lesson was completed for the first time.
    /// - `+1` per percentage point the lesson aggregate rose; an unset
    ///   previous aggregate counts as 0, an unset new one earns nothing.
    /// - `+50` per badge that went from locked to unlocked.
    #[must_use]
    pub fn compute(
        is_new_lesson: bool,
        old_aggregate: Option<Score>,
        new_aggregate: Option<Score>,
        badges_unlocked: usize,
    ) -> Self {
        let lesson_completion = if is_new_lesson {
            LESSON_COMPLETION_BONUS
        } else {
            0
        };

        let improvement = match new_aggregate {
            Some(new) => {
                let old = old_aggregate.unwrap_or(Score::ZERO);
                u64::from(new.value().saturating_sub(old.value()))
            }
            None => 0,
        };

        let badges = u64::try_from(badges_unlocked)
            .unwrap_or(u64::MAX)
            .saturating_mul(BADGE_UNLOCK_BONUS);

        Self {
            lesson_completion,
            improvement,
            badges,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.lesson_completion
            .saturating_add(self.improvement)
            .saturating_add(self.badges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(v: i64) -> Option<Score> {
        Some(Score::new(v).unwrap())
    }

    #[test]
    fn new_lesson_bonus_only_on_first_completion() {
        assert_eq!(PointsEarned::compute(true, None, None, 0).total(), 100);
        assert_eq!(PointsEarned::compute(false, None, None, 0).total(), 0);
    }

    #[test]
    fn improvement_counts_only_increases() {
        assert_eq!(PointsEarned::compute(false, score(60), score(75), 0).improvement, 15);
        assert_eq!(PointsEarned::compute(false, score(75), score(75), 0).improvement, 0);
        assert_eq!(PointsEarned::compute(false, score(80), score(70), 0).improvement, 0);
        assert_eq!(PointsEarned::compute(false, None, score(42), 0).improvement, 42);
    }

    #[test]
    fn badges_are_fifty_each() {
        let earned = PointsEarned::compute(true, None, None, 2);
        assert_eq!(earned.badges, 100);
        assert_eq!(earned.total(), 200);
    }
}
