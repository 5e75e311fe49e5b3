use chrono::{DateTime, Utc};

use crate::ledger::PointsEarned;
use crate::model::{BadgeId, LearnerProgress, LessonId, PartResult, Score};

//
// ─── EVENT ─────────────────────────────────────────────────────────────────────
//

/// A learner finished (part of) a lesson.
///
/// `result` is `None` for exercises that only report completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteLesson {
    pub lesson_id: LessonId,
    pub result: Option<PartResult>,
}

impl CompleteLesson {
    #[must_use]
    pub fn new(lesson_id: LessonId, result: Option<PartResult>) -> Self {
        Self { lesson_id, result }
    }

    #[must_use]
    pub fn scored(lesson_id: LessonId, result: PartResult) -> Self {
        Self {
            lesson_id,
            result: Some(result),
        }
    }
}

//
// ─── APPLIED COMPLETION ────────────────────────────────────────────────────────
//

/// Outcome of folding one event into a learner's progress.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCompletion {
    pub progress: LearnerProgress,
    pub is_new_lesson: bool,
    pub previous_score: Option<Score>,
    pub lesson_score: Option<Score>,
    pub newly_unlocked: Vec<BadgeId>,
    pub points: PointsEarned,
}

//
// ─── ACCUMULATOR ───────────────────────────────────────────────────────────────
//

/// Folds a completion event into `state` and returns the next state.
///
/// Steps, all on an in-memory copy:
/// 1. mark the lesson completed (remembering whether it is new),
/// 2. merge the part score and recompute the lesson aggregate,
/// 3. unlock badges whose rules now hold,
/// 4. add the points earned,
/// 5. stamp `last_activity`.
///
/// Persisting the result and syncing the leaderboard are left to the caller.
///
/// # Examples
///
/// ```
/// # use literacy_core::accumulator::{apply_completion, CompleteLesson};
/// # use literacy_core::model::{LearnerProgress, LessonId, PartResult, Score, ScorePart, Username};
/// # use literacy_core::time::fixed_now;
/// let state = LearnerProgress::new(Username::placeholder(1), fixed_now());
/// let event = CompleteLesson::scored(
///     LessonId::parse("bai1").unwrap(),
///     PartResult::new(ScorePart::Main, Score::new(90).unwrap()),
/// );
/// let applied = apply_completion(&state, &event, fixed_now());
/// assert_eq!(applied.progress.points(), 240);
/// ```
#[must_use]
pub fn apply_completion(
    state: &LearnerProgress,
    event: &CompleteLesson,
    now: DateTime<Utc>,
) -> AppliedCompletion {
    let mut next = state.clone();
    let lesson = &event.lesson_id;

    let is_new_lesson = next.mark_completed(lesson);

    let previous_score = next.score(lesson);
    if let Some(result) = event.result {
        next.record_part(lesson, result);
    }
    let lesson_score = next.score(lesson);

    let newly_unlocked = next.unlock_earned_badges();

    // A plain completion leaves the aggregate untouched, so it earns no improvement.
    let improved_to = event.result.and(lesson_score);
    let points = PointsEarned::compute(
        is_new_lesson,
        previous_score,
        improved_to,
        newly_unlocked.len(),
    );
    next.add_points(points.total());
    next.touch(now);

    AppliedCompletion {
        progress: next,
        is_new_lesson,
        previous_score,
        lesson_score,
        newly_unlocked,
        points,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::model::{ScorePart, Username};
    use crate::time::fixed_now;

    fn lesson(id: &str) -> LessonId {
        LessonId::parse(id).unwrap()
    }

    fn scored(id: &str, part: ScorePart, score: i64) -> CompleteLesson {
        CompleteLesson::scored(lesson(id), PartResult::new(part, Score::new(score).unwrap()))
    }

    fn empty() -> LearnerProgress {
        LearnerProgress::new(Username::placeholder(5), fixed_now())
    }

    fn run(state: &LearnerProgress, events: &[CompleteLesson]) -> LearnerProgress {
        events.iter().fold(state.clone(), |acc, e| {
            apply_completion(&acc, e, fixed_now()).progress
        })
    }

    #[test]
    fn first_completion_awards_lesson_improvement_and_badge() {
        let applied = apply_completion(&empty(), &scored("bai1", ScorePart::Main, 90), fixed_now());

        let p = &applied.progress;
        assert!(applied.is_new_lesson);
        assert!(p.is_completed(&lesson("bai1")));
        assert_eq!(p.score(&lesson("bai1")), Some(Score::new(90).unwrap()));
        assert_eq!(applied.newly_unlocked, vec![BadgeId::FirstStep]);
        assert_eq!(applied.points.lesson_completion, 100);
        assert_eq!(applied.points.improvement, 90);
        assert_eq!(applied.points.badges, 50);
        assert_eq!(p.points(), 240);
    }

    #[test]
    fn lower_repeat_changes_nothing_but_activity() {
        let first = apply_completion(&empty(), &scored("bai1", ScorePart::Main, 90), fixed_now());
        let later = fixed_now() + Duration::minutes(5);
        let second = apply_completion(&first.progress, &scored("bai1", ScorePart::Main, 40), later);

        let p = &second.progress;
        assert!(!second.is_new_lesson);
        assert_eq!(
            p.breakdown(&lesson("bai1")).unwrap().main(),
            Some(Score::new(90).unwrap())
        );
        assert_eq!(p.score(&lesson("bai1")), Some(Score::new(90).unwrap()));
        assert_eq!(second.points.total(), 0);
        assert_eq!(p.points(), 240);
        assert_eq!(p.last_activity(), later);
    }

    #[test]
    fn fifth_distinct_lesson_unlocks_dedicated() {
        let four: Vec<_> = (1..=4).map(|i| CompleteLesson::new(lesson(&format!("bai{i}")), None)).collect();
        let state = run(&empty(), &four);
        assert!(!state.has_badge(BadgeId::Dedicated));

        let applied = apply_completion(&state, &CompleteLesson::new(lesson("bai5"), None), fixed_now());
        assert_eq!(applied.newly_unlocked, vec![BadgeId::Dedicated]);
        assert_eq!(applied.points.total(), 150);
        assert_eq!(applied.progress.points(), state.points() + 150);
    }

    #[test]
    fn perfect_score_unlocks_star_student() {
        let applied = apply_completion(&empty(), &scored("bai1", ScorePart::Passage, 100), fixed_now());
        assert!(applied.newly_unlocked.contains(&BadgeId::StarStudent));
        // 100 lesson + 100 improvement + 2 badges
        assert_eq!(applied.progress.points(), 300);
    }

    #[test]
    fn improvement_is_measured_on_the_aggregate() {
        let state = run(&empty(), &[scored("bai1", ScorePart::Main, 80)]);
        // Adding a weaker passage lowers the aggregate mean: no improvement points.
        let applied = apply_completion(&state, &scored("bai1", ScorePart::Passage, 60), fixed_now());
        assert_eq!(applied.lesson_score, Some(Score::new(70).unwrap()));
        assert_eq!(applied.points.total(), 0);

        // Raising the passage lifts the aggregate from 70 to 80.
        let applied = apply_completion(&applied.progress, &scored("bai1", ScorePart::Passage, 80), fixed_now());
        assert_eq!(applied.points.improvement, 10);
    }

    #[test]
    fn plain_completion_of_scored_lesson_earns_nothing() {
        let state = run(&empty(), &[scored("bai1", ScorePart::Main, 90)]);
        let applied = apply_completion(&state, &CompleteLesson::new(lesson("bai1"), None), fixed_now());
        assert_eq!(applied.points.total(), 0);
    }

    #[test]
    fn resubmitting_same_part_score_is_idempotent() {
        let event = scored("bai2", ScorePart::Example(3), 65);
        let once = run(&empty(), std::slice::from_ref(&event));
        let twice = run(&once, std::slice::from_ref(&event));
        assert_eq!(once.detailed_scores(), twice.detailed_scores());
        assert_eq!(once.scores(), twice.scores());
        assert_eq!(once.points(), twice.points());
    }

    #[test]
    fn points_parts_and_badges_never_regress() {
        let events = [
            scored("bai1", ScorePart::Main, 50),
            scored("bai1", ScorePart::Main, 20),
            scored("bai1", ScorePart::Example(0), 100),
            scored("bai1", ScorePart::Example(0), 10),
            scored("bai2", ScorePart::Passage, 100),
            CompleteLesson::new(lesson("bai3"), None),
            scored("bai2", ScorePart::Passage, 0),
            scored("bai1", ScorePart::Passage, 30),
        ];

        let mut state = empty();
        for event in &events {
            let next = apply_completion(&state, event, fixed_now()).progress;

            assert!(next.points() >= state.points());
            for badge in state.badges() {
                if badge.is_unlocked() {
                    assert!(next.has_badge(badge.id()));
                }
            }
            for (lesson_id, before) in state.detailed_scores() {
                let after = next.breakdown(lesson_id).unwrap();
                assert!(after.main() >= before.main());
                assert!(after.passage() >= before.passage());
                for (idx, score) in before.examples() {
                    assert!(after.examples()[idx] >= *score);
                }
            }
            state = next;
        }
        assert_eq!(state.completed_lessons().len(), 3);
    }

    #[test]
    fn tenth_lesson_unlocks_master_once() {
        let ten: Vec<_> = (1..=10).map(|i| CompleteLesson::new(lesson(&format!("l{i}")), None)).collect();
        let state = run(&empty(), &ten);
        assert!(state.has_badge(BadgeId::Master));
        // 10 lessons + first_step + dedicated + master
        assert_eq!(state.points(), 10 * 100 + 3 * 50);

        let again = apply_completion(&state, &CompleteLesson::new(lesson("l11"), None), fixed_now());
        assert!(again.newly_unlocked.is_empty());
    }
}
