use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised while turning raw exercise input into a scored part.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score must be between 0 and 100, got {0}")]
    OutOfRange(i64),

    #[error("unknown exercise part: {0}")]
    UnknownPart(String),

    #[error("example part requires an index")]
    MissingExampleIndex,

    #[error("a score was given without an exercise part")]
    MissingPart,

    #[error("an exercise part was given without a score")]
    MissingScore,
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// A percentage score in `0..=100`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const ZERO: Score = Score(0);

    /// Validates a raw score.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` for values outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, ScoreError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(ScoreError::OutOfRange(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_perfect(self) -> bool {
        self.0 >= 100
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

//
// ─── PARTS ─────────────────────────────────────────────────────────────────────
//

/// Scoreable sub-unit of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScorePart {
    /// The lesson's primary reading exercise.
    Main,
    /// A reading-passage exercise.
    Passage,
    /// One of several indexed example exercises.
    Example(u32),
}

impl ScorePart {
    /// Builds a part from its wire tag (`main`, `passage`, `example`) and
    /// optional example index.
    ///
    /// An index supplied alongside `main` or `passage` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::UnknownPart` for unrecognised tags and
    /// `ScoreError::MissingExampleIndex` for `example` without an index.
    pub fn from_tag(tag: &str, index: Option<u32>) -> Result<Self, ScoreError> {
        match tag {
            "main" => Ok(Self::Main),
            "passage" => Ok(Self::Passage),
            "example" => index.map(Self::Example).ok_or(ScoreError::MissingExampleIndex),
            other => Err(ScoreError::UnknownPart(other.to_string())),
        }
    }
}

/// A scored attempt at one part of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartResult {
    pub part: ScorePart,
    pub score: Score,
}

impl PartResult {
    #[must_use]
    pub fn new(part: ScorePart, score: Score) -> Self {
        Self { part, score }
    }

    /// Validates the loose triple an exercise client submits.
    ///
    /// Score and part travel together: both absent means a plain completion
    /// (`Ok(None)`), exactly one present is rejected.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError` if the score is out of range, the part is unknown,
    /// an example index is missing, or only one of score/part is provided.
    pub fn from_raw(
        part: Option<&str>,
        part_index: Option<u32>,
        score: Option<i64>,
    ) -> Result<Option<Self>, ScoreError> {
        match (part, score) {
            (None, None) => Ok(None),
            (None, Some(_)) => Err(ScoreError::MissingPart),
            (Some(_), None) => Err(ScoreError::MissingScore),
            (Some(tag), Some(raw)) => {
                let part = ScorePart::from_tag(tag, part_index)?;
                let score = Score::new(raw)?;
                Ok(Some(Self { part, score }))
            }
        }
    }
}

//
// ─── BREAKDOWN ─────────────────────────────────────────────────────────────────
//

/// Best score reached on each part of a single lesson.
///
/// Every field only ever grows: a new attempt keeps the max of the old and
/// new values for that part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonScoreBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    main: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    passage: Option<Score>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    examples: BTreeMap<u32, Score>,
}

impl LessonScoreBreakdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn main(&self) -> Option<Score> {
        self.main
    }

    #[must_use]
    pub fn passage(&self) -> Option<Score> {
        self.passage
    }

    #[must_use]
    pub fn examples(&self) -> &BTreeMap<u32, Score> {
        &self.examples
    }

    /// Merges `result` in place, keeping the best score for that part.
    pub fn apply(&mut self, result: PartResult) {
        let slot = match result.part {
            ScorePart::Main => &mut self.main,
            ScorePart::Passage => &mut self.passage,
            ScorePart::Example(idx) => {
                let entry = self.examples.entry(idx).or_insert(Score::ZERO);
                *entry = (*entry).max(result.score);
                return;
            }
        };
        *slot = Some(slot.unwrap_or(Score::ZERO).max(result.score));
    }

    /// Every part that has been scored so far.
    pub fn attempted(&self) -> impl Iterator<Item = Score> + '_ {
        self.main
            .into_iter()
            .chain(self.passage)
            .chain(self.examples.values().copied())
    }

    /// Arithmetic mean of all attempted parts, rounded half-up.
    ///
    /// `None` when no part has been attempted yet.
    #[must_use]
    pub fn aggregate(&self) -> Option<Score> {
        let (sum, count) = self
            .attempted()
            .fold((0_u64, 0_u64), |(sum, count), s| {
                (sum + u64::from(s.value()), count + 1)
            });
        if count == 0 {
            return None;
        }
        let rounded = (2 * sum + count) / (2 * count);
        u8::try_from(rounded).ok().map(Score)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn score(v: i64) -> Score {
        Score::new(v).unwrap()
    }

    fn breakdown(results: &[(ScorePart, i64)]) -> LessonScoreBreakdown {
        let mut b = LessonScoreBreakdown::new();
        for &(part, v) in results {
            b.apply(PartResult::new(part, score(v)));
        }
        b
    }

    #[test]
    fn score_rejects_out_of_range() {
        assert_eq!(Score::new(101), Err(ScoreError::OutOfRange(101)));
        assert_eq!(Score::new(-1), Err(ScoreError::OutOfRange(-1)));
        assert!(Score::new(100).unwrap().is_perfect());
        assert!(!score(99).is_perfect());
    }

    #[test]
    fn part_from_tag_requires_index_for_examples() {
        assert_eq!(ScorePart::from_tag("main", None).unwrap(), ScorePart::Main);
        assert_eq!(
            ScorePart::from_tag("example", Some(3)).unwrap(),
            ScorePart::Example(3)
        );
        assert_eq!(
            ScorePart::from_tag("example", None),
            Err(ScoreError::MissingExampleIndex)
        );
        assert!(matches!(
            ScorePart::from_tag("quiz", None),
            Err(ScoreError::UnknownPart(_))
        ));
    }

    #[test]
    fn part_result_requires_score_and_part_together() {
        assert_eq!(PartResult::from_raw(None, None, None).unwrap(), None);
        assert_eq!(
            PartResult::from_raw(None, None, Some(80)),
            Err(ScoreError::MissingPart)
        );
        assert_eq!(
            PartResult::from_raw(Some("main"), None, None),
            Err(ScoreError::MissingScore)
        );
        let parsed = PartResult::from_raw(Some("passage"), None, Some(55))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.part, ScorePart::Passage);
        assert_eq!(parsed.score.value(), 55);
    }

    #[test]
    fn apply_keeps_the_best_score_per_part() {
        let mut b = LessonScoreBreakdown::new();
        b.apply(PartResult::new(ScorePart::Main, score(90)));
        b.apply(PartResult::new(ScorePart::Main, score(40)));
        b.apply(PartResult::new(ScorePart::Example(2), score(30)));
        b.apply(PartResult::new(ScorePart::Example(2), score(70)));

        assert_eq!(b.main(), Some(score(90)));
        assert_eq!(b.examples().get(&2), Some(&score(70)));
        assert_eq!(b.passage(), None);
    }

    #[test]
    fn aggregate_is_rounded_mean_of_attempted_parts() {
        let mut b = breakdown(&[(ScorePart::Main, 80), (ScorePart::Passage, 60)]);
        assert_eq!(b.aggregate(), Some(score(70)));

        // (80 + 60 + 75) / 3 = 71.67
        b.apply(PartResult::new(ScorePart::Example(0), score(75)));
        assert_eq!(b.aggregate(), Some(score(72)));
    }

    #[test]
    fn aggregate_rounds_half_up() {
        let b = breakdown(&[(ScorePart::Main, 70), (ScorePart::Passage, 71)]);
        assert_eq!(b.aggregate(), Some(score(71)));
    }

    #[test]
    fn aggregate_is_none_without_attempts() {
        assert_eq!(LessonScoreBreakdown::new().aggregate(), None);
    }

    #[test]
    fn reapplying_same_result_is_idempotent() {
        let once = breakdown(&[(ScorePart::Passage, 65)]);
        let mut twice = once.clone();
        twice.apply(PartResult::new(ScorePart::Passage, score(65)));
        assert_eq!(once, twice);
        assert_eq!(once.aggregate(), twice.aggregate());
    }

    #[test]
    fn breakdown_json_uses_string_example_keys() {
        let b = breakdown(&[(ScorePart::Main, 90), (ScorePart::Example(1), 50)]);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json, serde_json::json!({ "main": 90, "examples": { "1": 50 } }));

        let back: LessonScoreBreakdown = serde_json::from_value(json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn breakdown_json_rejects_out_of_range_scores() {
        let err = serde_json::from_value::<LessonScoreBreakdown>(serde_json::json!({ "main": 140 }));
        assert!(err.is_err());
    }
}
