use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::model::badge::{Badge, BadgeFacts, BadgeId};
use crate::model::ids::LessonId;
use crate::model::score::{LessonScoreBreakdown, PartResult, Score};

const MAX_USERNAME_CHARS: usize = 40;

//
// ─── USERNAME ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UsernameError {
    #[error("username cannot be empty")]
    Empty,

    #[error("username must be at most {max} characters")]
    TooLong { max: usize },
}

/// Display name shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Trims and validates a display name.
    ///
    /// # Errors
    ///
    /// Returns `UsernameError` if the name is blank or too long.
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        if trimmed.chars().count() > MAX_USERNAME_CHARS {
            return Err(UsernameError::TooLong {
                max: MAX_USERNAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Placeholder name handed to a learner before they pick one (`Bé 0`..`Bé 999`).
    #[must_use]
    pub fn placeholder(seed: u16) -> Self {
        Self(format!("Bé {}", seed % 1000))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//
// ─── LEARNER PROGRESS ──────────────────────────────────────────────────────────
//

/// Everything the app remembers about one learner's journey.
///
/// This is the persisted document: field names and shapes are the JSON
/// contract shared by every storage backend. Missing collections, points and
/// badges fall back to their empty/locked defaults on load, a missing
/// `lastActivity` to the load time, and a missing `username` to an empty name
/// that [`LearnerProgress::ensure_username`] replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProgress {
    #[serde(default)]
    completed_lessons: BTreeSet<LessonId>,
    #[serde(default)]
    scores: BTreeMap<LessonId, Score>,
    #[serde(default)]
    detailed_scores: BTreeMap<LessonId, LessonScoreBreakdown>,
    #[serde(default)]
    points: u64,
    #[serde(default = "Badge::initial_set", deserialize_with = "canonical_badges")]
    badges: Vec<Badge>,
    #[serde(default = "Utc::now")]
    last_activity: DateTime<Utc>,
    #[serde(default)]
    username: String,
}

fn canonical_badges<'de, D>(deserializer: D) -> Result<Vec<Badge>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Badge>::deserialize(deserializer).map(Badge::normalize)
}

/// Headline numbers for the progress dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub lessons_completed: usize,
    pub average_score: u8,
    pub points: u64,
    pub badges_unlocked: usize,
}

impl LearnerProgress {
    /// Fresh state: nothing completed, zero points, every badge locked.
    #[must_use]
    pub fn new(username: Username, now: DateTime<Utc>) -> Self {
        Self {
            completed_lessons: BTreeSet::new(),
            scores: BTreeMap::new(),
            detailed_scores: BTreeMap::new(),
            points: 0,
            badges: Badge::initial_set(),
            last_activity: now,
            username: username.0,
        }
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &BTreeSet<LessonId> {
        &self.completed_lessons
    }

    #[must_use]
    pub fn is_completed(&self, lesson: &LessonId) -> bool {
        self.completed_lessons.contains(lesson)
    }

    #[must_use]
    pub fn scores(&self) -> &BTreeMap<LessonId, Score> {
        &self.scores
    }

    #[must_use]
    pub fn score(&self, lesson: &LessonId) -> Option<Score> {
        self.scores.get(lesson).copied()
    }

    #[must_use]
    pub fn detailed_scores(&self) -> &BTreeMap<LessonId, LessonScoreBreakdown> {
        &self.detailed_scores
    }

    #[must_use]
    pub fn breakdown(&self, lesson: &LessonId) -> Option<&LessonScoreBreakdown> {
        self.detailed_scores.get(lesson)
    }

    #[must_use]
    pub fn points(&self) -> u64 {
        self.points
    }

    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    #[must_use]
    pub fn has_badge(&self, id: BadgeId) -> bool {
        self.badges.iter().any(|b| b.id() == id && b.is_unlocked())
    }

    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Hands a learner without a stored name the `Bé NNN` placeholder.
    ///
    /// Returns `true` if a placeholder was assigned.
    pub fn ensure_username(&mut self, seed: u16) -> bool {
        if !self.username.trim().is_empty() {
            return false;
        }
        self.username = Username::placeholder(seed).0;
        true
    }

    /// Renames the learner. Nothing else changes.
    pub fn set_username(&mut self, username: Username) {
        self.username = username.0;
    }

    /// Facts the badge rules look at, taken from the current state.
    #[must_use]
    pub fn badge_facts(&self) -> BadgeFacts {
        BadgeFacts {
            completed_lessons: self.completed_lessons.len(),
            has_perfect_score: self.scores.values().any(|s| s.is_perfect()),
        }
    }

    /// Dashboard numbers. The average divides the summed lesson scores by the
    /// number of completed lessons, so completions without a score pull it down.
    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        let lessons_completed = self.completed_lessons.len();
        let average_score = if lessons_completed == 0 {
            0
        } else {
            let sum: u64 = self.scores.values().map(|s| u64::from(s.value())).sum();
            let n = u64::try_from(lessons_completed).unwrap_or(u64::MAX);
            u8::try_from((2 * sum + n) / (2 * n)).unwrap_or(u8::MAX)
        };
        ProgressSummary {
            lessons_completed,
            average_score,
            points: self.points,
            badges_unlocked: self.badges.iter().filter(|b| b.is_unlocked()).count(),
        }
    }

    // ─── transitions (driven by the accumulator) ───────────────────────────────

    /// Adds `lesson` to the completed set; `true` if it was not there yet.
    pub(crate) fn mark_completed(&mut self, lesson: &LessonId) -> bool {
        self.completed_lessons.insert(lesson.clone())
    }

    /// Merges a part result and rewrites the lesson's aggregate score.
    pub(crate) fn record_part(&mut self, lesson: &LessonId, result: PartResult) {
        let breakdown = self.detailed_scores.entry(lesson.clone()).or_default();
        breakdown.apply(result);
        if let Some(aggregate) = breakdown.aggregate() {
            self.scores.insert(lesson.clone(), aggregate);
        }
    }

    /// Unlocks every still-locked badge whose rule now holds.
    pub(crate) fn unlock_earned_badges(&mut self) -> Vec<BadgeId> {
        let facts = self.badge_facts();
        self.badges
            .iter_mut()
            .filter(|b| !b.is_unlocked() && b.id().is_earned(facts))
            .filter_map(|b| b.unlock().then_some(b.id()))
            .collect()
    }

    pub(crate) fn add_points(&mut self, amount: u64) {
        self.points = self.points.saturating_add(amount);
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }
}
