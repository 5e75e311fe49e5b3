//! Badge definitions and the unlock rules evaluated after every completion.

use serde::{Deserialize, Serialize};

/// Stable key of one of the four fixed badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    /// At least one completed lesson.
    FirstStep,
    /// A perfect aggregate score on any lesson.
    StarStudent,
    /// Five completed lessons.
    Dedicated,
    /// Ten completed lessons.
    Master,
}

/// Facts the badge rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeFacts {
    pub completed_lessons: usize,
    pub has_perfect_score: bool,
}

impl BadgeId {
    /// Every badge, in display order.
    pub const ALL: [BadgeId; 4] = [
        BadgeId::FirstStep,
        BadgeId::StarStudent,
        BadgeId::Dedicated,
        BadgeId::Master,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FirstStep => "first_step",
            Self::StarStudent => "star_student",
            Self::Dedicated => "dedicated",
            Self::Master => "master",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstStep => "Bước đầu tiên",
            Self::StarStudent => "Học sinh gương mẫu",
            Self::Dedicated => "Chăm chỉ",
            Self::Master => "Bậc thầy âm vần",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::FirstStep => "🌱",
            Self::StarStudent => "⭐",
            Self::Dedicated => "📚",
            Self::Master => "👑",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FirstStep => "Hoàn thành bài học đầu tiên",
            Self::StarStudent => "Đạt điểm 100 trong một bài học",
            Self::Dedicated => "Hoàn thành 5 bài học",
            Self::Master => "Hoàn thành 10 bài học",
        }
    }

    /// Unlock predicate for this badge.
    #[must_use]
    pub const fn is_earned(self, facts: BadgeFacts) -> bool {
        match self {
            Self::FirstStep => facts.completed_lessons >= 1,
            Self::StarStudent => facts.has_perfect_score,
            Self::Dedicated => facts.completed_lessons >= 5,
            Self::Master => facts.completed_lessons >= 10,
        }
    }
}

/// A badge as shown to the learner.
///
/// Only `id` and `unlocked` are state; the display fields are derived from
/// the id and rebuilt whenever a badge is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersistedBadge")]
pub struct Badge {
    id: BadgeId,
    name: String,
    icon: String,
    description: String,
    unlocked: bool,
}

#[derive(Deserialize)]
struct PersistedBadge {
    id: BadgeId,
    #[serde(default)]
    unlocked: bool,
}

impl From<PersistedBadge> for Badge {
    fn from(p: PersistedBadge) -> Self {
        let mut badge = Badge::locked(p.id);
        badge.unlocked = p.unlocked;
        badge
    }
}

impl Badge {
    #[must_use]
    pub fn locked(id: BadgeId) -> Self {
        Self {
            id,
            name: id.name().to_string(),
            icon: id.icon().to_string(),
            description: id.description().to_string(),
            unlocked: false,
        }
    }

    /// The full badge set with everything locked.
    #[must_use]
    pub fn initial_set() -> Vec<Badge> {
        BadgeId::ALL.into_iter().map(Badge::locked).collect()
    }

    /// Brings a persisted badge list back to the canonical set: fixed order,
    /// one entry per id, unlock flags preserved.
    #[must_use]
    pub fn normalize(badges: Vec<Badge>) -> Vec<Badge> {
        BadgeId::ALL
            .into_iter()
            .map(|id| {
                let unlocked = badges.iter().any(|b| b.id == id && b.unlocked);
                let mut badge = Badge::locked(id);
                badge.unlocked = unlocked;
                badge
            })
            .collect()
    }

    #[must_use]
    pub fn id(&self) -> BadgeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Unlocks the badge. Returns `true` only on the locked→unlocked edge.
    pub(crate) fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        true
    }
}
