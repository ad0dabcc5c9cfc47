use chrono::{DateTime, Utc};

use crate::model::DifficultyId;

/// A single round: the number to recognise plus the options shown for it.
///
/// Built by the question generator and never changed afterwards. `options`
/// holds distinct values and always contains `target` exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    target: u32,
    options: Vec<u32>,
    difficulty: DifficultyId,
    created_at: DateTime<Utc>,
}

impl Question {
    #[must_use]
    pub(crate) fn new(
        target: u32,
        options: Vec<u32>,
        difficulty: DifficultyId,
        created_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(options.contains(&target));
        Self {
            target,
            options,
            difficulty,
            created_at,
        }
    }

    /// Builds a question from explicit parts, adding `target` to the options
    /// when it is missing and dropping duplicate options.
    #[must_use]
    pub fn from_parts(
        target: u32,
        options: impl IntoIterator<Item = u32>,
        difficulty: DifficultyId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut unique: Vec<u32> = Vec::new();
        for option in options {
            if !unique.contains(&option) {
                unique.push(option);
            }
        }
        if !unique.contains(&target) {
            unique.push(target);
        }
        Self::new(target, unique, difficulty, created_at)
    }

    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    #[must_use]
    pub fn options(&self) -> &[u32] {
        &self.options
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyId {
        self.difficulty
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
