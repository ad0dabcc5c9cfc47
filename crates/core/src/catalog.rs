//! Fixed table of difficulty levels.
//!
//! Each level pins the numeric range questions are drawn from and how many
//! options a multiple-choice round shows. Lookups never fail: an unknown id
//! resolves to the first entry.

use crate::model::DifficultyId;

/// One entry of the difficulty catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyLevel {
    id: DifficultyId,
    name: &'static str,
    min: u32,
    max: u32,
    option_count: usize,
}

impl DifficultyLevel {
    const fn new(id: u32, name: &'static str, min: u32, max: u32, option_count: usize) -> Self {
        Self {
            id: DifficultyId::new(id),
            name,
            min,
            max,
            option_count,
        }
    }

    #[must_use]
    pub fn id(&self) -> DifficultyId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Inclusive lower bound of the numeric range.
    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Inclusive upper bound of the numeric range.
    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.option_count
    }

    /// Number of distinct values in `[min, max]`.
    #[must_use]
    pub fn range_len(&self) -> usize {
        usize::try_from(self.max - self.min).map_or(usize::MAX, |span| span.saturating_add(1))
    }

    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// All difficulty levels, ordered by id.
pub const DIFFICULTY_LEVELS: [DifficultyLevel; 6] = [
    DifficultyLevel::new(1, "萌新上路", 0, 10, 3),
    DifficultyLevel::new(2, "初出茅庐", 0, 20, 4),
    DifficultyLevel::new(3, "渐入佳境", 0, 50, 5),
    DifficultyLevel::new(4, "炉火纯青", 0, 100, 6),
    DifficultyLevel::new(5, "登峰造极", 0, 200, 8),
    DifficultyLevel::new(6, "数学大师", 0, 1000, 10),
];

/// The level used when a lookup misses.
#[must_use]
pub fn default_level() -> &'static DifficultyLevel {
    &DIFFICULTY_LEVELS[0]
}

/// Returns the level with the given id, if the catalog has one.
#[must_use]
pub fn find_level(id: DifficultyId) -> Option<&'static DifficultyLevel> {
    DIFFICULTY_LEVELS.iter().find(|level| level.id == id)
}

/// Returns the level with the given id, falling back to the first entry.
#[must_use]
pub fn level_or_default(id: DifficultyId) -> &'static DifficultyLevel {
    find_level(id).unwrap_or_else(default_level)
}

/// Display name for a difficulty id, using the fallback entry for unknown ids.
#[must_use]
pub fn difficulty_name(id: DifficultyId) -> &'static str {
    level_or_default(id).name()
}
