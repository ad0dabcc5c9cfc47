//! Question generation with an injectable random source.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::{self, DifficultyLevel};
use crate::model::{DifficultyId, Question};

/// Draws questions for a difficulty level.
///
/// Generic over the random source so tests can seed it and get a
/// reproducible sequence.
#[derive(Debug, Clone)]
pub struct QuestionGenerator<R = StdRng> {
    rng: R,
}

impl QuestionGenerator<StdRng> {
    /// Generator seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Generator with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> QuestionGenerator<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a question for `difficulty`.
    ///
    /// Unknown ids use the first catalog entry. The target is drawn
    /// uniformly from the level's range, distractors are distinct draws from
    /// the same range, and the final option order is a uniform shuffle.
    pub fn generate(&mut self, difficulty: DifficultyId, now: DateTime<Utc>) -> Question {
        let level = catalog::level_or_default(difficulty);
        let target = self.draw(level);
        let options = self.build_options(level, target);
        Question::new(target, options, level.id(), now)
    }

    fn draw(&mut self, level: &DifficultyLevel) -> u32 {
        self.rng.random_range(level.min()..=level.max())
    }

    fn build_options(&mut self, level: &DifficultyLevel, target: u32) -> Vec<u32> {
        let wanted = level.option_count().max(1);
        let mut options = vec![target];

        if wanted >= level.range_len() {
            options.extend((level.min()..=level.max()).filter(|&v| v != target));
        } else {
            let max_attempts = level.range_len().saturating_mul(2);
            let mut attempts = 0;
            while options.len() < wanted && attempts < max_attempts {
                let candidate = self.draw(level);
                if !options.contains(&candidate) {
                    options.push(candidate);
                }
                attempts += 1;
            }
            // Unlucky draws: fill deterministically from the range.
            for value in level.min()..=level.max() {
                if options.len() >= wanted {
                    break;
                }
                if !options.contains(&value) {
                    options.push(value);
                }
            }
        }

        options.shuffle(&mut self.rng);
        options
    }
}
