/// Aggregated view of round progress, useful for a front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: u32,
    pub answered: u32,
    pub remaining: u32,
    /// Integer percent of correct answers so far; 0 before the first answer.
    pub accuracy_percent: u32,
}
