//! Process-lifetime record of completed levels.

use codecraft_core::LevelId;

/// Completed catalog levels in the order they were first solved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    completed: Vec<LevelId>,
}

impl Progress {
    /// Records a completion; returns `false` when the level was already recorded.
    pub fn record(&mut self, level: LevelId) -> bool {
        if self.completed.contains(&level) {
            return false;
        }
        self.completed.push(level);
        true
    }

    /// Reports whether the level has been completed.
    #[must_use]
    pub fn is_completed(&self, level: LevelId) -> bool {
        self.completed.contains(&level)
    }

    /// Completed levels in completion order.
    #[must_use]
    pub fn completed(&self) -> &[LevelId] {
        &self.completed
    }

    /// Number of completed levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    /// Reports whether no level has been completed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}
