#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure goal evaluator that decides how a run ends.

use codecraft_core::{Level, Position, Verdict};

/// Inputs the evaluator inspects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GoalCheck {
    /// Cell occupied by the character.
    pub position: Position,
    /// Indicates whether fuel was collected during the run.
    pub fuel_collected: bool,
    /// Indicates whether the run has nothing left to apply.
    pub is_terminal: bool,
    /// Indicates whether a blocked move already ended the run.
    pub collided: bool,
}

/// Decides the verdict for the provided state.
///
/// Away from the goal, only a terminal check produces a verdict, and a
/// collision suppresses the "not reached" report because the collision was
/// already reported when it happened. On the goal, a missing fuel requirement
/// is never a win.
#[must_use]
pub fn evaluate(level: &Level, check: GoalCheck) -> Verdict {
    if check.position != level.goal() {
        return if check.collided {
            Verdict::Collided
        } else if check.is_terminal {
            Verdict::GoalNotReached
        } else {
            Verdict::Pending
        };
    }

    if level.has_fuel() && !check.fuel_collected {
        Verdict::MissingFuel
    } else {
        Verdict::Success
    }
}
