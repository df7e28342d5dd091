//! Sudden Death Rule
//!
//! Reserved; never active.

use crate::game::config::MatchConfig;
use crate::game::rules::MatchRule;

/// Placeholder for a tiebreaker mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct SuddenDeathMatch;

impl MatchRule for SuddenDeathMatch {
    fn name(&self) -> &'static str {
        "sudden_death"
    }

    fn check_active(&self, _config: &MatchConfig) -> bool {
        false
    }
}
