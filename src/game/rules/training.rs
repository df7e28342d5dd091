//! Training Rule
//!
//! Infinite-stock practice: every death respawns the player. Never chosen
//! from configuration; install it with `Match::force_rule`.

use tracing::debug;

use crate::game::config::MatchConfig;
use crate::game::events::PlayerDeath;
use crate::game::rules::MatchRule;
use crate::game::state::MatchCore;

/// Practice mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrainingMatch;

impl TrainingMatch {
    /// Create the rule.
    pub fn new() -> Self {
        Self
    }
}

impl MatchRule for TrainingMatch {
    fn name(&self) -> &'static str {
        "training"
    }

    fn check_active(&self, _config: &MatchConfig) -> bool {
        false
    }

    fn on_player_died(&mut self, core: &mut MatchCore, death: &mut PlayerDeath) {
        if death.revived {
            return;
        }
        death.revived = true;
        debug!("Training respawn for {}", death.player);
        core.request_respawn(death.player, death.tick);
    }
}
