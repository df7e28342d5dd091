//! Match Rules
//!
//! Each rule decides from the configuration whether it takes part, then
//! receives lifecycle callbacks for as long as the match runs. Rules tick
//! in registration order; the first rule to finish the match stops the
//! remaining rules for that tick.

pub mod stock;
pub mod time;
pub mod training;
pub mod sudden_death;

use crate::core::time::FrameTime;
use crate::game::config::MatchConfig;
use crate::game::events::PlayerDeath;
use crate::game::player::PlayerInfo;
use crate::game::state::{MatchCore, MatchError, MatchSnapshot};

pub use stock::StockMatch;
pub use time::TimeMatch;
pub use training::TrainingMatch;
pub use sudden_death::SuddenDeathMatch;

/// A pluggable win condition or match behavior.
pub trait MatchRule {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the rule participates. Pure function of the configuration,
    /// evaluated once at initialize.
    fn check_active(&self, config: &MatchConfig) -> bool;

    /// One-time setup for an active rule.
    fn on_initialize(&mut self, _config: &MatchConfig, _core: &mut MatchCore) {}

    /// Called once per tick while the match is running on the host.
    fn on_match_tick(&mut self, _core: &mut MatchCore, _frame: FrameTime) -> Result<(), MatchError> {
        Ok(())
    }

    /// A player finished spawning (or appeared through a snapshot).
    fn on_player_spawned(&mut self, _core: &mut MatchCore, _player: &PlayerInfo) {}

    /// A player died. Leave `death` alone if it is already `revived`.
    fn on_player_died(&mut self, _core: &mut MatchCore, _death: &mut PlayerDeath) {}

    /// Contribute replicated state.
    fn write_snapshot(&self, _snapshot: &mut MatchSnapshot) {}

    /// Adopt replicated state from the host.
    fn read_snapshot(&mut self, _snapshot: &MatchSnapshot) {}
}

/// Every built-in rule, in tick order.
pub fn default_rules() -> Vec<Box<dyn MatchRule>> {
    vec![
        Box::new(StockMatch::new()),
        Box::new(TimeMatch::new()),
        Box::new(TrainingMatch::new()),
        Box::new(SuddenDeathMatch),
    ]
}
