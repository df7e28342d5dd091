//! Stock Rule
//!
//! Each player starts with a fixed number of lives. Deaths cost one stock
//! and trigger a respawn while stocks remain; the last player with stocks
//! wins.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::core::time::FrameTime;
use crate::game::config::MatchConfig;
use crate::game::events::{MatchResult, PlayerDeath};
use crate::game::player::{PlayerId, PlayerInfo};
use crate::game::rules::MatchRule;
use crate::game::state::{MatchCore, MatchError, MatchSnapshot};

/// Stock count before a player has spawned.
pub const UNINITIALIZED: i32 = -1;

/// Last-player-standing stock rule.
#[derive(Clone, Debug, Default)]
pub struct StockMatch {
    starting: i32,
    stocks: BTreeMap<PlayerId, i32>,
}

impl StockMatch {
    /// Inactive rule until initialized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining stocks per seat.
    pub fn stocks(&self) -> &BTreeMap<PlayerId, i32> {
        &self.stocks
    }
}

impl MatchRule for StockMatch {
    fn name(&self) -> &'static str {
        "stock"
    }

    fn check_active(&self, config: &MatchConfig) -> bool {
        config.stock_count() > 0
    }

    fn on_initialize(&mut self, config: &MatchConfig, _core: &mut MatchCore) {
        self.starting = config.stock_count().min(i32::MAX as u32) as i32;
        self.stocks = PlayerId::seats(config.players.len())
            .map(|id| (id, UNINITIALIZED))
            .collect();
    }

    fn on_player_spawned(&mut self, _core: &mut MatchCore, player: &PlayerInfo) {
        let stocks = self.stocks.entry(player.id).or_insert(UNINITIALIZED);
        if *stocks == UNINITIALIZED {
            *stocks = self.starting;
            debug!("{} starts with {} stocks", player.id, self.starting);
        }
    }

    fn on_player_died(&mut self, core: &mut MatchCore, death: &mut PlayerDeath) {
        if death.revived {
            return;
        }
        let Some(stocks) = self.stocks.get_mut(&death.player) else {
            return;
        };
        if *stocks <= 0 {
            debug!("{} is out; no respawn", death.player);
            return;
        }

        *stocks -= 1;
        death.revived = true;
        debug!("{} lost a stock, {} left", death.player, *stocks);
        core.request_respawn(death.player, death.tick);
    }

    fn on_match_tick(&mut self, core: &mut MatchCore, _frame: FrameTime) -> Result<(), MatchError> {
        if core.pending_spawns() > 0 {
            return Ok(());
        }

        let mut remaining = self.stocks.iter().filter(|(_, s)| **s > 0).map(|(p, _)| *p);
        let first = remaining.next();
        let more = remaining.next().is_some();
        let any_out = self.stocks.values().any(|s| *s == 0);

        match (first, more) {
            (Some(winner), false) => {
                info!("{} is the last player with stocks", winner);
                core.finish(MatchResult::HasWinner, Some(winner))
            }
            (None, _) if any_out => {
                info!("Every player ran out of stocks on the same tick");
                core.finish(MatchResult::Tie, None)
            }
            _ => Ok(()),
        }
    }

    fn write_snapshot(&self, snapshot: &mut MatchSnapshot) {
        snapshot.stocks = self.stocks.clone();
    }

    fn read_snapshot(&mut self, snapshot: &MatchSnapshot) {
        for (player, stocks) in &snapshot.stocks {
            self.stocks.insert(*player, *stocks);
        }
    }
}
