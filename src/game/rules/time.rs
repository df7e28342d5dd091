//! Time Rule
//!
//! Counts down by unscaled delta time and ends the match as a tie at zero.

use tracing::info;

use crate::core::time::FrameTime;
use crate::game::config::MatchConfig;
use crate::game::events::MatchResult;
use crate::game::rules::MatchRule;
use crate::game::state::{MatchCore, MatchError, MatchSnapshot};

/// Time-boxed match.
#[derive(Clone, Debug, Default)]
pub struct TimeMatch {
    remaining: f32,
    expired: bool,
}

impl TimeMatch {
    /// Inactive rule until initialized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds left on the clock.
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

impl MatchRule for TimeMatch {
    fn name(&self) -> &'static str {
        "time"
    }

    fn check_active(&self, config: &MatchConfig) -> bool {
        config.time_limit() > 0.0
    }

    fn on_initialize(&mut self, config: &MatchConfig, _core: &mut MatchCore) {
        self.remaining = config.time_limit();
        self.expired = false;
    }

    fn on_match_tick(&mut self, core: &mut MatchCore, frame: FrameTime) -> Result<(), MatchError> {
        if self.expired {
            return Ok(());
        }
        self.remaining -= frame.unscaled_delta;
        if self.remaining > 0.0 {
            return Ok(());
        }

        self.remaining = 0.0;
        self.expired = true;
        info!("Time expired at tick {}", frame.tick);
        core.finish(MatchResult::Tie, None)
    }

    fn write_snapshot(&self, snapshot: &mut MatchSnapshot) {
        snapshot.time_remaining = Some(self.remaining);
    }

    fn read_snapshot(&mut self, snapshot: &MatchSnapshot) {
        if let Some(remaining) = snapshot.time_remaining {
            self.remaining = remaining;
        }
    }
}
