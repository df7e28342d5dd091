//! Match Events
//!
//! Lifecycle notifications published by `Match` and the domain events it
//! consumes from gameplay code.

use serde::{Serialize, Deserialize};

use crate::core::time::Tick;
use crate::game::player::{PlayerId, PlayerInfo};

/// How a match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// One player won
    HasWinner,
    /// Nobody won
    Tie,
}

/// Outcome passed to completion handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCompleted {
    /// Result
    pub result: MatchResult,
    /// Winner when `result` is `HasWinner`
    pub winner: Option<PlayerId>,
}

/// Lifecycle notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Every seat has started spawning and the match is running.
    Started,

    /// A player finished spawning.
    PlayerSpawned(PlayerInfo),

    /// A player's spawn was abandoned.
    SpawnAborted {
        /// Seat
        player: PlayerId,
        /// Logged reason
        reason: String,
    },

    /// A rule wants the player back on stage.
    RespawnRequested {
        /// Player
        player: PlayerId,
        /// Tick of the death
        tick: Tick,
    },

    /// The match finished; completion handlers are running.
    Completed(MatchCompleted),

    /// Every completion handler finished.
    Resolved(MatchCompleted),
}

/// A player died.
///
/// Passed to each active rule in order. The first rule to act sets
/// `revived`, and later rules leave it alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDeath {
    /// Player who died
    pub player: PlayerId,
    /// Tick of the death
    pub tick: Tick,
    /// Already handled by a rule
    pub revived: bool,
}

impl PlayerDeath {
    /// Unhandled death.
    pub fn new(player: PlayerId, tick: Tick) -> Self {
        Self {
            player,
            tick,
            revived: false,
        }
    }
}
