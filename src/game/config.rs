//! Match Configuration
//!
//! Built by the character-select flow (or received from the host) and
//! handed to `Match::initialize`.

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::game::character::CharacterId;

/// Connection/controller pair a player occupies.
///
/// Two players may not share a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerSlot {
    /// Network connection (0 = local host)
    pub connection: u32,
    /// Controller index on that connection
    pub controller: u8,
}

impl PlayerSlot {
    /// Create a slot.
    pub const fn new(connection: u32, controller: u8) -> Self {
        Self { connection, controller }
    }
}

/// Who drives a player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    /// Human at a controller
    #[default]
    Human,
    /// Computer-controlled
    Cpu,
}

/// One seat in the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayerConfig {
    /// Slot the player occupies
    pub slot: PlayerSlot,
    /// Selected character (`None` = random)
    #[serde(default)]
    pub character: Option<CharacterId>,
    /// Preferred palette for the selected character
    #[serde(default)]
    pub palette: u32,
    /// Driver
    #[serde(default)]
    pub kind: PlayerKind,
}

impl MatchPlayerConfig {
    /// Human player with a random character.
    pub fn random(slot: PlayerSlot) -> Self {
        Self {
            slot,
            character: None,
            palette: 0,
            kind: PlayerKind::Human,
        }
    }

    /// Human player with a chosen character and palette.
    pub fn with_character(slot: PlayerSlot, character: CharacterId, palette: u32) -> Self {
        Self {
            slot,
            character: Some(character),
            palette,
            kind: PlayerKind::Human,
        }
    }
}

/// Full configuration for one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Match identifier
    pub match_id: Uuid,
    /// Base seed for random selections
    pub seed: u64,
    /// Seats in spawn order
    pub players: Vec<MatchPlayerConfig>,
    /// Starting stocks per player (stock rule active when positive)
    #[serde(default)]
    pub stocks: Option<u32>,
    /// Time limit in seconds (time rule active when positive)
    #[serde(default)]
    pub time: Option<f32>,
}

impl MatchConfig {
    /// Empty configuration with a fresh id.
    pub fn new(seed: u64) -> Self {
        Self {
            match_id: Uuid::new_v4(),
            seed,
            players: Vec::new(),
            stocks: None,
            time: None,
        }
    }

    /// Add a seat.
    pub fn with_player(mut self, player: MatchPlayerConfig) -> Self {
        self.players.push(player);
        self
    }

    /// Set the starting stock count.
    pub fn with_stocks(mut self, stocks: u32) -> Self {
        self.stocks = Some(stocks);
        self
    }

    /// Set the time limit.
    pub fn with_time(mut self, seconds: f32) -> Self {
        self.time = Some(seconds);
        self
    }

    /// Starting stocks, or 0 when unset.
    pub fn stock_count(&self) -> u32 {
        self.stocks.unwrap_or(0)
    }

    /// Time limit, or 0 when unset.
    pub fn time_limit(&self) -> f32 {
        self.time.unwrap_or(0.0)
    }

    /// Seed used for this match's random picks.
    pub fn spawn_seed(&self) -> u64 {
        let seats: Vec<(u32, u8)> = self
            .players
            .iter()
            .map(|p| (p.slot.connection, p.slot.controller))
            .collect();
        crate::core::rng::derive_match_seed(self.match_id.as_bytes(), self.seed, &seats)
    }
}
