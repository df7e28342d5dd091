//! Match Logic
//!
//! ## Module Structure
//!
//! - `config`: Match and seat configuration
//! - `character`: Character catalog and asynchronous loading
//! - `player`: Players, spawn selection, spawn errors
//! - `events`: Lifecycle notifications and death events
//! - `state`: Match state machine
//! - `rules`: Stock, time, training and sudden-death rules
//! - `tick`: Fixed-step simulation driver

pub mod config;
pub mod character;
pub mod player;
pub mod events;
pub mod state;
pub mod rules;
pub mod tick;

// Re-export key types
pub use config::{MatchConfig, MatchPlayerConfig, PlayerKind, PlayerSlot};
pub use character::{CharacterAsset, CharacterCatalog, CharacterId, CharacterInfo, CharacterLoader, CatalogLoader};
pub use player::{PlayerId, PlayerInfo, Selection, SpawnError, MAX_SEATS};
pub use events::{MatchCompleted, MatchEvent, MatchResult, PlayerDeath};
pub use state::{Authority, Match, MatchCore, MatchError, MatchSnapshot, MatchStatus};
pub use rules::{MatchRule, StockMatch, TimeMatch, TrainingMatch, SuddenDeathMatch};
pub use tick::{Simulation, SimulationError, TickResult};
