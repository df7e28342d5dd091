//! Players and Spawn Selection

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::game::character::{CharacterCatalog, CharacterId};
use crate::game::config::{MatchPlayerConfig, PlayerKind, PlayerSlot};

/// Player index within a match (seat order in `MatchConfig::players`).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

/// Seats addressable by a `PlayerId`.
pub const MAX_SEATS: usize = u8::MAX as usize + 1;

impl PlayerId {
    /// Ids for the first `seats` seats, in seat order.
    pub fn seats(seats: usize) -> impl Iterator<Item = PlayerId> {
        (0..=u8::MAX).take(seats).map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", u16::from(self.0) + 1)
    }
}

/// Spawned player, broadcast to every participant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Seat
    pub id: PlayerId,
    /// Connection/controller
    pub slot: PlayerSlot,
    /// Driver
    pub kind: PlayerKind,
    /// Character in play
    pub character: CharacterId,
    /// Palette in play
    pub palette: u32,
    /// Spawn position
    pub position: Vec2,
    /// Replication id assigned on spawn
    pub network_id: u32,
}

/// Recoverable spawn failures.
///
/// Contained in the spawn routine: the player is left without a
/// character and the match continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpawnError {
    /// Another player already occupies the slot.
    #[error("Slot {0:?} is already occupied")]
    DuplicateSlot(PlayerSlot),

    /// Random pick requested but nothing is selectable.
    #[error("No selectable characters")]
    NoSelectableCharacters,

    /// Selected character is not in the catalog.
    #[error("Unknown character {0:?}")]
    UnknownCharacter(CharacterId),

    /// Every palette of the character is already in use.
    #[error("All {palettes} palettes of {character:?} are taken")]
    PalettesExhausted {
        /// Character
        character: CharacterId,
        /// Palette count
        palettes: u32,
    },

    /// Loaded asset has no prefab.
    #[error("Character {0:?} has no prefab")]
    MissingPrefab(CharacterId),

    /// Loaded prefab cannot be replicated.
    #[error("Character {0:?} prefab has no network identity")]
    MissingNetworkIdentity(CharacterId),

    /// Loader reported a failure.
    #[error("Failed to load character: {0}")]
    LoadFailed(String),
}

/// Character and palette chosen for a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selection {
    /// Character
    pub character: CharacterId,
    /// Palette
    pub palette: u32,
}

/// Resolve a seat's character and palette against selections already made.
///
/// A missing character is picked uniformly from the selectable set with a
/// uniform palette. A palette already used for the same character moves to
/// the next free index, wrapping around.
pub fn select_character(
    config: &MatchPlayerConfig,
    catalog: &CharacterCatalog,
    rng: &mut DeterministicRng,
    taken: &BTreeMap<PlayerId, Selection>,
) -> Result<Selection, SpawnError> {
    let (info, requested) = match config.character {
        Some(id) => {
            let info = catalog.get(id).ok_or(SpawnError::UnknownCharacter(id))?;
            (info, config.palette)
        }
        None => {
            let info = catalog
                .pick_random(rng)
                .ok_or(SpawnError::NoSelectableCharacters)?;
            let palette = rng.next_int(info.palettes);
            (info, palette)
        }
    };

    let palettes = info.palettes.max(1);
    let in_use = |palette: u32| {
        taken
            .values()
            .any(|s| s.character == info.id && s.palette == palette)
    };

    let start = requested % palettes;
    (0..palettes)
        .map(|offset| (start + offset) % palettes)
        .find(|&palette| !in_use(palette))
        .map(|palette| Selection {
            character: info.id,
            palette,
        })
        .ok_or(SpawnError::PalettesExhausted {
            character: info.id,
            palettes,
        })
}
