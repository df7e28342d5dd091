//! Character Catalog and Loading
//!
//! The catalog lists what can be picked; the loader fetches the renderable
//! asset for a pick asynchronously.

use std::collections::BTreeMap;

use futures_util::future::{self, FutureExt, LocalBoxFuture};
use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::game::player::SpawnError;

/// Character identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub u32);

/// Catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterInfo {
    /// Identifier
    pub id: CharacterId,
    /// Display name
    pub name: String,
    /// Number of palettes (at least 1)
    pub palettes: u32,
    /// Offered on the select screen / eligible for random
    pub selectable: bool,
    /// Asset path handed to the loader
    pub prefab: Option<String>,
}

impl CharacterInfo {
    /// Selectable character with one prefab.
    pub fn new(id: u32, name: impl Into<String>, palettes: u32) -> Self {
        let name = name.into();
        Self {
            id: CharacterId(id),
            prefab: Some(format!("characters/{}", name.to_lowercase())),
            name,
            palettes: palettes.max(1),
            selectable: true,
        }
    }
}

/// All known characters, ordered by id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CharacterCatalog {
    characters: BTreeMap<CharacterId, CharacterInfo>,
}

impl CharacterCatalog {
    /// Build from entries; later duplicates replace earlier ones.
    pub fn new(characters: impl IntoIterator<Item = CharacterInfo>) -> Self {
        Self {
            characters: characters.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Look up a character.
    pub fn get(&self, id: CharacterId) -> Option<&CharacterInfo> {
        self.characters.get(&id)
    }

    /// Characters eligible for selection, in id order.
    pub fn selectable(&self) -> Vec<&CharacterInfo> {
        self.characters.values().filter(|c| c.selectable).collect()
    }

    /// Uniformly random selectable character.
    pub fn pick_random(&self, rng: &mut DeterministicRng) -> Option<&CharacterInfo> {
        let pool = self.selectable();
        rng.choose(&pool).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

/// Loaded character asset.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterAsset {
    /// Instantiable prefab, if the asset resolved to one
    pub prefab: Option<String>,
    /// Prefab can be registered for replication
    pub network_identity: bool,
}

/// Asynchronous asset loading.
///
/// Futures are polled from the simulation thread between ticks.
pub trait CharacterLoader {
    /// Start loading `character`.
    fn load(&mut self, character: &CharacterInfo) -> LocalBoxFuture<'static, Result<CharacterAsset, SpawnError>>;
}

/// Loader that resolves immediately from the catalog entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogLoader;

impl CharacterLoader for CatalogLoader {
    fn load(&mut self, character: &CharacterInfo) -> LocalBoxFuture<'static, Result<CharacterAsset, SpawnError>> {
        let asset = CharacterAsset {
            prefab: character.prefab.clone(),
            network_identity: true,
        };
        future::ready(Ok(asset)).boxed_local()
    }
}
