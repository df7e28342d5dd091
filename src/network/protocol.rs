//! Protocol Messages
//!
//! Wire format between host and peers. Messages are bincode in
//! production and JSON for debugging; both use the same externally
//! tagged serde layout.

use serde::{de::DeserializeOwned, Serialize, Deserialize};

use crate::core::time::Tick;
use crate::game::events::{MatchCompleted, MatchEvent};
use crate::game::player::PlayerInfo;
use crate::game::state::MatchSnapshot;
use crate::input::slice::InputSlice;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from a peer to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMessage {
    /// One controller's slice for a tick.
    Input {
        /// Controller on the sending connection
        controller: u8,
        /// Tick the slice was sampled on
        tick: Tick,
        /// `InputSlice` wire bytes
        bytes: [u8; InputSlice::SIZE],
    },

    /// Request a full snapshot (join or resync).
    SyncRequest,
}

impl ClientMessage {
    /// Input message for a sampled slice.
    pub fn input(controller: u8, tick: Tick, slice: InputSlice) -> Self {
        Self::Input {
            controller,
            tick,
            bytes: slice.to_bytes(),
        }
    }

    /// Decoded slice of an `Input` message.
    pub fn slice(&self) -> Option<InputSlice> {
        match self {
            Self::Input { bytes, .. } => Some(InputSlice::from_bytes(*bytes)),
            Self::SyncRequest => None,
        }
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Lifecycle notifications relayed to peers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Match is running
    Started,
    /// Match finished
    Completed(MatchCompleted),
    /// Host finished its completion handlers
    Resolved(MatchCompleted),
}

/// Messages sent from the host to peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full replicated match state.
    Snapshot(MatchSnapshot),

    /// A player finished spawning.
    PlayerInfo(PlayerInfo),

    /// Lifecycle change.
    Lifecycle(Lifecycle),
}

impl ServerMessage {
    /// Message relaying a match event, if peers need it.
    pub fn from_event(event: &MatchEvent) -> Option<Self> {
        match event {
            MatchEvent::Started => Some(Self::Lifecycle(Lifecycle::Started)),
            MatchEvent::PlayerSpawned(info) => Some(Self::PlayerInfo(info.clone())),
            MatchEvent::Completed(done) => Some(Self::Lifecycle(Lifecycle::Completed(*done))),
            MatchEvent::Resolved(done) => Some(Self::Lifecycle(Lifecycle::Resolved(*done))),
            MatchEvent::SpawnAborted { .. } | MatchEvent::RespawnRequested { .. } => None,
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Message encoding errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// bincode failure.
    #[error("Binary codec error: {0}")]
    Binary(#[from] bincode::Error),

    /// JSON failure.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raw slice payload of the wrong width.
    #[error("Input slice must be {expected} bytes, got {0}", expected = InputSlice::SIZE)]
    BadSliceLength(usize),
}

/// Encode a message as bincode.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(message)?)
}

/// Decode a bincode message.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Encode a message as JSON.
pub fn encode_json<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode a JSON message.
pub fn decode_json<T: DeserializeOwned>(json: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a raw 3-byte slice payload.
pub fn decode_slice(bytes: &[u8]) -> Result<InputSlice, ProtocolError> {
    let bytes: [u8; InputSlice::SIZE] = bytes
        .try_into()
        .map_err(|_| ProtocolError::BadSliceLength(bytes.len()))?;
    Ok(InputSlice::from_bytes(bytes))
}
