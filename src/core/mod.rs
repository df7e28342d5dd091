//! Core deterministic primitives.
//!
//! Seeded randomness, digests, timing helpers and callback registries
//! shared by the input pipeline and the match state machine.

pub mod channel;
pub mod hash;
pub mod rng;
pub mod time;

// Re-export core types
pub use channel::{Subscribers, SubscriptionId};
pub use hash::{StateHash, StateHasher};
pub use rng::DeterministicRng;
pub use time::{FrameTime, Tick, approximately};
