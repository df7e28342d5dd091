//! # Fray Core
//!
//! Deterministic input synchronization and match state machine for a
//! platform fighter.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FRAY CORE                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │  ├── hash.rs     - Domain-separated SHA-256 digests          │
//! │  ├── time.rs     - Ticks, frame time, float helpers          │
//! │  └── channel.rs  - Callback registries                       │
//! │                                                              │
//! │  input/          - Input pipeline                            │
//! │  ├── slice.rs    - 3-byte quantized InputSlice               │
//! │  ├── control.rs  - Per-control tick protocol                 │
//! │  ├── device.rs   - Devices and samplers                      │
//! │  ├── registry.rs - Attached devices, active device           │
//! │  └── recorder.rs - Slice recording and replay                │
//! │                                                              │
//! │  game/           - Match lifecycle                           │
//! │  ├── state.rs    - Match state machine                       │
//! │  ├── rules/      - Stock, time, training, sudden death       │
//! │  └── tick.rs     - Fixed-step simulation driver              │
//! │                                                              │
//! │  network/        - Host/peer message types                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tick Ordering
//!
//! Each step runs the input pipeline (begin, sample, commit, active
//! device) before the match ticks its rules. Controls commit in device
//! order then control order; rules tick in registration order.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod input;
pub mod network;

// Re-export commonly used types
pub use config::{InputConfig, SimulationConfig, ConfigError};
pub use crate::core::rng::DeterministicRng;
pub use crate::core::time::{FrameTime, Tick};
pub use input::{InputSlice, InputDevice, DeviceRegistry, InputError};
pub use game::{Match, MatchConfig, MatchStatus, MatchError, Simulation, SimulationError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
