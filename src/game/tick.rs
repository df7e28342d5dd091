//! Simulation Driver
//!
//! One `step` per fixed tick: advance the counter, run the input pipeline,
//! sample each bound player's slice, then tick the match.

use std::collections::BTreeMap;

use crate::config::SimulationConfig;
use crate::core::time::{FrameTime, Tick};
use crate::game::player::PlayerId;
use crate::game::state::{Match, MatchError};
use crate::input::{DeviceId, DeviceRegistry, InputError, InputSlice, SliceRecorder};

/// Fatal sequencing errors surfaced to the loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// Input tick protocol violation.
    #[error(transparent)]
    Input(#[from] InputError),

    /// Match lifecycle violation.
    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Result of a step.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick that ran
    pub tick: Tick,
    /// Slice sampled for each bound player
    pub slices: BTreeMap<PlayerId, InputSlice>,
}

/// Owns the device registry, the match and the tick counter.
pub struct Simulation {
    config: SimulationConfig,
    registry: DeviceRegistry,
    game: Match,
    tick: Tick,
    bindings: BTreeMap<PlayerId, DeviceId>,
    recorders: BTreeMap<PlayerId, SliceRecorder>,
}

impl Simulation {
    /// Wrap a match. The first step runs tick 1.
    pub fn new(config: SimulationConfig, game: Match) -> Self {
        let registry = DeviceRegistry::new(config.input.clone());
        Self {
            config,
            registry,
            game,
            tick: 0,
            bindings: BTreeMap::new(),
            recorders: BTreeMap::new(),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Last tick that ran.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Device registry.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Device registry, for attaching devices and managers.
    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    /// The match.
    pub fn game(&self) -> &Match {
        &self.game
    }

    /// The match, for initialization and gameplay events.
    pub fn game_mut(&mut self) -> &mut Match {
        &mut self.game
    }

    /// Drive `player` from `device` and start recording their slices.
    pub fn bind_device(&mut self, player: PlayerId, device: DeviceId) -> Result<(), InputError> {
        if self.registry.device(device).is_null() {
            return Err(InputError::UnknownDevice(device));
        }
        let match_id = self
            .game
            .core()
            .config()
            .map(|c| *c.match_id.as_bytes())
            .unwrap_or([0; 16]);
        self.bindings.insert(player, device);
        self.recorders
            .entry(player)
            .or_insert_with(|| SliceRecorder::new(player.0, match_id));
        Ok(())
    }

    /// Recording for a bound player.
    pub fn recorder(&self, player: PlayerId) -> Option<&SliceRecorder> {
        self.recorders.get(&player)
    }

    /// All recordings, by player.
    pub fn recorders(&self) -> &BTreeMap<PlayerId, SliceRecorder> {
        &self.recorders
    }

    /// Run one tick of `unscaled_delta` seconds.
    pub fn step(&mut self, unscaled_delta: f32) -> Result<TickResult, SimulationError> {
        self.tick += 1;
        let frame = FrameTime::new(self.tick, unscaled_delta, self.config.time_scale);

        self.registry.update(frame)?;

        let mut result = TickResult {
            tick: self.tick,
            slices: BTreeMap::new(),
        };
        for (player, device) in &self.bindings {
            let slice = InputSlice::from_device(self.registry.device(*device), self.registry.config());
            if let Some(recorder) = self.recorders.get_mut(player) {
                recorder.record(self.tick, slice);
            }
            result.slices.insert(*player, slice);
        }

        self.game.tick(frame)?;

        #[cfg(feature = "debug-tracing")]
        tracing::trace!("Tick {} status {}", self.tick, self.game.status());

        Ok(result)
    }

    /// Run one tick at the configured rate.
    pub fn step_fixed(&mut self) -> Result<TickResult, SimulationError> {
        self.step(self.config.tick_duration())
    }

    /// Close every recording at the current tick.
    pub fn finalize_recordings(&mut self) {
        for recorder in self.recorders.values_mut() {
            recorder.finalize(self.tick);
        }
    }
}
