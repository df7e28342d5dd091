//! Slice Recording
//!
//! Delta-compressed per-player history of `InputSlice`s, used for replay
//! playback and for comparing peers by digest.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher};
use crate::core::time::Tick;
use crate::input::slice::InputSlice;

/// A slice that took effect at `tick`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceDelta {
    /// First tick this slice applies to
    pub tick: Tick,
    /// The slice
    pub slice: InputSlice,
}

/// Recording for one player in one match.
///
/// Stores an entry only when the slice changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SliceRecorder {
    /// Player index in the match
    pub player: u8,
    /// Match identifier
    pub match_id: [u8; 16],
    /// First recorded tick
    pub start_tick: Tick,
    /// Last recorded tick
    pub end_tick: Tick,
    deltas: Vec<SliceDelta>,
    started: bool,
    #[serde(skip)]
    last_slice: InputSlice,
}

impl SliceRecorder {
    /// Create an empty recording.
    pub fn new(player: u8, match_id: [u8; 16]) -> Self {
        Self {
            player,
            match_id,
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(512),
            started: false,
            last_slice: InputSlice::new(),
        }
    }

    /// Record the slice for a tick; only changes are stored.
    pub fn record(&mut self, tick: Tick, slice: InputSlice) {
        if !self.started {
            self.start_tick = tick;
            self.started = true;
        }
        self.end_tick = tick;

        if slice != self.last_slice {
            self.deltas.push(SliceDelta { tick, slice });
            self.last_slice = slice;
        }
    }

    /// Slice in effect at `tick` (idle before the first change).
    pub fn slice_at(&self, tick: Tick) -> InputSlice {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            InputSlice::new()
        } else {
            self.deltas[idx - 1].slice
        }
    }

    /// Stored changes.
    pub fn deltas(&self) -> &[SliceDelta] {
        &self.deltas
    }

    /// Mark the recording finished at `end_tick`.
    pub fn finalize(&mut self, end_tick: Tick) {
        self.end_tick = end_tick;
    }

    /// Tick-by-tick playback from `start_tick` through `end_tick`.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recorder: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current: InputSlice::new(),
            done: false,
        }
    }

    /// Digest over the player, match id, tick range and every change.
    pub fn digest(&self) -> StateHash {
        let mut hasher = StateHasher::for_slice_recording();
        hasher.update_u8(self.player);
        hasher.update_bytes(&self.match_id);
        hasher.update_u32(self.start_tick);
        hasher.update_u32(self.end_tick);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_bytes(&delta.slice.to_bytes());
        }
        hasher.finalize()
    }
}

/// Iterator replaying a recording one tick at a time.
pub struct ReplayIterator<'a> {
    recorder: &'a SliceRecorder,
    current_tick: Tick,
    delta_idx: usize,
    current: InputSlice,
    done: bool,
}

impl Iterator for ReplayIterator<'_> {
    type Item = (Tick, InputSlice);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.current_tick > self.recorder.end_tick {
            return None;
        }

        while let Some(delta) = self.recorder.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current = delta.slice;
            self.delta_idx += 1;
        }

        let item = (self.current_tick, self.current);
        match self.current_tick.checked_add(1) {
            Some(next) => self.current_tick = next,
            None => self.done = true,
        }
        Some(item)
    }
}
