//! Match State Machine
//!
//! `Initialization → Spawning → Running → Completed → Resolved`.
//!
//! `Match` owns the lifecycle shared by every rule (`MatchCore`) and the
//! active rule list. Rules receive `&mut MatchCore` so they can finish the
//! match or request respawns without reaching back into `Match`.
//!
//! Spawn loads and completion handlers are local futures held in
//! `FuturesUnordered` sets and polled once per tick (and right after
//! finishing), so they always resolve relative to a tick boundary.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::task::{Context, Poll};

use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use glam::Vec2;
use serde::{Serialize, Deserialize};
use tracing::{debug, error, info};

use crate::core::channel::{Subscribers, SubscriptionId};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::rng::DeterministicRng;
use crate::core::time::{FrameTime, Tick};
use crate::game::character::{CharacterAsset, CharacterCatalog, CharacterLoader};
use crate::game::config::{MatchConfig, MatchPlayerConfig, PlayerSlot};
use crate::game::events::{MatchCompleted, MatchEvent, MatchResult, PlayerDeath};
use crate::game::player::{select_character, PlayerId, PlayerInfo, Selection, SpawnError, MAX_SEATS};
use crate::game::rules::{self, MatchRule};

// =============================================================================
// STATUS
// =============================================================================

/// Lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MatchStatus {
    /// Constructed, not yet initialized
    #[default]
    Initialization = 0,
    /// Networked client waiting for the host (set outside this crate)
    WaitingOnServer = 1,
    /// Seats are being spawned
    Spawning = 2,
    /// Rules are ticking
    Running = 3,
    /// Finished, completion handlers running
    Completed = 4,
    /// Completion handlers finished
    Resolved = 5,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Which side of the session this match runs on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authority {
    /// Host or offline: spawns players and ticks rules
    #[default]
    Server,
    /// Remote peer: mirrors snapshots from the host
    Client,
}

/// Lifecycle precondition violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// `initialize` called outside `Initialization`.
    #[error("Match already initialized (status {0})")]
    AlreadyInitialized(MatchStatus),

    /// `finish` called outside `Running`.
    #[error("Match is not running (status {0})")]
    NotRunning(MatchStatus),

    /// Player id is not a seat in this match.
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Snapshot applied on the authoritative side.
    #[error("Snapshots are only applied on clients")]
    Authoritative,

    /// More seats than `PlayerId` can address.
    #[error("Match has {0} seats, at most {max} supported", max = MAX_SEATS)]
    TooManySeats(usize),
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Replicated match state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Tick the snapshot was taken
    pub tick: Tick,
    /// Lifecycle status
    pub status: MatchStatus,
    /// Spawned players in seat order
    pub players: Vec<PlayerInfo>,
    /// Remaining stocks (stock rule only; -1 = not yet spawned)
    pub stocks: BTreeMap<PlayerId, i32>,
    /// Remaining time (time rule only)
    pub time_remaining: Option<f32>,
    /// Outcome once finished
    pub result: Option<MatchCompleted>,
}

impl MatchSnapshot {
    /// Digest for comparing peers.
    pub fn digest(&self) -> StateHash {
        let mut hasher = StateHasher::for_match_snapshot();
        hasher.update_u32(self.tick);
        hasher.update_u8(self.status as u8);
        hasher.update_u32(self.players.len() as u32);
        for player in &self.players {
            hasher.update_u8(player.id.0);
            hasher.update_u32(player.slot.connection);
            hasher.update_u8(player.slot.controller);
            hasher.update_u32(player.character.0);
            hasher.update_u32(player.palette);
            hasher.update_u32(player.network_id);
            hasher.update_f32(player.position.x);
            hasher.update_f32(player.position.y);
        }
        for (player, stocks) in &self.stocks {
            hasher.update_u8(player.0);
            hasher.update_i32(*stocks);
        }
        match self.time_remaining {
            Some(t) => {
                hasher.update_bool(true);
                hasher.update_f32(t);
            }
            None => hasher.update_bool(false),
        }
        match self.result {
            Some(done) => {
                hasher.update_u8(match done.result {
                    MatchResult::HasWinner => 1,
                    MatchResult::Tie => 2,
                });
                hasher.update_u8(done.winner.map_or(u8::MAX, |p| p.0));
            }
            None => hasher.update_u8(0),
        }
        hasher.finalize()
    }
}

// =============================================================================
// CORE
// =============================================================================

type SpawnFuture = LocalBoxFuture<'static, SpawnOutcome>;
type CompletionFuture = LocalBoxFuture<'static, ()>;

struct SpawnOutcome {
    player: PlayerId,
    slot: PlayerSlot,
    seat: MatchPlayerConfig,
    selection: Selection,
    asset: Result<CharacterAsset, SpawnError>,
}

/// Lifecycle state shared with rules.
pub struct MatchCore {
    status: MatchStatus,
    authority: Authority,
    tick: Tick,
    config: Option<MatchConfig>,
    catalog: CharacterCatalog,
    loader: Box<dyn CharacterLoader>,
    rng: DeterministicRng,
    spawn_points: Vec<Vec2>,
    players: BTreeMap<PlayerId, PlayerInfo>,
    occupied: BTreeSet<PlayerSlot>,
    selections: BTreeMap<PlayerId, Selection>,
    next_network_id: u32,
    pending_spawns: FuturesUnordered<SpawnFuture>,
    pending_completion: FuturesUnordered<CompletionFuture>,
    result: Option<MatchCompleted>,
    events: Subscribers<MatchEvent>,
    completion_handlers: Subscribers<MatchCompleted, CompletionFuture>,
}

impl MatchCore {
    fn new(catalog: CharacterCatalog, loader: Box<dyn CharacterLoader>, authority: Authority) -> Self {
        Self {
            status: MatchStatus::Initialization,
            authority,
            tick: 0,
            config: None,
            catalog,
            loader,
            rng: DeterministicRng::new(0),
            spawn_points: Vec::new(),
            players: BTreeMap::new(),
            occupied: BTreeSet::new(),
            selections: BTreeMap::new(),
            next_network_id: 1,
            pending_spawns: FuturesUnordered::new(),
            pending_completion: FuturesUnordered::new(),
            result: None,
            events: Subscribers::new(),
            completion_handlers: Subscribers::new(),
        }
    }

    /// Current status.
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Host or client.
    pub fn authority(&self) -> Authority {
        self.authority
    }

    /// Tick of the last `Match::tick`.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Configuration, once initialized.
    pub fn config(&self) -> Option<&MatchConfig> {
        self.config.as_ref()
    }

    /// Spawned players in seat order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerInfo> {
        self.players.values()
    }

    /// A spawned player.
    pub fn player(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.players.get(&id)
    }

    /// Spawns still waiting on their asset load.
    pub fn pending_spawns(&self) -> usize {
        self.pending_spawns.len()
    }

    /// Completion handlers still running.
    pub fn pending_completion(&self) -> usize {
        self.pending_completion.len()
    }

    /// Outcome once finished.
    pub fn result(&self) -> Option<MatchCompleted> {
        self.result
    }

    /// True if `player` is a seat in the configuration.
    pub fn is_seat(&self, player: PlayerId) -> bool {
        self.config
            .as_ref()
            .is_some_and(|c| (player.0 as usize) < c.players.len())
    }

    /// Ask gameplay to put `player` back on stage.
    pub fn request_respawn(&mut self, player: PlayerId, tick: Tick) {
        debug!("Respawn requested for {} at tick {}", player, tick);
        self.events.publish(&MatchEvent::RespawnRequested { player, tick });
    }

    /// End the match.
    ///
    /// Publishes `Completed`, starts every completion handler, and resolves
    /// immediately if they are all already done.
    pub fn finish(&mut self, result: MatchResult, winner: Option<PlayerId>) -> Result<(), MatchError> {
        if self.status != MatchStatus::Running {
            return Err(MatchError::NotRunning(self.status));
        }

        let completed = MatchCompleted { result, winner };
        self.status = MatchStatus::Completed;
        self.result = Some(completed);
        info!(
            "Match completed at tick {}: {:?}, winner {:?}",
            self.tick, result, winner
        );

        self.events.publish(&MatchEvent::Completed(completed));
        for handler in self.completion_handlers.publish_collect(&completed) {
            self.pending_completion.push(handler);
        }
        self.drive_completion();
        Ok(())
    }

    fn drive_completion(&mut self) {
        if self.status != MatchStatus::Completed {
            return;
        }
        drain_ready(&mut self.pending_completion);
        if self.pending_completion.is_empty() {
            self.status = MatchStatus::Resolved;
            if let Some(completed) = self.result {
                info!("Match resolved at tick {}", self.tick);
                self.events.publish(&MatchEvent::Resolved(completed));
            }
        }
    }

    fn begin_spawn(&mut self, player: PlayerId, seat: &MatchPlayerConfig) -> Result<(), SpawnError> {
        if self.occupied.contains(&seat.slot) {
            return Err(SpawnError::DuplicateSlot(seat.slot));
        }

        let selection = select_character(seat, &self.catalog, &mut self.rng, &self.selections)?;
        let info = self
            .catalog
            .get(selection.character)
            .ok_or(SpawnError::UnknownCharacter(selection.character))?;

        self.occupied.insert(seat.slot);
        self.selections.insert(player, selection);
        debug!(
            "Spawning {} as {} (palette {})",
            player, info.name, selection.palette
        );

        let load = self.loader.load(info);
        let slot = seat.slot;
        let seat = seat.clone();
        self.pending_spawns.push(
            async move {
                SpawnOutcome {
                    player,
                    slot,
                    seat,
                    selection,
                    asset: load.await,
                }
            }
            .boxed_local(),
        );
        Ok(())
    }

    fn complete_spawn(&mut self, outcome: SpawnOutcome) -> Result<PlayerInfo, SpawnError> {
        let character = outcome.selection.character;
        let asset = match outcome.asset {
            Ok(asset) => asset,
            Err(e) => {
                self.selections.remove(&outcome.player);
                return Err(e);
            }
        };
        if asset.prefab.is_none() {
            self.selections.remove(&outcome.player);
            return Err(SpawnError::MissingPrefab(character));
        }
        if !asset.network_identity {
            self.selections.remove(&outcome.player);
            return Err(SpawnError::MissingNetworkIdentity(character));
        }

        let position = if self.spawn_points.is_empty() {
            Vec2::ZERO
        } else {
            self.spawn_points[outcome.player.0 as usize % self.spawn_points.len()]
        };
        let network_id = self.next_network_id;
        self.next_network_id += 1;

        let info = PlayerInfo {
            id: outcome.player,
            slot: outcome.slot,
            kind: outcome.seat.kind,
            character,
            palette: outcome.selection.palette,
            position,
            network_id,
        };
        self.players.insert(info.id, info.clone());
        info!(
            "{} spawned at ({}, {}) with network id {}",
            info.id, position.x, position.y, network_id
        );
        Ok(info)
    }

    fn abort_spawn(&mut self, player: PlayerId, err: &SpawnError) {
        error!("Spawn of {} aborted: {}", player, err);
        self.events.publish(&MatchEvent::SpawnAborted {
            player,
            reason: err.to_string(),
        });
    }
}

impl fmt::Debug for MatchCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchCore")
            .field("status", &self.status)
            .field("authority", &self.authority)
            .field("tick", &self.tick)
            .field("players", &self.players)
            .field("pending_spawns", &self.pending_spawns.len())
            .field("pending_completion", &self.pending_completion.len())
            .field("result", &self.result)
            .finish()
    }
}

/// Poll every ready future once, without a runtime.
fn drain_ready<T>(pending: &mut FuturesUnordered<LocalBoxFuture<'static, T>>) -> Vec<T> {
    let waker = futures_util::task::noop_waker();
    let mut cx = Context::from_waker(&waker);
    let mut ready = Vec::new();
    while let Poll::Ready(Some(output)) = pending.poll_next_unpin(&mut cx) {
        ready.push(output);
    }
    ready
}

// =============================================================================
// MATCH
// =============================================================================

struct RuleSlot {
    rule: Box<dyn MatchRule>,
    forced: bool,
}

/// A match and its rules.
pub struct Match {
    core: MatchCore,
    rules: Vec<RuleSlot>,
}

impl Match {
    /// Match with no rules.
    pub fn new(catalog: CharacterCatalog, loader: Box<dyn CharacterLoader>, authority: Authority) -> Self {
        Self {
            core: MatchCore::new(catalog, loader, authority),
            rules: Vec::new(),
        }
    }

    /// Match with every built-in rule registered, in tick order:
    /// stock, time, training, sudden death.
    pub fn with_default_rules(catalog: CharacterCatalog, loader: Box<dyn CharacterLoader>, authority: Authority) -> Self {
        let mut m = Self::new(catalog, loader, authority);
        for rule in rules::default_rules() {
            m.add_rule(rule);
        }
        m
    }

    /// Register a rule. Activation is decided at `initialize`.
    pub fn add_rule(&mut self, rule: Box<dyn MatchRule>) {
        self.rules.push(RuleSlot { rule, forced: false });
    }

    /// Register a rule that stays active regardless of configuration.
    pub fn force_rule(&mut self, rule: Box<dyn MatchRule>) {
        self.rules.push(RuleSlot { rule, forced: true });
    }

    /// Positions assigned to seats in order (wrapping). Defaults to origin.
    pub fn set_spawn_points(&mut self, points: Vec<Vec2>) {
        self.core.spawn_points = points;
    }

    /// Shared lifecycle state.
    pub fn core(&self) -> &MatchCore {
        &self.core
    }

    /// Current status.
    pub fn status(&self) -> MatchStatus {
        self.core.status
    }

    /// Spawned players in seat order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerInfo> {
        self.core.players()
    }

    /// Outcome once finished.
    pub fn result(&self) -> Option<MatchCompleted> {
        self.core.result
    }

    /// Names of registered (before `initialize`) or active (after) rules.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|slot| slot.rule.name()).collect()
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&MatchEvent) + 'static,
    {
        self.core.events.subscribe(handler)
    }

    /// Drop a lifecycle subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.core.events.unsubscribe(id)
    }

    /// Register a completion handler. The match resolves only after every
    /// future returned by these handlers has finished.
    pub fn on_completed<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&MatchCompleted) -> LocalBoxFuture<'static, ()> + 'static,
    {
        self.core.completion_handlers.subscribe(handler)
    }

    /// Drop a completion handler.
    pub fn unsubscribe_completed(&mut self, id: SubscriptionId) -> bool {
        self.core.completion_handlers.unsubscribe(id)
    }

    /// Activate rules and spawn every seat.
    pub fn initialize(&mut self, config: MatchConfig) -> Result<(), MatchError> {
        if self.core.status != MatchStatus::Initialization {
            return Err(MatchError::AlreadyInitialized(self.core.status));
        }
        if config.players.len() > MAX_SEATS {
            return Err(MatchError::TooManySeats(config.players.len()));
        }

        let core = &mut self.core;
        core.rng = DeterministicRng::new(config.spawn_seed());

        self.rules.retain_mut(|slot| {
            let active = slot.forced || slot.rule.check_active(&config);
            if active {
                slot.rule.on_initialize(&config, core);
            }
            debug!("Rule {} active: {}", slot.rule.name(), active);
            active
        });

        info!(
            "Initializing match {} with {} seats, rules {:?}",
            config.match_id,
            config.players.len(),
            self.rule_names()
        );

        let core = &mut self.core;
        core.status = MatchStatus::Spawning;
        if core.authority == Authority::Server {
            for (player, seat) in PlayerId::seats(config.players.len()).zip(&config.players) {
                if let Err(e) = core.begin_spawn(player, seat) {
                    core.abort_spawn(player, &e);
                }
            }
        }
        core.config = Some(config);
        core.status = MatchStatus::Running;
        core.events.publish(&MatchEvent::Started);

        self.poll_spawns();
        Ok(())
    }

    /// Advance one simulation tick.
    pub fn tick(&mut self, frame: FrameTime) -> Result<(), MatchError> {
        self.core.tick = frame.tick;
        self.poll_spawns();

        if self.core.status == MatchStatus::Running && self.core.authority == Authority::Server {
            for slot in self.rules.iter_mut() {
                if self.core.status != MatchStatus::Running {
                    break;
                }
                slot.rule.on_match_tick(&mut self.core, frame)?;
            }
        }

        self.core.drive_completion();
        Ok(())
    }

    /// End the match from outside the rules.
    pub fn finish(&mut self, result: MatchResult, winner: Option<PlayerId>) -> Result<(), MatchError> {
        self.core.finish(result, winner)
    }

    /// Route a death through the active rules.
    ///
    /// Deaths outside `Running` are ignored.
    pub fn report_player_death(&mut self, player: PlayerId, tick: Tick) -> Result<PlayerDeath, MatchError> {
        if !self.core.is_seat(player) {
            return Err(MatchError::UnknownPlayer(player));
        }
        let mut death = PlayerDeath::new(player, tick);
        if self.core.status != MatchStatus::Running {
            debug!("Ignoring death of {} while {}", player, self.core.status);
            return Ok(death);
        }

        for slot in self.rules.iter_mut() {
            slot.rule.on_player_died(&mut self.core, &mut death);
        }
        Ok(death)
    }

    /// Replicated state of the match and its rules.
    pub fn snapshot(&self) -> MatchSnapshot {
        let mut snapshot = MatchSnapshot {
            tick: self.core.tick,
            status: self.core.status,
            players: self.core.players.values().cloned().collect(),
            stocks: BTreeMap::new(),
            time_remaining: None,
            result: self.core.result,
        };
        for slot in &self.rules {
            slot.rule.write_snapshot(&mut snapshot);
        }
        snapshot
    }

    /// Mirror a host snapshot on a client.
    ///
    /// New players are announced, rule state is copied, and a finished host
    /// match finishes locally so completion handlers run here too.
    pub fn apply_snapshot(&mut self, snapshot: &MatchSnapshot) -> Result<(), MatchError> {
        if self.core.authority == Authority::Server {
            return Err(MatchError::Authoritative);
        }
        if self.core.status == MatchStatus::Initialization {
            return Err(MatchError::NotRunning(self.core.status));
        }
        self.core.tick = snapshot.tick;

        for info in &snapshot.players {
            let known = self.core.players.insert(info.id, info.clone()).is_some();
            if !known {
                for slot in self.rules.iter_mut() {
                    slot.rule.on_player_spawned(&mut self.core, info);
                }
                self.core.events.publish(&MatchEvent::PlayerSpawned(info.clone()));
            }
        }
        for slot in self.rules.iter_mut() {
            slot.rule.read_snapshot(snapshot);
        }

        if let Some(done) = snapshot.result {
            if self.core.status == MatchStatus::Running {
                self.core.finish(done.result, done.winner)?;
            }
        }
        self.core.drive_completion();
        Ok(())
    }

    fn poll_spawns(&mut self) {
        for outcome in drain_ready(&mut self.core.pending_spawns) {
            let player = outcome.player;
            match self.core.complete_spawn(outcome) {
                Ok(info) => {
                    for slot in self.rules.iter_mut() {
                        slot.rule.on_player_spawned(&mut self.core, &info);
                    }
                    self.core.events.publish(&MatchEvent::PlayerSpawned(info));
                }
                Err(e) => self.core.abort_spawn(player, &e),
            }
        }
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("core", &self.core)
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::character::{CatalogLoader, CharacterId, CharacterInfo};
    use crate::game::config::PlayerSlot;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn catalog() -> CharacterCatalog {
        CharacterCatalog::new([CharacterInfo::new(1, "Orin", 2), CharacterInfo::new(2, "Vela", 1)])
    }

    fn config(seats: usize) -> MatchConfig {
        let mut config = MatchConfig::new(11);
        for i in 0..seats {
            config.players.push(MatchPlayerConfig::with_character(
                PlayerSlot::new(0, i as u8),
                CharacterId(1),
                0,
            ));
        }
        config
    }

    fn frame(tick: Tick) -> FrameTime {
        FrameTime::new(tick, 1.0 / 60.0, 1.0)
    }

    fn recorded(m: &mut Match) -> Rc<RefCell<Vec<MatchEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        m.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        log
    }

    #[test]
    fn test_initialize_runs_and_spawns() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        let log = recorded(&mut m);
        m.initialize(config(2)).unwrap();

        assert_eq!(m.status(), MatchStatus::Running);
        assert_eq!(m.players().count(), 2);
        let events = log.borrow();
        assert_eq!(events[0], MatchEvent::Started);
        assert!(matches!(events[1], MatchEvent::PlayerSpawned(_)));
        assert!(matches!(events[2], MatchEvent::PlayerSpawned(_)));
    }

    #[test]
    fn test_double_initialize_fails_without_side_effects() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        m.initialize(config(2)).unwrap();
        let before = m.snapshot();

        let err = m.initialize(config(3)).unwrap_err();
        assert_eq!(err, MatchError::AlreadyInitialized(MatchStatus::Running));
        assert_eq!(m.snapshot(), before);
    }

    #[test]
    fn test_palette_collision_reassigns() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        m.initialize(config(2)).unwrap();
        let palettes: Vec<_> = m.players().map(|p| p.palette).collect();
        assert_eq!(palettes, vec![0, 1]);
    }

    #[test]
    fn test_palette_exhaustion_aborts_one_seat() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        let log = recorded(&mut m);
        m.initialize(config(3)).unwrap();

        assert_eq!(m.status(), MatchStatus::Running);
        assert_eq!(m.players().count(), 2);
        assert!(log
            .borrow()
            .iter()
            .any(|e| matches!(e, MatchEvent::SpawnAborted { player: PlayerId(2), .. })));
    }

    #[test]
    fn test_duplicate_slot_aborts_second_seat() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        let mut cfg = config(2);
        cfg.players[1].slot = cfg.players[0].slot;
        m.initialize(cfg).unwrap();

        let ids: Vec<_> = m.players().map(|p| p.id).collect();
        assert_eq!(ids, vec![PlayerId(0)]);
    }

    #[test]
    fn test_spawn_points_and_network_ids() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        m.set_spawn_points(vec![Vec2::new(-3.0, 0.0), Vec2::new(3.0, 0.0)]);
        m.initialize(config(2)).unwrap();

        let players: Vec<_> = m.players().cloned().collect();
        assert_eq!(players[0].position, Vec2::new(-3.0, 0.0));
        assert_eq!(players[1].position, Vec2::new(3.0, 0.0));
        assert_ne!(players[0].network_id, players[1].network_id);
    }

    #[test]
    fn test_finish_without_handlers_resolves_immediately() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        m.initialize(config(2)).unwrap();
        m.finish(MatchResult::HasWinner, Some(PlayerId(1))).unwrap();

        assert_eq!(m.status(), MatchStatus::Resolved);
        assert_eq!(
            m.finish(MatchResult::Tie, None),
            Err(MatchError::NotRunning(MatchStatus::Resolved))
        );
    }

    #[test]
    fn test_finish_before_initialize_fails() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        assert_eq!(
            m.finish(MatchResult::Tie, None),
            Err(MatchError::NotRunning(MatchStatus::Initialization))
        );
    }

    #[test]
    fn test_death_of_unknown_player_rejected() {
        let mut m = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        m.initialize(config(2)).unwrap();
        assert_eq!(
            m.report_player_death(PlayerId(9), 1),
            Err(MatchError::UnknownPlayer(PlayerId(9)))
        );
    }

    #[test]
    fn test_client_does_not_tick_rules_or_spawn() {
        let mut m = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Client);
        m.initialize(config(2).with_time(0.01)).unwrap();
        assert_eq!(m.players().count(), 0);

        m.tick(frame(1)).unwrap();
        assert_eq!(m.status(), MatchStatus::Running);
    }

    #[test]
    fn test_snapshot_applies_on_client() {
        let mut host = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
        host.initialize(config(2).with_stocks(2)).unwrap();
        host.report_player_death(PlayerId(0), 5).unwrap();

        let mut client = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Client);
        client.initialize(config(2).with_stocks(2)).unwrap();
        client.apply_snapshot(&host.snapshot()).unwrap();

        let snap = client.snapshot();
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.stocks[&PlayerId(0)], 1);
        assert_eq!(snap.stocks[&PlayerId(1)], 2);

        assert_eq!(host.apply_snapshot(&snap), Err(MatchError::Authoritative));
    }

    #[test]
    fn test_snapshot_before_client_initialize_rejected() {
        let mut host = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
        host.initialize(config(2).with_stocks(1)).unwrap();
        host.finish(MatchResult::HasWinner, Some(PlayerId(1))).unwrap();

        let mut client = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Client);
        assert_eq!(
            client.apply_snapshot(&host.snapshot()),
            Err(MatchError::NotRunning(MatchStatus::Initialization))
        );
        assert_eq!(client.status(), MatchStatus::Initialization);
        assert_eq!(client.result(), None);
        assert_eq!(client.rule_names().len(), 4);
    }

    #[test]
    fn test_too_many_seats_rejected_before_side_effects() {
        let mut m = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
        let log = recorded(&mut m);
        let mut cfg = MatchConfig::new(5).with_stocks(3);
        for i in 0..=MAX_SEATS as u32 {
            cfg.players.push(MatchPlayerConfig::random(PlayerSlot::new(i, 0)));
        }

        assert_eq!(m.initialize(cfg), Err(MatchError::TooManySeats(MAX_SEATS + 1)));
        assert_eq!(m.status(), MatchStatus::Initialization);
        assert_eq!(m.players().count(), 0);
        assert_eq!(m.rule_names().len(), 4);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_full_roster_keeps_every_seat() {
        let roster = CharacterCatalog::new([CharacterInfo::new(1, "Orin", MAX_SEATS as u32)]);
        let mut m = Match::with_default_rules(roster, Box::new(CatalogLoader), Authority::Server);
        let mut cfg = MatchConfig::new(5).with_stocks(3);
        for i in 0..MAX_SEATS as u32 {
            cfg.players.push(MatchPlayerConfig::with_character(PlayerSlot::new(i, 0), CharacterId(1), i));
        }
        m.initialize(cfg).unwrap();

        assert_eq!(m.players().count(), MAX_SEATS);
        let first = m.core().player(PlayerId(0)).unwrap();
        assert_eq!(first.slot, PlayerSlot::new(0, 0));
        let last = m.core().player(PlayerId(u8::MAX)).unwrap();
        assert_eq!(last.slot, PlayerSlot::new(MAX_SEATS as u32 - 1, 0));
        assert_eq!(last.id.to_string(), "P256");
        assert_eq!(m.snapshot().stocks.len(), MAX_SEATS);
    }

    #[test]
    fn test_snapshot_digest_tracks_state() {
        let mut m = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
        m.initialize(config(2).with_stocks(3)).unwrap();
        let before = m.snapshot().digest();
        assert_eq!(before, m.snapshot().digest());

        m.report_player_death(PlayerId(1), 3).unwrap();
        assert_ne!(before, m.snapshot().digest());
    }
}
