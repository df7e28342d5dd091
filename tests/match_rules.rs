//! End-to-end match scenarios: stock and time rules, lifecycle
//! preconditions, asynchronous spawn loading and completion.

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::future::{FutureExt, LocalBoxFuture};
use tokio::sync::oneshot;

use fray::core::time::FrameTime;
use fray::game::{
    Authority, CatalogLoader, CharacterAsset, CharacterCatalog, CharacterId, CharacterInfo,
    CharacterLoader, Match, MatchConfig, MatchError, MatchEvent, MatchPlayerConfig, MatchResult,
    MatchStatus, PlayerId, PlayerSlot, SpawnError, TrainingMatch,
};

const P1: PlayerId = PlayerId(0);
const P2: PlayerId = PlayerId(1);

fn catalog() -> CharacterCatalog {
    CharacterCatalog::new([CharacterInfo::new(1, "Orin", 4), CharacterInfo::new(2, "Vela", 4)])
}

fn two_players() -> MatchConfig {
    MatchConfig::new(2024)
        .with_player(MatchPlayerConfig::with_character(PlayerSlot::new(0, 0), CharacterId(1), 0))
        .with_player(MatchPlayerConfig::with_character(PlayerSlot::new(1, 0), CharacterId(2), 0))
}

fn frame(tick: u32, dt: f32) -> FrameTime {
    FrameTime::new(tick, dt, 1.0)
}

fn record_events(game: &mut Match) -> Rc<RefCell<Vec<MatchEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    game.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    log
}

fn respawns(log: &Rc<RefCell<Vec<MatchEvent>>>, player: PlayerId) -> usize {
    log.borrow()
        .iter()
        .filter(|e| matches!(e, MatchEvent::RespawnRequested { player: p, .. } if *p == player))
        .count()
}

fn completions(log: &Rc<RefCell<Vec<MatchEvent>>>) -> usize {
    log.borrow()
        .iter()
        .filter(|e| matches!(e, MatchEvent::Completed(_)))
        .count()
}

// =============================================================================
// STOCK
// =============================================================================

#[test]
fn test_stock_match_last_player_standing_wins() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    let log = record_events(&mut game);
    game.initialize(two_players().with_stocks(3)).unwrap();
    assert_eq!(game.rule_names(), vec!["stock"]);
    assert_eq!(game.snapshot().stocks[&P1], 3);

    for (i, tick) in [10, 20, 30].into_iter().enumerate() {
        let death = game.report_player_death(P1, tick).unwrap();
        assert!(death.revived);
        assert_eq!(respawns(&log, P1), i + 1);
    }
    assert_eq!(game.snapshot().stocks[&P1], 0);

    // Already out: no decrement, no respawn.
    let death = game.report_player_death(P1, 35).unwrap();
    assert!(!death.revived);
    assert_eq!(game.snapshot().stocks[&P1], 0);
    assert_eq!(respawns(&log, P1), 3);

    game.tick(frame(36, 1.0 / 60.0)).unwrap();
    let result = game.result().unwrap();
    assert_eq!(result.result, MatchResult::HasWinner);
    assert_eq!(result.winner, Some(P2));
    assert_eq!(game.status(), MatchStatus::Resolved);
}

#[test]
fn test_stock_match_continues_while_both_have_stocks() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    game.initialize(two_players().with_stocks(2)).unwrap();

    game.report_player_death(P1, 5).unwrap();
    for tick in 6..100 {
        game.tick(frame(tick, 1.0 / 60.0)).unwrap();
    }
    assert_eq!(game.status(), MatchStatus::Running);
}

#[test]
fn test_stock_match_simultaneous_elimination_is_tie() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    game.initialize(two_players().with_stocks(1)).unwrap();

    game.report_player_death(P1, 50).unwrap();
    game.report_player_death(P2, 50).unwrap();
    game.tick(frame(51, 1.0 / 60.0)).unwrap();

    let result = game.result().unwrap();
    assert_eq!(result.result, MatchResult::Tie);
    assert_eq!(result.winner, None);
}

#[test]
fn test_deaths_after_completion_are_ignored() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    let log = record_events(&mut game);
    game.initialize(two_players().with_stocks(1)).unwrap();

    game.report_player_death(P1, 1).unwrap();
    game.tick(frame(2, 1.0 / 60.0)).unwrap();
    assert_eq!(game.status(), MatchStatus::Resolved);

    let death = game.report_player_death(P2, 3).unwrap();
    assert!(!death.revived);
    assert_eq!(respawns(&log, P2), 0);
    assert_eq!(game.snapshot().stocks[&P2], 1);
}

// =============================================================================
// TIME
// =============================================================================

#[test]
fn test_time_match_finishes_once_as_tie() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    let log = record_events(&mut game);
    game.initialize(two_players().with_time(10.0)).unwrap();
    assert_eq!(game.rule_names(), vec!["time"]);

    for tick in 1..20 {
        game.tick(frame(tick, 0.5)).unwrap();
    }
    assert_eq!(game.status(), MatchStatus::Running);
    assert_eq!(game.snapshot().time_remaining, Some(0.5));

    for tick in 20..30 {
        game.tick(frame(tick, 0.5)).unwrap();
    }
    assert_eq!(completions(&log), 1);
    let result = game.result().unwrap();
    assert_eq!(result.result, MatchResult::Tie);
    assert_eq!(result.winner, None);
}

#[test]
fn test_time_counts_unscaled_delta() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    game.initialize(two_players().with_time(1.0)).unwrap();

    for tick in 1..=4 {
        game.tick(FrameTime::new(tick, 0.25, 0.0)).unwrap();
    }
    assert_eq!(game.status(), MatchStatus::Resolved);
}

#[test]
fn test_stock_and_time_together() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    game.initialize(two_players().with_stocks(1).with_time(60.0)).unwrap();
    assert_eq!(game.rule_names(), vec!["stock", "time"]);

    game.report_player_death(P2, 5).unwrap();
    game.tick(frame(6, 1.0)).unwrap();

    assert_eq!(game.result().unwrap().winner, Some(P1));
    assert_eq!(game.snapshot().time_remaining, Some(60.0));
}

// =============================================================================
// TRAINING / ACTIVATION
// =============================================================================

#[test]
fn test_no_rules_active_without_limits() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    game.initialize(two_players()).unwrap();
    assert!(game.rule_names().is_empty());
}

#[test]
fn test_training_respawns_every_death() {
    let mut game = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
    game.force_rule(Box::new(TrainingMatch::new()));
    let log = record_events(&mut game);
    game.initialize(two_players()).unwrap();
    assert_eq!(game.rule_names(), vec!["training"]);

    for tick in 1..=10 {
        assert!(game.report_player_death(P1, tick).unwrap().revived);
    }
    assert_eq!(respawns(&log, P1), 10);
    assert_eq!(game.status(), MatchStatus::Running);
}

// =============================================================================
// LIFECYCLE PRECONDITIONS
// =============================================================================

#[test]
fn test_double_initialize_rejected() {
    let mut game = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    let log = record_events(&mut game);
    game.initialize(two_players().with_stocks(3)).unwrap();
    let events_before = log.borrow().len();

    assert_eq!(
        game.initialize(two_players().with_time(5.0)),
        Err(MatchError::AlreadyInitialized(MatchStatus::Running))
    );
    assert_eq!(log.borrow().len(), events_before);
    assert_eq!(game.rule_names(), vec!["stock"]);
}

#[test]
fn test_double_finish_rejected() {
    let mut game = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
    let (_tx, rx) = oneshot::channel::<()>();
    let mut rx = Some(rx);
    game.on_completed(move |_| {
        let rx = rx.take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
        }
        .boxed_local()
    });
    game.initialize(two_players()).unwrap();

    game.finish(MatchResult::Tie, None).unwrap();
    assert_eq!(
        game.finish(MatchResult::HasWinner, Some(P1)),
        Err(MatchError::NotRunning(MatchStatus::Completed))
    );
}

// =============================================================================
// ASYNC COMPLETION
// =============================================================================

#[test]
fn test_resolves_only_after_completion_handlers() {
    let mut game = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
    let log = record_events(&mut game);

    let (tx, rx) = oneshot::channel::<()>();
    let mut rx = Some(rx);
    game.on_completed(move |_| {
        let rx = rx.take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
        }
        .boxed_local()
    });
    // Synchronous handler alongside the pending one.
    game.on_completed(|_| async {}.boxed_local());

    game.initialize(two_players()).unwrap();
    game.finish(MatchResult::HasWinner, Some(P2)).unwrap();
    assert_eq!(game.status(), MatchStatus::Completed);
    assert_eq!(game.core().pending_completion(), 1);

    game.tick(frame(1, 1.0 / 60.0)).unwrap();
    assert_eq!(game.status(), MatchStatus::Completed);

    tx.send(()).unwrap();
    game.tick(frame(2, 1.0 / 60.0)).unwrap();
    assert_eq!(game.status(), MatchStatus::Resolved);

    let events = log.borrow();
    let completed = events.iter().position(|e| matches!(e, MatchEvent::Completed(_))).unwrap();
    let resolved = events.iter().position(|e| matches!(e, MatchEvent::Resolved(_))).unwrap();
    assert!(completed < resolved);
}

// =============================================================================
// REPLICATION
// =============================================================================

#[test]
fn test_client_resolves_after_finished_host_snapshot() {
    let mut host = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Server);
    host.initialize(two_players().with_stocks(1)).unwrap();
    host.report_player_death(P1, 10).unwrap();
    host.tick(frame(10, 1.0 / 60.0)).unwrap();
    assert_eq!(host.status(), MatchStatus::Resolved);

    let mut client = Match::with_default_rules(catalog(), Box::new(CatalogLoader), Authority::Client);
    let log = record_events(&mut client);
    let (tx, rx) = oneshot::channel::<()>();
    let mut rx = Some(rx);
    client.on_completed(move |_| {
        let rx = rx.take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
        }
        .boxed_local()
    });
    client.initialize(two_players().with_stocks(1)).unwrap();

    client.apply_snapshot(&host.snapshot()).unwrap();
    assert_eq!(client.status(), MatchStatus::Completed);
    assert_eq!(client.result(), host.result());
    assert_eq!(client.result().and_then(|done| done.winner), Some(P2));
    assert_eq!(client.core().pending_completion(), 1);

    tx.send(()).unwrap();
    client.tick(frame(11, 1.0 / 60.0)).unwrap();
    assert_eq!(client.status(), MatchStatus::Resolved);

    let events = log.borrow();
    let completed = events.iter().position(|e| matches!(e, MatchEvent::Completed(_))).unwrap();
    let resolved = events.iter().position(|e| matches!(e, MatchEvent::Resolved(_))).unwrap();
    assert!(completed < resolved);
    assert_eq!(completions(&log), 1);
}

// =============================================================================
// ASYNC SPAWN
// =============================================================================

type LoadSender = oneshot::Sender<Result<CharacterAsset, SpawnError>>;

/// Loader whose loads finish when the test says so.
#[derive(Clone, Default)]
struct ManualLoader {
    pending: Rc<RefCell<Vec<LoadSender>>>,
}

impl CharacterLoader for ManualLoader {
    fn load(&mut self, _character: &CharacterInfo) -> LocalBoxFuture<'static, Result<CharacterAsset, SpawnError>> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push(tx);
        async move {
            rx.await
                .unwrap_or_else(|_| Err(SpawnError::LoadFailed("loader dropped".into())))
        }
        .boxed_local()
    }
}

fn asset() -> CharacterAsset {
    CharacterAsset {
        prefab: Some("characters/test".into()),
        network_identity: true,
    }
}

#[test]
fn test_spawns_complete_independently() {
    let loader = ManualLoader::default();
    let pending = Rc::clone(&loader.pending);
    let mut game = Match::with_default_rules(catalog(), Box::new(loader), Authority::Server);
    let log = record_events(&mut game);

    game.initialize(two_players().with_stocks(3)).unwrap();
    assert_eq!(game.status(), MatchStatus::Running);
    assert_eq!(game.core().pending_spawns(), 2);
    assert_eq!(game.players().count(), 0);

    let mut senders: Vec<LoadSender> = pending.borrow_mut().drain(..).collect();
    let second = senders.pop().unwrap();
    let first = senders.pop().unwrap();

    second.send(Ok(asset())).unwrap();
    game.tick(frame(1, 1.0 / 60.0)).unwrap();
    let ids: Vec<_> = game.players().map(|p| p.id).collect();
    assert_eq!(ids, vec![P2]);

    // One player spawned, one still loading: no winner yet.
    assert_eq!(game.status(), MatchStatus::Running);

    first.send(Ok(asset())).unwrap();
    game.tick(frame(2, 1.0 / 60.0)).unwrap();
    assert_eq!(game.players().count(), 2);
    assert_eq!(game.status(), MatchStatus::Running);

    let spawned = log
        .borrow()
        .iter()
        .filter(|e| matches!(e, MatchEvent::PlayerSpawned(_)))
        .count();
    assert_eq!(spawned, 2);
}

#[test]
fn test_failed_loads_abort_single_spawn() {
    let loader = ManualLoader::default();
    let pending = Rc::clone(&loader.pending);
    let mut game = Match::new(catalog(), Box::new(loader), Authority::Server);
    let log = record_events(&mut game);

    let config = two_players().with_player(MatchPlayerConfig::with_character(
        PlayerSlot::new(2, 0),
        CharacterId(1),
        1,
    ));
    game.initialize(config).unwrap();

    let senders: Vec<LoadSender> = pending.borrow_mut().drain(..).collect();
    let mut senders = senders.into_iter();
    senders
        .next()
        .unwrap()
        .send(Ok(CharacterAsset { prefab: None, network_identity: true }))
        .unwrap();
    senders
        .next()
        .unwrap()
        .send(Ok(CharacterAsset { prefab: Some("x".into()), network_identity: false }))
        .unwrap();
    senders.next().unwrap().send(Ok(asset())).unwrap();
    game.tick(frame(1, 1.0 / 60.0)).unwrap();

    assert_eq!(game.status(), MatchStatus::Running);
    let ids: Vec<_> = game.players().map(|p| p.id).collect();
    assert_eq!(ids, vec![PlayerId(2)]);

    let aborted: Vec<PlayerId> = log
        .borrow()
        .iter()
        .filter_map(|e| match e {
            MatchEvent::SpawnAborted { player, .. } => Some(*player),
            _ => None,
        })
        .collect();
    assert_eq!(aborted.len(), 2);
    assert!(aborted.contains(&P1));
    assert!(aborted.contains(&P2));
}

#[test]
fn test_random_selection_is_reproducible() {
    let config = MatchConfig::new(99)
        .with_player(MatchPlayerConfig::random(PlayerSlot::new(0, 0)))
        .with_player(MatchPlayerConfig::random(PlayerSlot::new(0, 1)))
        .with_player(MatchPlayerConfig::random(PlayerSlot::new(0, 2)));

    let picks = |config: MatchConfig| {
        let mut game = Match::new(catalog(), Box::new(CatalogLoader), Authority::Server);
        game.initialize(config).unwrap();
        game.players().map(|p| (p.character, p.palette)).collect::<Vec<_>>()
    };

    let a = picks(config.clone());
    let b = picks(config);
    assert_eq!(a, b);
    assert_eq!(a.len(), 3);

    // No two players share a character and palette.
    for i in 0..a.len() {
        for j in (i + 1)..a.len() {
            assert_ne!(a[i], a[j]);
        }
    }
}
