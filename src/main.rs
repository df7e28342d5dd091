//! Fray Simulation Demo
//!
//! Runs a scripted two-player stock match on a fixed-rate tokio interval.
//! Pass a JSON `SimulationConfig` path as the first argument to override
//! the defaults.

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::FutureExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fray::{
    SimulationConfig, TICK_RATE, VERSION,
    game::{
        Authority, CatalogLoader, CharacterCatalog, CharacterInfo, Match, MatchConfig,
        MatchPlayerConfig, MatchStatus, PlayerId, PlayerSlot, Simulation,
    },
    input::{ChannelSampler, InputDevice, InputTarget, RawSample, SampleValue},
    network::{encode, ServerMessage},
};

/// Ticks between scripted deaths of player one
const DEATH_INTERVAL: u32 = 90;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => SimulationConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    info!("Fray simulation v{}", VERSION);
    info!("Tick Rate: {} Hz (default {})", config.tick_rate, TICK_RATE);

    let catalog = CharacterCatalog::new([
        CharacterInfo::new(1, "Orin", 4),
        CharacterInfo::new(2, "Vela", 4),
        CharacterInfo::new(3, "Brask", 2),
    ]);
    let mut game = Match::with_default_rules(catalog, Box::new(CatalogLoader), Authority::Server);
    game.set_spawn_points(vec![glam::Vec2::new(-4.0, 0.0), glam::Vec2::new(4.0, 0.0)]);

    game.subscribe(|event| {
        if let Some(message) = ServerMessage::from_event(event) {
            match encode(&message) {
                Ok(bytes) => info!("Broadcast {:?} ({} bytes)", event, bytes.len()),
                Err(e) => tracing::warn!("Failed to encode {:?}: {}", event, e),
            }
        }
    });
    game.on_completed(|done| {
        info!("Victory screen for {:?}", done.winner);
        async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            info!("Victory screen finished");
        }
        .boxed_local()
    });

    let match_config = MatchConfig::new(12345)
        .with_player(MatchPlayerConfig::random(PlayerSlot::new(0, 0)))
        .with_player(MatchPlayerConfig::random(PlayerSlot::new(0, 1)))
        .with_stocks(3);
    info!("Match ID: {}", match_config.match_id);

    let mut sim = Simulation::new(config, game);
    sim.game_mut().initialize(match_config)?;

    let mut senders = Vec::new();
    for seat in 0..2u8 {
        let (sampler, tx) = ChannelSampler::new();
        let device = InputDevice::gamepad(format!("Pad {}", seat + 1), "scripted")
            .with_sort_order(seat as i32)
            .with_sampler(sampler);
        let id = sim.registry_mut().attach_device(device)?;
        sim.bind_device(PlayerId(seat), id)?;
        senders.push(tx);
    }

    let mut interval = tokio::time::interval(Duration::from_secs_f32(sim.config().tick_duration()));
    loop {
        interval.tick().await;
        let tick = sim.tick() + 1;

        // Player one sways, player two jumps every half second.
        let sway = ((tick as f32) * 0.05).sin();
        let jump = tick % 30 == 0;
        senders[0].send(RawSample { target: InputTarget::LeftStickX, value: SampleValue::Value(sway) })?;
        senders[1].send(RawSample { target: InputTarget::Action3, value: SampleValue::State(jump) })?;

        sim.step_fixed()?;

        if tick % DEATH_INTERVAL == 0 && sim.game().status() == MatchStatus::Running {
            let death = sim.game_mut().report_player_death(PlayerId(0), tick)?;
            info!("Player one died at tick {} (respawn: {})", tick, death.revived);
        }

        if sim.game().status() == MatchStatus::Resolved {
            break;
        }
    }

    sim.finalize_recordings();
    for (player, recorder) in sim.recorders() {
        info!(
            "{}: {} slice changes over ticks {}..={}, digest {}",
            player,
            recorder.deltas().len(),
            recorder.start_tick,
            recorder.end_tick,
            hex::encode(recorder.digest())
        );
    }

    let snapshot = sim.game().snapshot();
    info!("Result: {:?}", snapshot.result);
    info!("Final snapshot digest: {}", hex::encode(snapshot.digest()));
    Ok(())
}
