use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use ar_core::World;
use ar_mechanics::Rules;
use ar_persistence::{PersistConfig, PlayerStore, Snapshotter, restore_players};
use ar_simulation::{
    BroadcastHub, CommandHandler, GameLoop, SimConfig, Simulation, shared, spawn_sender,
};
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::content;

pub struct ServeOptions {
    pub content_dir: PathBuf,
    pub data_dir: PathBuf,
    pub seed: u64,
    pub tick: Duration,
    pub save_interval: Duration,
    pub start_map: String,
    pub run_for: Option<Duration>,
}

pub fn run(options: ServeOptions) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(serve(options))
}

async fn serve(options: ServeOptions) -> Result<()> {
    let loaded = content::load_dir(&options.content_dir)?;
    if loaded.content.map(&options.start_map).is_none() {
        bail!("start map '{}' is not defined", options.start_map);
    }

    let config = SimConfig::default()
        .with_seed(options.seed)
        .with_tick_interval(options.tick)
        .with_start_map(options.start_map.as_str())
        .with_rules(Rules::default().with_enhancement(loaded.enhancement));
    let persist = PersistConfig::default()
        .with_data_dir(&options.data_dir)
        .with_interval(options.save_interval);
    let store = PlayerStore::new(&persist)
        .with_context(|| format!("opening data directory '{}'", options.data_dir.display()))?;

    let mut world = World::from_content(loaded.content);
    let saved = store.load().context("loading saved players")?;
    let restored = restore_players(&mut world, saved);
    info!(
        players = restored,
        monsters = world.monster_count(),
        "world ready"
    );
    let world = shared(world);

    let hub = Arc::new(BroadcastHub::new(config.channel_capacity));
    let observer = spawn_sender(hub.subscribe(), |message| async move {
        debug!(kind = message.kind(), "broadcast");
        true
    });

    let handler = Arc::new(CommandHandler::new(
        Arc::clone(&world),
        hub.clone(),
        Arc::new(config.clone()),
    ));
    let reloader = spawn_reload_on_hangup(handler, options.content_dir.clone())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut game_loop = GameLoop::new(Arc::clone(&world), Simulation::new(config), hub.clone());
    let loop_shutdown = shutdown_rx.clone();
    let loop_task = tokio::spawn(async move { game_loop.run(loop_shutdown).await });

    let snapshotter = Snapshotter::new(Arc::clone(&world), store, persist.interval);
    let save_task = tokio::spawn(async move { snapshotter.run(shutdown_rx).await });

    wait_for_shutdown(options.run_for).await?;
    info!("shutting down");
    if shutdown_tx.send(true).is_err() {
        debug!("background tasks already stopped");
    }

    loop_task.await.context("game loop task failed")?;
    save_task.await.context("snapshot task failed")?;
    reloader.abort();
    observer.abort();
    Ok(())
}

async fn wait_for_shutdown(run_for: Option<Duration>) -> Result<()> {
    match run_for {
        Some(limit) => {
            tokio::select! {
                result = signal::ctrl_c() => result.context("listening for ctrl-c")?,
                () = tokio::time::sleep(limit) => info!(secs = limit.as_secs_f64(), "run time elapsed"),
            }
        }
        None => signal::ctrl_c().await.context("listening for ctrl-c")?,
    }
    Ok(())
}

/// Re-read the content directory on SIGHUP and swap it into the running
/// world. A directory that fails to load leaves the current tables in place.
#[cfg(unix)]
fn spawn_reload_on_hangup(handler: Arc<CommandHandler>, dir: PathBuf) -> Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangups = signal(SignalKind::hangup()).context("installing SIGHUP handler")?;
    Ok(tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!(dir = %dir.display(), "reloading content");
            match content::load_dir(&dir) {
                Ok(loaded) => {
                    let spawned = handler.reload_world(loaded.content).await;
                    info!(spawned, "content reloaded");
                }
                Err(err) => error!(error = %format!("{err:#}"), "content reload failed"),
            }
        }
    }))
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_handler: Arc<CommandHandler>, _dir: PathBuf) -> Result<JoinHandle<()>> {
    Ok(tokio::spawn(async {}))
}
