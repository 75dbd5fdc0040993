mod config; // brings `config.rs` in as `crate::config`
mod demo; // in-process host used by the scripted session

use std::sync::Arc;
use std::time::Duration;

use tapmove_geometry::WorldPoint;
use tapmove_navigation::{GridCell, GridParams, Pathfinder};
use tapmove_session::{
    HostPorts, Identity, InMemoryLockStore, InputAdapter, LockCoordinator, LockMessage, LockStore, PointerEvent,
    Routed, SessionEventBus, SystemClock, TapMoveController, TapOutcome, Topic,
};
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Settings, load_settings};
use crate::demo::{DemoScene, LogNotifier, LogOverlay};

/// One connected user: their controller and input routing.
struct Client {
    name: String,
    controller: TapMoveController,
    input: InputAdapter,
    scene: Arc<DemoScene>,
}

impl Client {
    async fn tap(&mut self, screen: WorldPoint) {
        let routed = self.input.route(PointerEvent::Tap { x: screen.x, y: screen.y }, self.scene.as_ref());
        let Routed::Tap(point) = routed else {
            info!(client = %self.name, ?routed, "Tap left to the host");
            return;
        };
        match self.controller.handle_tap(point).await {
            Ok(TapOutcome::Moved(summary)) => info!(client = %self.name, %summary, "Move finished"),
            Ok(outcome) => info!(client = %self.name, ?outcome, state = %self.controller.state(), "Tap handled"),
            Err(e) => warn!(client = %self.name, error = %e, state = %self.controller.state(), "Tap rejected"),
        }
    }
}

type SharedClient = Arc<Mutex<Client>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Tapmove demo started.");
    let settings = load_settings();

    settings.pathfinding.validate()?;
    let grid = settings.measurement.grid()?;
    let scene = Arc::new(DemoScene::new(grid.clone(), Duration::from_millis(settings.demo.step_delay_ms))?);
    let store = Arc::new(InMemoryLockStore::new());
    let topic: Topic<LockMessage> = Topic::new(64);

    let player = client(&settings, &scene, &store, &topic, Identity::new("player", "Pat", false));
    let gm = client(&settings, &scene, &store, &topic, Identity::new("gm", "Game Master", true));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::try_join!(
        async {
            let result = script(&player, &gm, &grid).await;
            let _ = shutdown_tx.send(true);
            result
        },
        recovery_ticker(
            vec![player.clone(), gm.clone()],
            Duration::from_millis(settings.demo.recovery_tick_ms),
            shutdown_rx.clone()
        ),
        lock_watch(store.clone(), shutdown_rx),
    )?;

    for id in ["goblin", "wolf"] {
        if let Some(p) = scene.position(id) {
            info!(%id, position = %p, "Final token position");
        }
    }
    info!("Tapmove demo finished.");
    Ok(())
}

fn client(
    settings: &Settings,
    scene: &Arc<DemoScene>,
    store: &Arc<InMemoryLockStore>,
    topic: &Topic<LockMessage>,
    identity: Identity,
) -> SharedClient {
    let name = identity.name.clone();
    let ports = HostPorts {
        scene: scene.clone(),
        overlay: Arc::new(LogOverlay { client: name.clone() }),
        notifier: Arc::new(LogNotifier { client: name.clone() }),
    };
    let locks = LockCoordinator::new(identity, store.clone(), topic.clone(), settings.locks, Arc::new(SystemClock));
    let controller = TapMoveController::new(
        ports,
        locks,
        Pathfinder::new(settings.pathfinding),
        settings.session.clone(),
        Arc::new(SessionEventBus::new()),
    );
    Arc::new(Mutex::new(Client {
        name,
        controller,
        input: InputAdapter::new(settings.input.mode),
        scene: scene.clone(),
    }))
}

/// Player previews a move through the doorway, the GM takes the goblin
/// over, then the player moves the wolf instead.
async fn script(player: &SharedClient, gm: &SharedClient, grid: &GridParams) -> anyhow::Result<()> {
    let at = |col, row| grid.cell_center(GridCell::new(col, row));
    let pause = Duration::from_millis(400);

    player.lock().await.tap(at(1, 1)).await;
    player.lock().await.tap(at(9, 1)).await;
    tokio::time::sleep(pause).await;

    gm.lock().await.tap(at(1, 1)).await;
    tokio::time::sleep(pause).await;
    gm.lock().await.tap(at(1, 1)).await;

    let mut player = player.lock().await;
    player.tap(at(2, 6)).await;
    player.tap(at(5, 6)).await;
    // Confirm slightly off-center, within tolerance.
    let anchor = at(5, 6);
    player.tap(WorldPoint::new(anchor.x + 10.0, anchor.y - 10.0)).await;
    Ok(())
}

/// Periodically drains lock messages and runs error recovery for each client.
async fn recovery_ticker(
    clients: Vec<SharedClient>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    info!("Recovery ticker started.");
    let mut tick = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                for client in &clients {
                    // Skip clients busy animating; they sync between waypoints.
                    let Ok(mut client) = client.try_lock() else { continue };
                    let before = client.controller.state();
                    let after = client.controller.tick();
                    if before != after {
                        info!(client = %client.name, %before, %after, "State changed on tick");
                    }
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    info!("Recovery ticker stopped.");
    Ok(())
}

async fn lock_watch(store: Arc<InMemoryLockStore>, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
    let mut changes = store.watch();
    loop {
        tokio::select! {
            change = changes.recv() => match change {
                Ok(change) => match &change.lock {
                    Some(lock) => info!(entity = %change.entity, owner = %lock.owner, "Lock record set"),
                    None => info!(entity = %change.entity, "Lock record cleared"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Lock watcher lagged by {} changes.", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    error!("Lock store closed.");
                    return Err(anyhow::anyhow!("lock store change feed closed"));
                }
            },
            _ = shutdown.changed() => break,
        }
    }
    Ok(())
}
