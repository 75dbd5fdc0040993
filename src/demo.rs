//! In-process stand-ins for the hosting tabletop.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tapmove_geometry::WorldPoint;
use tapmove_navigation::{GridParams, NavigationError, SceneBounds, WallSegment, WorldContext};
use tapmove_session::{EntityId, EntityInfo, Notice, Notifier, PathOverlay, PathPreview, SceneHost, UserId};
use tracing::{info, warn};

/// Scene shared by every demo client.
pub struct DemoScene {
    world: RwLock<WorldContext>,
    entities: RwLock<HashMap<EntityId, EntityInfo>>,
    users: HashMap<UserId, String>,
    step_delay: Duration,
}

impl DemoScene {
    /// A 12x8 room split by a wall with a doorway.
    pub fn new(grid: GridParams, step_delay: Duration) -> Result<Self, NavigationError> {
        let size = grid.cell_size();
        let bounds = SceneBounds::new(0.0, 0.0, 12.0 * size, 8.0 * size)?;
        let walls = vec![
            WallSegment::new(6.0 * size, 0.0, 6.0 * size, 3.0 * size),
            WallSegment::new(6.0 * size, 4.0 * size, 6.0 * size, 8.0 * size),
        ];
        let world = WorldContext::new(grid, bounds).with_walls(walls);

        let center = |col: f64, row: f64| WorldPoint::new((col + 0.5) * size, (row + 0.5) * size);
        let entities = [
            EntityInfo {
                id: "goblin".into(),
                name: "Goblin".into(),
                position: center(1.0, 1.0),
                owners: vec!["player".into()],
                movement: Some(30.0),
            },
            EntityInfo {
                id: "wolf".into(),
                name: "Wolf".into(),
                position: center(2.0, 6.0),
                owners: vec!["player".into()],
                movement: Some(40.0),
            },
        ]
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect();

        let users = [("player", "Pat"), ("gm", "Game Master")]
            .into_iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect();

        Ok(Self {
            world: RwLock::new(world),
            entities: RwLock::new(entities),
            users,
            step_delay,
        })
    }

    pub fn position(&self, id: &str) -> Option<WorldPoint> {
        self.entities.read().get(id).map(|e| e.position)
    }
}

#[async_trait]
impl SceneHost for DemoScene {
    fn world(&self) -> WorldContext {
        (*self.world.read()).clone()
    }

    fn entity(&self, id: &EntityId) -> Option<EntityInfo> {
        self.entities.read().get(id).cloned()
    }

    fn entity_at(&self, point: WorldPoint) -> Option<EntityId> {
        let world = self.world.read();
        let grid = world.grid.as_ref()?;
        let cell = grid.cell_at(point);
        self.entities
            .read()
            .values()
            .find(|e| grid.cell_at(e.position) == cell)
            .map(|e| e.id.clone())
    }

    fn screen_to_world(&self, x: f64, y: f64) -> WorldPoint {
        WorldPoint::new(x, y)
    }

    fn user_name(&self, id: &UserId) -> Option<String> {
        self.users.get(id).cloned()
    }

    async fn move_entity(&self, id: &EntityId, to: WorldPoint) -> anyhow::Result<()> {
        tokio::time::sleep(self.step_delay).await;
        let mut entities = self.entities.write();
        let entity = entities
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("entity {id} is not in the scene"))?;
        entity.position = to;
        info!(%id, %to, "Token moved");
        Ok(())
    }
}

/// Overlay that logs what a renderer would draw.
pub struct LogOverlay {
    pub client: String,
}

impl PathOverlay for LogOverlay {
    fn show(&self, preview: &PathPreview) {
        let [r, g, b] = preview.tier.color();
        info!(
            client = %self.client,
            entity = %preview.entity,
            destination = %preview.destination,
            steps = preview.path.len(),
            label = %preview.label(),
            tier = ?preview.tier,
            color = %format!("#{r:02x}{g:02x}{b:02x}"),
            cut_cells = preview.cut_cells.len(),
            "Showing path preview"
        );
    }

    fn clear(&self) {
        info!(client = %self.client, "Clearing path preview");
    }
}

/// Notifier that logs notices and chat messages.
pub struct LogNotifier {
    pub client: String,
}

#[async_trait]
impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        warn!(client = %self.client, "{}", notice);
    }

    async fn post_chat(&self, message: String) -> anyhow::Result<()> {
        info!(client = %self.client, "[chat] {}", message);
        Ok(())
    }
}
