//! Routes raw pointer input either to the host's native drag handling or to
//! the tap workflow, depending on configuration.

use serde::{Deserialize, Serialize};
use tapmove_geometry::WorldPoint;

use crate::host::SceneHost;

/// How token movement is driven.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Leave drag-and-drop to the host.
    NativeDrag,
    /// Select, preview and confirm by tapping.
    #[default]
    TapWorkflow,
}

/// Pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Tap { x: f64, y: f64 },
    DragStart { x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd { x: f64, y: f64 },
}

/// Where an event should go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Routed {
    /// Let the host handle it as usual.
    Host(PointerEvent),
    /// Feed the world-space tap to the movement controller.
    Tap(WorldPoint),
    /// Swallow it.
    Suppressed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputAdapter {
    mode: InputMode,
}

impl InputAdapter {
    pub fn new(mode: InputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    pub fn route(&self, event: PointerEvent, host: &dyn SceneHost) -> Routed {
        match (self.mode, event) {
            (InputMode::NativeDrag, event) => Routed::Host(event),
            (InputMode::TapWorkflow, PointerEvent::Tap { x, y }) => Routed::Tap(host.screen_to_world(x, y)),
            // Token drags would bypass locking and previews.
            (InputMode::TapWorkflow, _) => Routed::Suppressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EntityInfo;
    use crate::{EntityId, UserId};
    use async_trait::async_trait;
    use tapmove_navigation::WorldContext;

    // Screen is the world scaled by two.
    struct ZoomedHost;

    #[async_trait]
    impl SceneHost for ZoomedHost {
        fn world(&self) -> WorldContext {
            WorldContext::default()
        }
        fn entity(&self, _: &EntityId) -> Option<EntityInfo> {
            None
        }
        fn entity_at(&self, _: WorldPoint) -> Option<EntityId> {
            None
        }
        fn screen_to_world(&self, x: f64, y: f64) -> WorldPoint {
            WorldPoint::new(x / 2.0, y / 2.0)
        }
        fn user_name(&self, _: &UserId) -> Option<String> {
            None
        }
        async fn move_entity(&self, _: &EntityId, _: WorldPoint) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tap_workflow_routes_taps_and_suppresses_drags() {
        let adapter = InputAdapter::new(InputMode::TapWorkflow);
        assert_eq!(
            adapter.route(PointerEvent::Tap { x: 100.0, y: 40.0 }, &ZoomedHost),
            Routed::Tap(WorldPoint::new(50.0, 20.0))
        );
        assert_eq!(adapter.route(PointerEvent::DragStart { x: 0.0, y: 0.0 }, &ZoomedHost), Routed::Suppressed);
    }

    #[test]
    fn test_native_drag_passes_everything_through() {
        let mut adapter = InputAdapter::default();
        adapter.set_mode(InputMode::NativeDrag);
        let drag = PointerEvent::DragEnd { x: 1.0, y: 2.0 };
        assert_eq!(adapter.route(drag, &ZoomedHost), Routed::Host(drag));
        let tap = PointerEvent::Tap { x: 1.0, y: 2.0 };
        assert_eq!(adapter.route(tap, &ZoomedHost), Routed::Host(tap));
    }

    #[test]
    fn test_mode_from_config_string() {
        let mode: InputMode = serde_json::from_str("\"native_drag\"").unwrap();
        assert_eq!(mode, InputMode::NativeDrag);
    }
}
