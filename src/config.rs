use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tapmove_navigation::{DiagonalRule, GridParams, GridTopology, NavigationError, PathfinderConfig};
use tapmove_session::{InputMode, LockPolicy, SessionConfig};
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "TAPMOVE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub mode: InputMode,
}

/// Grid used by the demo scene.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeasurementSettings {
    pub topology: GridTopology,
    pub cell_size: f64,
    pub distance_per_cell: f64,
    pub units: String,
    pub diagonal_rule: DiagonalRule,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            topology: GridTopology::Square,
            cell_size: 100.0,
            distance_per_cell: 5.0,
            units: "ft".to_string(),
            diagonal_rule: DiagonalRule::Equidistant,
        }
    }
}

impl MeasurementSettings {
    pub fn grid(&self) -> Result<GridParams, NavigationError> {
        Ok(GridParams::new(self.topology, self.cell_size, self.distance_per_cell)?
            .with_diagonal_rule(self.diagonal_rule)
            .with_units(self.units.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Simulated animation time per waypoint.
    pub step_delay_ms: u64,
    pub recovery_tick_ms: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self { step_delay_ms: 150, recovery_tick_ms: 250 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pathfinding: PathfinderConfig,
    pub session: SessionConfig,
    pub locks: LockPolicy,
    pub input: InputSettings,
    pub measurement: MeasurementSettings,
    pub demo: DemoSettings,
}

fn build(path: &str) -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .build()?
        .try_deserialize()
}

/// Loads settings from `config/default.toml` and `TAPMOVE__*` variables.
/// Falls back to defaults when the sources cannot be parsed.
pub fn load_settings() -> Settings {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    match build(DEFAULT_CONFIG_PATH) {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            settings
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            warn!("Continuing with default configuration");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = build("config/does-not-exist.toml").unwrap();
        assert_eq!(settings.pathfinding.max_iterations, 5000);
        assert_eq!(settings.session.confirm_tolerance, 25.0);
        assert_eq!(settings.locks.stale_after_ms, 300_000);
        assert_eq!(settings.input.mode, InputMode::TapWorkflow);
    }

    #[test]
    fn test_default_file_parses() {
        let settings = build(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml")).unwrap();
        assert_eq!(settings.measurement.diagonal_rule, DiagonalRule::Alternating);
        assert_eq!(settings.measurement.grid().unwrap().units(), "ft");
        assert!(settings.locks.gm_override);
    }
}
