use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};
use waymark_common::CollisionLayer;
use waymark_navigation::{CostModel, DEFAULT_PATHFINDING_BOUND};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Everything the scenario runner reads from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub grid: GridSettings,
    #[serde(default)]
    pub pathfinding: PathfindingSettings,
    #[serde(default)]
    pub colliders: Vec<ColliderSettings>,
    #[serde(default)]
    pub requests: Vec<RequestSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSettings {
    /// Cells per side.
    pub extent: i32,
    /// World units per cell edge.
    pub spacing: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathfindingSettings {
    /// Movement radius, in cells, for actors without their own bound.
    #[serde(default = "default_bound")]
    pub default_bound: i32,
    #[serde(default)]
    pub algorithm: CostModel,
}

impl Default for PathfindingSettings {
    fn default() -> Self {
        Self {
            default_bound: DEFAULT_PATHFINDING_BOUND,
            algorithm: CostModel::default(),
        }
    }
}

fn default_bound() -> i32 {
    DEFAULT_PATHFINDING_BOUND
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColliderSettings {
    pub entity: u32,
    pub min: [f32; 3],
    pub max: [f32; 3],
    #[serde(default)]
    pub layer: CollisionLayer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActorSettings {
    pub id: u32,
    /// Half size of the actor's bounding box.
    #[serde(default = "default_half_extents")]
    pub half_extents: [f32; 3],
    /// Registered movement radius in cells.
    pub bound: Option<i32>,
}

fn default_half_extents() -> [f32; 3] {
    [0.4, 0.5, 0.4]
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxSettings {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// One movement request to plan.
///
/// With an `obstacle` and an `actor` the request is replanned around the
/// obstacle. Adding a `heading` asks for a side-step instead.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestSettings {
    pub name: String,
    pub start: [f32; 3],
    pub goal: [f32; 3],
    pub actor: Option<ActorSettings>,
    pub obstacle: Option<BoxSettings>,
    pub heading: Option<[f32; 3]>,
    pub algorithm: Option<CostModel>,
}

/// Loads settings from `path`, or the default file, with `WAYMARK__` environment overrides.
pub fn load_settings(path: Option<&str>) -> Result<Settings, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    info!("Attempting to load configuration from {}", path);

    let settings: Result<Settings, ConfigError> = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix("WAYMARK").separator("__"))
        .build()
        .and_then(|config| config.try_deserialize());

    match settings {
        Ok(settings) => {
            info!(
                extent = settings.grid.extent,
                spacing = settings.grid.spacing,
                colliders = settings.colliders.len(),
                requests = settings.requests.len(),
                "Successfully loaded configuration"
            );
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let source = r#"
            [grid]
            extent = 20
            spacing = 0.5

            [pathfinding]
            algorithm = "uniform"

            [[colliders]]
            entity = 3
            min = [0.0, 0.0, 0.0]
            max = [1.0, 2.0, 1.0]
            layer = "building"

            [[requests]]
            name = "walk"
            start = [-4.0, 0.0, 0.0]
            goal = [4.0, 0.0, 0.0]

            [requests.actor]
            id = 1
            bound = 6
        "#;
        let settings: Settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.grid.extent, 20);
        assert_eq!(settings.pathfinding.algorithm, CostModel::Uniform);
        assert_eq!(settings.pathfinding.default_bound, DEFAULT_PATHFINDING_BOUND);
        assert_eq!(settings.colliders[0].layer, CollisionLayer::Building);
        let actor = settings.requests[0].actor.as_ref().unwrap();
        assert_eq!(actor.bound, Some(6));
        assert_eq!(actor.half_extents, default_half_extents());
        assert!(settings.requests[0].obstacle.is_none());
    }
}
