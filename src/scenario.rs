use std::collections::HashMap;

use anyhow::Context;
use tracing::{info, info_span, warn};
use waymark_common::{Aabb, Collider, EntityId, Vector3, WorldPoint};
use waymark_navigation::{
    Actor, Direction, Grid, GridSquare, MovementBounds, SearchWindow, find_next_best_location,
    pathfind, pathfind_avoid_local_obstacle, resolve_local_obstacle,
};

use crate::config::{ActorSettings, RequestSettings, Settings};

/// Movement bounds from configuration, with a configurable fallback radius.
#[derive(Debug, Default)]
pub struct BoundRegistry {
    bounds: HashMap<EntityId, i32>,
    default_bound: i32,
}

impl BoundRegistry {
    pub fn new(default_bound: i32) -> Self {
        Self {
            bounds: HashMap::new(),
            default_bound,
        }
    }

    pub fn register(&mut self, actor: EntityId, bound: i32) {
        self.bounds.insert(actor, bound);
    }
}

impl MovementBounds for BoundRegistry {
    fn pathfinding_bound(&self, actor: EntityId) -> Option<i32> {
        self.bounds.get(&actor).copied()
    }

    fn bound_or_default(&self, actor: EntityId) -> i32 {
        self.pathfinding_bound(actor).unwrap_or(self.default_bound)
    }
}

/// Outcome of one request, kept for rendering.
#[derive(Debug)]
pub struct Plan {
    pub name: String,
    pub window: SearchWindow,
    pub waypoints: Vec<WorldPoint>,
}

fn point([x, y, z]: [f32; 3]) -> WorldPoint {
    WorldPoint::new(x, y, z)
}

fn actor_from(settings: &ActorSettings, at: &WorldPoint) -> Actor {
    let [hx, hy, hz] = settings.half_extents;
    Actor::new(
        EntityId(settings.id),
        Aabb::from_center(*at, Vector3::new(hx, hy, hz)),
    )
}

/// Builds the grid described by `settings` and fills it from the configured colliders.
pub fn build_grid(settings: &Settings) -> anyhow::Result<Grid> {
    let mut grid = Grid::new(settings.grid.extent, settings.grid.spacing)
        .context("Failed to create navigation grid")?;

    let colliders: Vec<Collider> = settings
        .colliders
        .iter()
        .map(|c| Collider {
            entity: EntityId(c.entity),
            bounds: Aabb::new(point(c.min), point(c.max)),
            layer: c.layer,
        })
        .collect();
    grid.populate(&colliders);
    Ok(grid)
}

/// Plans a single request against the grid.
pub fn plan_request(
    grid: &mut Grid,
    registry: &BoundRegistry,
    request: &RequestSettings,
    settings: &Settings,
) -> Plan {
    let start = point(request.start);
    let goal = point(request.goal);
    let actor = request.actor.as_ref().map(|a| actor_from(a, &start));

    let window = actor
        .as_ref()
        .and_then(|actor| grid.pathfind_range(&actor.bounds, registry.bound_or_default(actor.id)))
        .unwrap_or_else(|| grid.full_window());

    let heading = request.heading.map(point).and_then(|h| Direction::from_vector(&h.coords));
    let waypoints = match (&actor, &request.obstacle, heading) {
        (Some(actor), Some(obstacle), Some(direction)) => {
            let obstacle = Aabb::new(point(obstacle.min), point(obstacle.max));
            resolve_local_obstacle(grid, &actor.bounds, &obstacle, direction)
        }
        _ => match reachable_goal(grid, &start, &goal, &window, actor.as_ref()) {
            None => {
                warn!(request = %request.name, "No free cell near the goal");
                Vec::new()
            }
            Some(goal) => match (&actor, &request.obstacle) {
                (Some(actor), Some(obstacle)) => {
                    let obstacle = Aabb::new(point(obstacle.min), point(obstacle.max));
                    pathfind_avoid_local_obstacle(grid, actor, registry, &obstacle, &start, &goal)
                }
                (None, Some(_)) => {
                    warn!(request = %request.name, "Obstacle given without an actor, ignoring it");
                    plan_direct(grid, request, settings, &window, &start, &goal)
                }
                _ => plan_direct(grid, request, settings, &window, &start, &goal),
            },
        },
    };

    Plan {
        name: request.name.clone(),
        window,
        waypoints,
    }
}

/// Moves an occupied goal to the nearest cell the actor fits in.
///
/// Goals that are free, or that do not map onto the grid, are returned unchanged.
fn reachable_goal(
    grid: &Grid,
    start: &WorldPoint,
    goal: &WorldPoint,
    window: &SearchWindow,
    actor: Option<&Actor>,
) -> Option<WorldPoint> {
    if !grid.is_occupied_at(goal) {
        return Some(*goal);
    }
    let (Some(from), Some(target)) = (grid.world_to_grid(start), grid.world_to_grid(goal)) else {
        return Some(*goal);
    };
    let extents = actor
        .and_then(|actor| grid.extents(&actor.bounds))
        .unwrap_or(GridSquare::ZERO);

    let free = find_next_best_location(grid, from, target, window, extents)?;
    info!(%target, %free, "Goal is occupied, redirecting");
    grid.grid_to_world(free)
}

fn plan_direct(
    grid: &Grid,
    request: &RequestSettings,
    settings: &Settings,
    window: &SearchWindow,
    start: &WorldPoint,
    goal: &WorldPoint,
) -> Vec<WorldPoint> {
    let model = request.algorithm.unwrap_or(settings.pathfinding.algorithm);
    let result = pathfind(grid, start, goal, window, model);
    info!(request = %request.name, %result, "Planned request");
    result.into_waypoints()
}

/// Runs every configured request and prints each route over the grid.
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let mut grid = build_grid(settings)?;

    let mut registry = BoundRegistry::new(settings.pathfinding.default_bound);
    for actor in settings.requests.iter().filter_map(|r| r.actor.as_ref()) {
        if let Some(bound) = actor.bound {
            registry.register(EntityId(actor.id), bound);
        }
    }

    for request in &settings.requests {
        let span = info_span!("request", name = %request.name);
        let _enter = span.enter();

        let plan = plan_request(&mut grid, &registry, request, settings);
        let squares: Vec<GridSquare> = plan
            .waypoints
            .iter()
            .filter_map(|w| grid.world_to_grid(w))
            .collect();

        if plan.waypoints.is_empty() {
            warn!("No route found");
        } else {
            info!(waypoints = plan.waypoints.len(), "Route found");
        }

        println!("== {} ==", plan.name);
        for waypoint in &plan.waypoints {
            println!("  ({:.2}, {:.2}, {:.2})", waypoint.x, waypoint.y, waypoint.z);
        }
        print!(
            "{}",
            grid.render_window(
                &plan.window,
                &squares,
                grid.world_to_grid(&point(request.start)),
                grid.world_to_grid(&point(request.goal)),
            )
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoxSettings, ColliderSettings, GridSettings, PathfindingSettings};
    use waymark_common::CollisionLayer;
    use waymark_navigation::CostModel;

    fn settings() -> Settings {
        Settings {
            grid: GridSettings {
                extent: 10,
                spacing: 1.0,
            },
            pathfinding: PathfindingSettings {
                default_bound: 50,
                algorithm: CostModel::Weighted,
            },
            colliders: vec![ColliderSettings {
                entity: 9,
                min: [-1.0, 0.0, -3.0],
                max: [0.5, 2.0, 2.5],
                layer: CollisionLayer::Building,
            }],
            requests: Vec::new(),
        }
    }

    fn request(name: &str, start: [f32; 3], goal: [f32; 3]) -> RequestSettings {
        RequestSettings {
            name: name.to_string(),
            start,
            goal,
            actor: None,
            obstacle: None,
            heading: None,
            algorithm: None,
        }
    }

    #[test]
    fn test_build_grid_populates_buildings() {
        let grid = build_grid(&settings()).unwrap();
        assert_eq!(grid.occupant(GridSquare::new(5, 5)), Some(EntityId(9)));
        assert!(!grid.is_occupied(GridSquare::new(5, 7)));
    }

    #[test]
    fn test_plan_routes_around_building() {
        let settings = settings();
        let mut grid = build_grid(&settings).unwrap();
        let registry = BoundRegistry::new(settings.pathfinding.default_bound);

        let plan = plan_request(
            &mut grid,
            &registry,
            &request("walk", [-4.0, 0.0, 0.0], [3.0, 0.0, 0.0]),
            &settings,
        );
        assert!(plan.waypoints.len() > 2);
        assert!(plan.waypoints.iter().all(|w| !grid.is_occupied_at(w)));
    }

    #[test]
    fn test_registry_bound_limits_window() {
        let settings = settings();
        let mut grid = build_grid(&settings).unwrap();
        let mut registry = BoundRegistry::new(settings.pathfinding.default_bound);
        registry.register(EntityId(1), 2);

        let mut walk = request("short leash", [-3.0, 0.0, -1.0], [3.0, 0.0, 0.0]);
        walk.actor = Some(ActorSettings {
            id: 1,
            half_extents: [0.3, 0.5, 0.3],
            bound: Some(2),
        });
        let plan = plan_request(&mut grid, &registry, &walk, &settings);
        assert_eq!(plan.window.min, GridSquare::new(2, 0));
        assert_eq!(plan.window.max, GridSquare::new(6, 4));
        // The goal sits at column 8, outside the window
        assert!(plan.waypoints.is_empty());
    }

    #[test]
    fn test_occupied_goal_is_redirected() {
        let settings = settings();
        let mut grid = build_grid(&settings).unwrap();
        let registry = BoundRegistry::new(settings.pathfinding.default_bound);
        assert!(grid.is_occupied(GridSquare::new(5, 5)));

        let plan = plan_request(
            &mut grid,
            &registry,
            &request("into the wall", [-4.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
            &settings,
        );
        assert!(!plan.waypoints.is_empty());
        let nearest = grid.grid_to_world(GridSquare::new(5, 6)).unwrap();
        assert_eq!(*plan.waypoints.last().unwrap(), nearest);
        assert!(plan.waypoints.iter().all(|w| !grid.is_occupied_at(w)));
    }

    #[test]
    fn test_obstacle_request_restores_grid() {
        let settings = settings();
        let mut grid = build_grid(&settings).unwrap();
        let registry = BoundRegistry::new(settings.pathfinding.default_bound);

        let mut walk = request("detour", [2.0, 0.0, -4.0], [2.0, 0.0, 3.0]);
        walk.actor = Some(ActorSettings {
            id: 2,
            half_extents: [0.3, 0.5, 0.3],
            bound: None,
        });
        walk.obstacle = Some(BoxSettings {
            min: [1.5, 0.0, -0.5],
            max: [3.5, 1.0, 0.5],
        });
        let plan = plan_request(&mut grid, &registry, &walk, &settings);
        assert!(!plan.waypoints.is_empty());
        assert!(!grid.is_occupied(GridSquare::new(5, 7)));
    }
}
