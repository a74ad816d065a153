//! Standalone city traffic simulation
//!
//! Cars and pedestrians navigate a fixed grid of roads, sidewalks and
//! crossings, obey traffic lights and avoid each other while a scheduler
//! advances the whole population one tick at a time.

mod agent;
mod builder;
mod config;
mod demo;
mod grid;
mod pathfinding;
mod spawner;
mod stats;
mod traffic_light;
mod types;
mod world;

pub use agent::{Action, AgentState, NavAgent, NavState, Perception, StepOutcome};
pub use builder::{
    build_world, decode_map, Destinations, MapLayout, StaticEntitySpec, StaticWorld,
    WorldBuildError,
};
pub use config::{SimConfig, SpawnConfig};
pub use demo::{demo_city, DemoCity, DEMO_HEIGHT, DEMO_WIDTH};
pub use grid::{Cell, Grid, Occupant};
pub use pathfinding::{find_path, has_surface, is_reachable, neighbors, reachability_graph, route};
pub use spawner::{SpawnRequest, Spawner};
pub use stats::{KindStats, SimulationStats};
pub use traffic_light::TrafficLight;
pub use types::{
    AgentId, AgentKind, Coord, Direction, EntityKind, LightId, SimId, StaticKind,
    DEFAULT_MAX_AGENTS, DEFAULT_SEED, DEFAULT_SIGNAL_PERIOD, DEFAULT_SPAWN_INTERVAL,
    REPLAN_WAIT_THRESHOLD,
};
pub use world::{EntitySnapshot, UnreachableRoute, World};
