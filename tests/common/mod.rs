#![allow(dead_code)]

use city_traffic::simulation::{
    build_world, Coord, Direction, SimConfig, SpawnConfig, StaticEntitySpec, StaticWorld, World,
};

pub const CORRIDOR_ROW: i32 = 5;

/// A 10x10 grid with a single left-to-right road along row 5
pub fn corridor_entities(destination: Option<Coord>) -> Vec<StaticEntitySpec> {
    let mut entities: Vec<StaticEntitySpec> = (0..10)
        .map(|x| StaticEntitySpec::road(Coord::new(x, CORRIDOR_ROW), Direction::Right))
        .collect();
    if let Some(coord) = destination {
        entities.push(StaticEntitySpec::destination(coord));
    }
    entities
}

pub fn corridor_static(extra: &[StaticEntitySpec]) -> StaticWorld {
    let mut entities = corridor_entities(Some(Coord::new(9, CORRIDOR_ROW)));
    entities.extend_from_slice(extra);
    build_world(10, 10, &entities).expect("corridor should build")
}

/// Corridor world with spawning disabled
pub fn corridor_world(extra: &[StaticEntitySpec]) -> World {
    World::new(corridor_static(extra), quiet_config()).expect("world should build")
}

/// Config whose spawner never creates anything
pub fn quiet_config() -> SimConfig {
    SimConfig {
        spawn: SpawnConfig {
            car_entries: Vec::new(),
            pedestrian_entries: Vec::new(),
            ..SpawnConfig::default()
        },
        ..SimConfig::default()
    }
}

pub fn corridor(x: i32) -> Coord {
    Coord::new(x, CORRIDOR_ROW)
}
