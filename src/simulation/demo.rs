//! Demo city used by the headless runner
//!
//! A 14x10 block: a counter-clockwise one-way ring road with a cross street
//! and a north-bound avenue, a sidewalk ring around the outside, two
//! signal-controlled pedestrian crossings and a handful of destinations.

use super::builder::StaticEntitySpec;
use super::config::SpawnConfig;
use super::types::{Coord, Direction};

pub const DEMO_WIDTH: u32 = 14;
pub const DEMO_HEIGHT: u32 = 10;

/// Static content and entry cells of the demo city
#[derive(Debug, Clone)]
pub struct DemoCity {
    pub width: u32,
    pub height: u32,
    pub entities: Vec<StaticEntitySpec>,
    pub car_entries: Vec<Coord>,
    pub pedestrian_entries: Vec<Coord>,
}

impl DemoCity {
    /// Spawner settings using the demo entry cells
    pub fn spawn_config(&self, base: SpawnConfig) -> SpawnConfig {
        SpawnConfig {
            car_entries: self.car_entries.clone(),
            pedestrian_entries: self.pedestrian_entries.clone(),
            ..base
        }
    }
}

pub fn demo_city() -> DemoCity {
    let mut entities = Vec::new();
    let road = |x: i32, y: i32, direction: Direction| StaticEntitySpec::road(Coord::new(x, y), direction);

    // Ring road
    for x in 1..=11 {
        entities.push(road(x, 1, Direction::Right));
    }
    for y in 1..=7 {
        entities.push(road(12, y, Direction::Up));
    }
    for x in 2..=12 {
        entities.push(road(x, 8, Direction::Left));
    }
    for y in 2..=8 {
        entities.push(road(1, y, Direction::Down));
    }

    // Cross street and avenue, meeting at (6, 4)
    for x in 2..=11 {
        entities.push(road(x, 4, Direction::Right));
    }
    for y in [2, 3, 5, 6, 7] {
        entities.push(road(6, y, Direction::Up));
    }

    // Outer sidewalk ring
    for x in 0..=13 {
        for y in [0, 9] {
            entities.push(StaticEntitySpec::sidewalk(Coord::new(x, y), Direction::Left));
        }
    }
    for y in 1..=8 {
        entities.push(StaticEntitySpec::sidewalk(Coord::new(13, y), Direction::Up));
        entities.push(StaticEntitySpec::sidewalk(Coord::new(0, y), Direction::Down));
    }

    // Inner sidewalks, joined across the avenue by plain crossings
    for x in (2..=5).chain(7..=11) {
        entities.push(StaticEntitySpec::sidewalk(Coord::new(x, 2), Direction::Right));
        entities.push(StaticEntitySpec::sidewalk(Coord::new(x, 7), Direction::Left));
    }
    entities.push(StaticEntitySpec::pedestrian_walk(Coord::new(6, 2), Direction::Right));
    entities.push(StaticEntitySpec::pedestrian_walk(Coord::new(6, 7), Direction::Left));

    // Signal-controlled crossings over the ring road, plus the junction light
    entities.push(StaticEntitySpec::pedestrian_walk(Coord::new(9, 1), Direction::Up));
    entities.push(StaticEntitySpec::traffic_light(Coord::new(9, 1), false, 6));
    entities.push(StaticEntitySpec::pedestrian_walk(Coord::new(9, 8), Direction::Down));
    entities.push(StaticEntitySpec::traffic_light(Coord::new(9, 8), true, 6));
    entities.push(StaticEntitySpec::traffic_light(Coord::new(6, 4), false, 8));

    // Destinations
    let destinations = [
        Coord::new(3, 5),
        Coord::new(10, 3),
        Coord::new(4, 6),
        Coord::new(8, 5),
    ];
    for coord in destinations {
        entities.push(StaticEntitySpec::destination(coord));
    }

    // City blocks
    for y in [3, 5, 6] {
        for x in (2..=5).chain(7..=11) {
            let coord = Coord::new(x, y);
            if !destinations.contains(&coord) {
                entities.push(StaticEntitySpec::obstacle(coord));
            }
        }
    }

    DemoCity {
        width: DEMO_WIDTH,
        height: DEMO_HEIGHT,
        entities,
        car_entries: vec![
            Coord::new(1, 1),
            Coord::new(12, 1),
            Coord::new(12, 8),
            Coord::new(1, 8),
        ],
        pedestrian_entries: vec![
            Coord::new(0, 0),
            Coord::new(13, 0),
            Coord::new(0, 9),
            Coord::new(13, 9),
        ],
    }
}
