//! One-time world construction from a list of static entities
//!
//! The map loader hands over fully decoded entities; this module validates
//! them, places them on a fresh [`Grid`] and derives the traffic lights and
//! per-kind destination sets the simulation needs.

use std::collections::HashMap;

use thiserror::Error;

use super::grid::{Grid, Occupant};
use super::pathfinding::has_surface;
use super::traffic_light::TrafficLight;
use super::types::{
    AgentKind, Coord, Direction, LightId, SimId, StaticKind, DEFAULT_SIGNAL_PERIOD,
};

/// Reasons a world refuses to build
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldBuildError {
    #[error("grid must have a non-zero size, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    #[error("grid of {width}x{height} exceeds the addressable coordinate range")]
    GridTooLarge { width: u32, height: u32 },

    #[error("{kind} at {coord} lies outside the {width}x{height} grid")]
    OutOfBounds {
        coord: Coord,
        kind: StaticKind,
        width: u32,
        height: u32,
    },

    #[error("{kind} at {coord} has no direction")]
    MissingDirection { coord: Coord, kind: StaticKind },

    #[error("traffic light at {coord} has a zero signal period")]
    ZeroSignalPeriod { coord: Coord },

    #[error("{kind} placed twice at {coord}")]
    DuplicateStatic { coord: Coord, kind: StaticKind },

    #[error("unknown map symbol {symbol:?} at {coord}")]
    UnknownSymbol { coord: Coord, symbol: char },
}

/// A static entity as handed over by the world loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticEntitySpec {
    pub coord: Coord,
    pub kind: StaticKind,
    pub direction: Option<Direction>,
    /// Flip period for traffic lights; [`DEFAULT_SIGNAL_PERIOD`] when unset
    pub signal_period: Option<u32>,
    /// Starting signal for traffic lights (`true` lets cars through)
    pub initial_signal: bool,
}

impl StaticEntitySpec {
    fn plain(coord: Coord, kind: StaticKind, direction: Option<Direction>) -> Self {
        Self {
            coord,
            kind,
            direction,
            signal_period: None,
            initial_signal: false,
        }
    }

    pub fn road(coord: Coord, direction: Direction) -> Self {
        Self::plain(coord, StaticKind::Road, Some(direction))
    }

    pub fn sidewalk(coord: Coord, direction: Direction) -> Self {
        Self::plain(coord, StaticKind::Sidewalk, Some(direction))
    }

    pub fn pedestrian_walk(coord: Coord, direction: Direction) -> Self {
        Self::plain(coord, StaticKind::PedestrianWalk, Some(direction))
    }

    pub fn obstacle(coord: Coord) -> Self {
        Self::plain(coord, StaticKind::Obstacle, None)
    }

    pub fn destination(coord: Coord) -> Self {
        Self::plain(coord, StaticKind::Destination, None)
    }

    pub fn traffic_light(coord: Coord, initial_signal: bool, period: u32) -> Self {
        Self {
            coord,
            kind: StaticKind::TrafficLight,
            direction: None,
            signal_period: Some(period),
            initial_signal,
        }
    }

    /// Decode one character of the text map alphabet
    ///
    /// `.` and space are empty cells. Lights, destinations and crossings sit
    /// on a road heading `road_heading`; lights use the default period, `S`
    /// starts red and `s` starts green. Sidewalks head `Left`.
    pub fn from_symbol(
        coord: Coord,
        symbol: char,
        road_heading: Direction,
    ) -> Result<Vec<Self>, WorldBuildError> {
        let road = Self::road(coord, road_heading);
        let specs = match symbol {
            '.' | ' ' => Vec::new(),
            '>' => vec![Self::road(coord, Direction::Right)],
            '<' => vec![Self::road(coord, Direction::Left)],
            '^' => vec![Self::road(coord, Direction::Up)],
            'v' => vec![Self::road(coord, Direction::Down)],
            'S' => vec![road, Self::traffic_light(coord, false, DEFAULT_SIGNAL_PERIOD)],
            's' => vec![road, Self::traffic_light(coord, true, DEFAULT_SIGNAL_PERIOD)],
            'D' => vec![road, Self::destination(coord)],
            'C' => vec![road, Self::pedestrian_walk(coord, road_heading)],
            '#' => vec![Self::obstacle(coord)],
            'B' => vec![Self::sidewalk(coord, Direction::Left)],
            _ => return Err(WorldBuildError::UnknownSymbol { coord, symbol }),
        };
        Ok(specs)
    }
}

/// Static content decoded from a text map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayout {
    pub width: u32,
    pub height: u32,
    pub entities: Vec<StaticEntitySpec>,
}

/// Decode a text map, top row first
///
/// Cells that carry a road under another entity take the heading of the
/// first adjacent arrow that points away from them (left `<`, right `>`,
/// above `^`, below `v`) and default to `Left`.
pub fn decode_map(lines: &[&str]) -> Result<MapLayout, WorldBuildError> {
    let rows: Vec<Vec<char>> = lines.iter().map(|line| line.chars().collect()).collect();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let height = rows.len();

    let symbol_at = |column: usize, row: Option<usize>| {
        row.and_then(|row| rows.get(row))
            .and_then(|line| line.get(column))
            .copied()
    };

    let mut entities = Vec::new();
    for (row, line) in rows.iter().enumerate() {
        for (column, &symbol) in line.iter().enumerate() {
            let neighbours = [
                (column.checked_sub(1), Some(row), '<', Direction::Left),
                (Some(column + 1), Some(row), '>', Direction::Right),
                (Some(column), row.checked_sub(1), '^', Direction::Up),
                (Some(column), Some(row + 1), 'v', Direction::Down),
            ];
            let heading = neighbours
                .into_iter()
                .find(|&(column, row, arrow, _)| {
                    column.and_then(|column| symbol_at(column, row)) == Some(arrow)
                })
                .map_or(Direction::Left, |(_, _, _, direction)| direction);

            let coord = Coord::new(column as i32, (height - row - 1) as i32);
            entities.extend(StaticEntitySpec::from_symbol(coord, symbol, heading)?);
        }
    }

    Ok(MapLayout {
        width: u32::try_from(width).unwrap_or(u32::MAX),
        height: u32::try_from(height).unwrap_or(u32::MAX),
        entities,
    })
}

/// Destination cells usable by each agent kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destinations {
    pub cars: Vec<Coord>,
    pub pedestrians: Vec<Coord>,
}

impl Destinations {
    pub fn for_kind(&self, kind: AgentKind) -> &[Coord] {
        match kind {
            AgentKind::Car => &self.cars,
            AgentKind::Pedestrian => &self.pedestrians,
        }
    }

    fn for_kind_mut(&mut self, kind: AgentKind) -> &mut Vec<Coord> {
        match kind {
            AgentKind::Car => &mut self.cars,
            AgentKind::Pedestrian => &mut self.pedestrians,
        }
    }
}

/// Everything produced by [`build_world`]
#[derive(Debug, Clone)]
pub struct StaticWorld {
    pub grid: Grid,
    pub lights: HashMap<LightId, TrafficLight>,
    pub destinations: Destinations,
    /// First id not taken by a static entity
    pub next_id: usize,
}

/// Validate `entities` and place them on a `width x height` grid
///
/// Ids are assigned in input order, so identical input always yields an
/// identical world.
pub fn build_world(
    width: u32,
    height: u32,
    entities: &[StaticEntitySpec],
) -> Result<StaticWorld, WorldBuildError> {
    if width == 0 || height == 0 {
        return Err(WorldBuildError::EmptyGrid { width, height });
    }
    let max_side = i32::MAX as u32;
    if width > max_side || height > max_side {
        return Err(WorldBuildError::GridTooLarge { width, height });
    }

    let mut grid = Grid::new(width, height);
    let mut lights = HashMap::new();
    let mut destination_cells = Vec::new();
    let mut next_id = 0;

    for spec in entities {
        let out_of_bounds = WorldBuildError::OutOfBounds {
            coord: spec.coord,
            kind: spec.kind,
            width,
            height,
        };
        let Some(cell) = grid.cell_at(spec.coord) else {
            return Err(out_of_bounds);
        };
        if cell.has(spec.kind) {
            return Err(WorldBuildError::DuplicateStatic {
                coord: spec.coord,
                kind: spec.kind,
            });
        }

        let id = SimId(next_id);
        next_id += 1;

        let occupant = match spec.kind {
            StaticKind::Road | StaticKind::Sidewalk | StaticKind::PedestrianWalk => {
                let direction = spec.direction.ok_or(WorldBuildError::MissingDirection {
                    coord: spec.coord,
                    kind: spec.kind,
                })?;
                match spec.kind {
                    StaticKind::Road => Occupant::Road { id, direction },
                    StaticKind::Sidewalk => Occupant::Sidewalk { id, direction },
                    _ => Occupant::PedestrianWalk { id, direction },
                }
            }
            StaticKind::Obstacle => Occupant::Obstacle { id },
            StaticKind::Destination => {
                destination_cells.push(spec.coord);
                Occupant::Destination { id }
            }
            StaticKind::TrafficLight => {
                let period = spec.signal_period.unwrap_or(DEFAULT_SIGNAL_PERIOD);
                if period == 0 {
                    return Err(WorldBuildError::ZeroSignalPeriod { coord: spec.coord });
                }
                let light_id = LightId(id);
                lights.insert(
                    light_id,
                    TrafficLight::new(light_id, spec.coord, spec.initial_signal, period),
                );
                Occupant::TrafficLight { id: light_id }
            }
        };

        if grid.place_static(spec.coord, occupant).is_err() {
            return Err(out_of_bounds);
        }
    }

    let destinations = classify_destinations(&grid, &destination_cells);

    Ok(StaticWorld {
        grid,
        lights,
        destinations,
        next_id,
    })
}

/// A destination serves a kind when it or one of its neighbours carries
/// that kind's surface
fn classify_destinations(grid: &Grid, cells: &[Coord]) -> Destinations {
    let mut destinations = Destinations::default();
    for &coord in cells {
        for kind in AgentKind::ALL {
            let served = std::iter::once(coord)
                .chain(grid.neighbors4(coord).map(|(_, next)| next))
                .filter_map(|candidate| grid.cell_at(candidate))
                .any(|cell| has_surface(kind, cell));
            if served {
                destinations.for_kind_mut(kind).push(coord);
            }
        }
    }
    destinations
}
