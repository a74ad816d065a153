//! Core types for the traffic simulation
//!
//! Identifiers, grid coordinates, headings and the fixed set of entity kinds.

use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimId(pub usize);

/// A wrapper type for navigating agent IDs (cars and pedestrians)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub SimId);

/// A wrapper type for traffic light IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LightId(pub SimId);

/// An integer cell coordinate on the city grid
///
/// Coordinates are signed so that stepping off the edge of the grid yields a
/// value the bounds check can reject instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The coordinate one step away in `direction`
    pub fn step(&self, direction: Direction) -> Coord {
        let (dx, dy) = direction.delta();
        Coord::new(self.x + dx, self.y + dy)
    }

    /// Heading of a single orthogonal step from `self` to `other`
    ///
    /// Returns `None` unless the two coordinates are 4-adjacent.
    pub fn direction_to(&self, other: &Coord) -> Option<Direction> {
        match (other.x - self.x, other.y - self.y) {
            (1, 0) => Some(Direction::Right),
            (-1, 0) => Some(Direction::Left),
            (0, 1) => Some(Direction::Up),
            (0, -1) => Some(Direction::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbour expansion order used everywhere a cell's neighbours are listed
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(dx, dy)` of one step; `Up` increases `y`
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Arrow glyph used by the terminal map
    pub fn arrow(self) -> char {
        match self {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Right => '>',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        f.write_str(name)
    }
}

/// Type of navigating agent in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgentKind {
    /// Vehicle bound to one-way roads
    Car,
    /// Walker bound to sidewalks, crossings and light cells
    Pedestrian,
}

impl AgentKind {
    pub const ALL: [AgentKind; 2] = [AgentKind::Car, AgentKind::Pedestrian];
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Car => f.write_str("car"),
            AgentKind::Pedestrian => f.write_str("pedestrian"),
        }
    }
}

/// Static entity kinds placed once at world-build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticKind {
    Road,
    Sidewalk,
    PedestrianWalk,
    Obstacle,
    Destination,
    TrafficLight,
}

impl fmt::Display for StaticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Every kind of entity that can be enumerated through a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Static(StaticKind),
    Agent(AgentKind),
}

impl From<StaticKind> for EntityKind {
    fn from(kind: StaticKind) -> Self {
        EntityKind::Static(kind)
    }
}

impl From<AgentKind> for EntityKind {
    fn from(kind: AgentKind) -> Self {
        EntityKind::Agent(kind)
    }
}

/// Consecutive waiting ticks after which an agent recomputes its route
pub const REPLAN_WAIT_THRESHOLD: u32 = 5;

/// Ticks between traffic light flips when the world input gives no period
pub const DEFAULT_SIGNAL_PERIOD: u32 = 10;

/// Ticks between spawn evaluations
pub const DEFAULT_SPAWN_INTERVAL: u32 = 10;

/// Default population cap per agent kind
pub const DEFAULT_MAX_AGENTS: usize = 10;

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;
