//! Fixed-size city grid
//!
//! Each cell holds an unordered set of occupants. Static occupants are added
//! once while the world is built; agents move between cells through
//! [`Grid::move_agent`], which keeps membership and the agent's own coordinate
//! bookkeeping in lock step.

use anyhow::{bail, Result};

use super::types::{AgentId, AgentKind, Coord, Direction, EntityKind, LightId, SimId, StaticKind};

/// Anything that can sit in a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Road { id: SimId, direction: Direction },
    Sidewalk { id: SimId, direction: Direction },
    PedestrianWalk { id: SimId, direction: Direction },
    Obstacle { id: SimId },
    Destination { id: SimId },
    TrafficLight { id: LightId },
    Agent { id: AgentId, kind: AgentKind },
}

impl Occupant {
    pub fn kind(&self) -> EntityKind {
        match self {
            Occupant::Road { .. } => EntityKind::Static(StaticKind::Road),
            Occupant::Sidewalk { .. } => EntityKind::Static(StaticKind::Sidewalk),
            Occupant::PedestrianWalk { .. } => EntityKind::Static(StaticKind::PedestrianWalk),
            Occupant::Obstacle { .. } => EntityKind::Static(StaticKind::Obstacle),
            Occupant::Destination { .. } => EntityKind::Static(StaticKind::Destination),
            Occupant::TrafficLight { .. } => EntityKind::Static(StaticKind::TrafficLight),
            Occupant::Agent { kind, .. } => EntityKind::Agent(*kind),
        }
    }

    pub fn sim_id(&self) -> SimId {
        match *self {
            Occupant::Road { id, .. }
            | Occupant::Sidewalk { id, .. }
            | Occupant::PedestrianWalk { id, .. }
            | Occupant::Obstacle { id }
            | Occupant::Destination { id } => id,
            Occupant::TrafficLight { id } => id.0,
            Occupant::Agent { id, .. } => id.0,
        }
    }

    /// Heading of directional static occupants
    pub fn direction(&self) -> Option<Direction> {
        match *self {
            Occupant::Road { direction, .. }
            | Occupant::Sidewalk { direction, .. }
            | Occupant::PedestrianWalk { direction, .. } => Some(direction),
            _ => None,
        }
    }

    pub fn is_static(&self) -> bool {
        !matches!(self, Occupant::Agent { .. })
    }
}

/// One addressable grid position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    coord: Coord,
    occupants: Vec<Occupant>,
}

impl Cell {
    fn new(coord: Coord) -> Self {
        Self {
            coord,
            occupants: Vec::new(),
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    /// First occupant of the given kind, if any
    pub fn first_of_kind(&self, kind: impl Into<EntityKind>) -> Option<&Occupant> {
        let kind = kind.into();
        self.occupants.iter().find(|occupant| occupant.kind() == kind)
    }

    pub fn has(&self, kind: impl Into<EntityKind>) -> bool {
        self.first_of_kind(kind).is_some()
    }

    /// Heading of the road in this cell
    pub fn road_direction(&self) -> Option<Direction> {
        self.first_of_kind(StaticKind::Road)
            .and_then(Occupant::direction)
    }

    pub fn traffic_light(&self) -> Option<LightId> {
        self.occupants.iter().find_map(|occupant| match occupant {
            Occupant::TrafficLight { id } => Some(*id),
            _ => None,
        })
    }

    /// Agents currently standing in this cell
    pub fn agents(&self) -> impl Iterator<Item = (AgentId, AgentKind)> + '_ {
        self.occupants.iter().filter_map(|occupant| match occupant {
            Occupant::Agent { id, kind } => Some((*id, *kind)),
            _ => None,
        })
    }

    pub fn has_agent_of_kind(&self, kind: AgentKind) -> bool {
        self.agents().any(|(_, agent_kind)| agent_kind == kind)
    }

    fn contains_agent(&self, id: AgentId) -> bool {
        self.agents().any(|(agent_id, _)| agent_id == id)
    }
}

/// Fixed `width x height` grid, no wraparound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Empty grid; sides beyond `i32::MAX` are clamped, [`build_world`]
    /// rejects them up front
    ///
    /// [`build_world`]: super::builder::build_world
    pub fn new(width: u32, height: u32) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(Coord::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    pub fn cell_at(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|index| &self.cells[index])
    }

    fn cell_at_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        let index = self.index(coord)?;
        Some(&mut self.cells[index])
    }

    /// In-bounds orthogonal neighbours, in [`Direction::ALL`] order
    pub fn neighbors4(&self, coord: Coord) -> impl Iterator<Item = (Direction, Coord)> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |direction| (direction, coord.step(direction)))
            .filter(|(_, next)| self.contains(*next))
    }

    /// Cells in row-major order starting at `(0, 0)`
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Add a static occupant while the world is being built
    pub(crate) fn place_static(&mut self, coord: Coord, occupant: Occupant) -> Result<()> {
        debug_assert!(occupant.is_static());
        let Some(cell) = self.cell_at_mut(coord) else {
            bail!("Static {:?} placed outside the grid at {}", occupant.kind(), coord);
        };
        cell.occupants.push(occupant);
        Ok(())
    }

    /// Register an agent in a cell
    pub fn insert_agent(&mut self, id: AgentId, kind: AgentKind, coord: Coord) -> Result<()> {
        let Some(cell) = self.cell_at_mut(coord) else {
            bail!("Agent {:?} inserted outside the grid at {}", id, coord);
        };
        if cell.contains_agent(id) {
            bail!("Agent {:?} registered twice in cell {}", id, coord);
        }
        cell.occupants.push(Occupant::Agent { id, kind });
        Ok(())
    }

    /// Remove an agent from a cell
    pub fn remove_agent(&mut self, id: AgentId, coord: Coord) -> Result<()> {
        let Some(cell) = self.cell_at_mut(coord) else {
            bail!("Agent {:?} removed from outside the grid at {}", id, coord);
        };
        let before = cell.occupants.len();
        cell.occupants
            .retain(|occupant| !matches!(occupant, Occupant::Agent { id: agent, .. } if *agent == id));
        if cell.occupants.len() == before {
            bail!("Agent {:?} is not registered in cell {}", id, coord);
        }
        Ok(())
    }

    /// Relocate an agent's membership from `from` to `to`
    ///
    /// No capacity limit is enforced here. Fails if the agent is not in
    /// `from` or `to` is outside the grid; in either case nothing changes.
    pub fn move_agent(&mut self, id: AgentId, from: Coord, to: Coord) -> Result<()> {
        if !self.contains(to) {
            bail!("Agent {:?} cannot move outside the grid to {}", id, to);
        }
        let kind = self
            .cell_at(from)
            .and_then(|cell| {
                cell.agents()
                    .find(|(agent, _)| *agent == id)
                    .map(|(_, kind)| kind)
            });
        let Some(kind) = kind else {
            bail!("Agent {:?} is not registered in cell {}", id, from);
        };
        self.remove_agent(id, from)?;
        self.insert_agent(id, kind, to)
    }
}
