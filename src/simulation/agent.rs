//! Navigating agents (cars and pedestrians)
//!
//! Every tick an agent runs one perceive -> decide -> act cycle. Cars and
//! pedestrians share the cycle and differ only in which surface they travel
//! on and which signal state holds them back.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use log::debug;

use super::grid::{Grid, Occupant};
use super::pathfinding::{self, has_surface};
use super::traffic_light::TrafficLight;
use super::types::{AgentId, AgentKind, Coord, Direction, LightId, StaticKind};

/// Navigation sub-state, only meaningful while the agent is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Moving,
    WaitingOnSignal,
    AvoidingCollision,
    Blocked,
    PlanningRoute,
}

impl NavState {
    pub fn label(self) -> &'static str {
        match self {
            NavState::Moving => "moving",
            NavState::WaitingOnSignal => "waiting",
            NavState::AvoidingCollision => "avoiding",
            NavState::Blocked => "blocked",
            NavState::PlanningRoute => "planning",
        }
    }
}

/// Top-level agent state; `Arrived` is terminal and carries no sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Active(NavState),
    Arrived,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Active(nav) => write!(f, "ACTIVE -> {}", nav.label()),
            AgentState::Arrived => f.write_str("ARRIVED"),
        }
    }
}

/// What the agent decided to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move,
    Wait,
    Replan,
    Stop,
}

/// Result of an agent step indicating what the scheduler should do with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Arrived,
}

/// What an agent sees from its current cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Perception {
    /// The current cell carries the agent's travel surface
    pub on_surface: bool,
    /// Heading of the surface under the agent
    pub surface_direction: Option<Direction>,
    /// The cell the agent would step into
    pub next: Option<Coord>,
    pub next_has_surface: bool,
    pub next_is_destination: bool,
    /// Agents standing in the next cell
    pub agents_ahead: Vec<(AgentId, AgentKind)>,
    /// Signal of the traffic light in the next cell
    pub signal_ahead: Option<bool>,
}

/// Whether a signal state holds an agent of `kind` back
///
/// Cars go on `true`, pedestrians go on `false`.
fn held_by_signal(kind: AgentKind, signal: bool) -> bool {
    match kind {
        AgentKind::Car => !signal,
        AgentKind::Pedestrian => signal,
    }
}

/// A car or pedestrian navigating the grid
#[derive(Debug, Clone)]
pub struct NavAgent {
    pub id: AgentId,
    pub kind: AgentKind,
    coord: Coord,
    destination: Option<Coord>,
    state: AgentState,
    orientation: Direction,
    path: Vec<Coord>,
    cursor: usize,
    consecutive_waits: u32,
    steps_taken: u64,
    replan_threshold: u32,
}

impl NavAgent {
    /// Create an agent and plan its first route if it has a destination
    ///
    /// The agent is not registered in the grid; the caller owns that step.
    pub fn new(
        id: AgentId,
        kind: AgentKind,
        coord: Coord,
        destination: Option<Coord>,
        grid: &Grid,
        replan_threshold: u32,
    ) -> Self {
        let path = destination
            .map(|goal| pathfinding::route(grid, kind, coord, goal))
            .unwrap_or_default();
        Self {
            id,
            kind,
            coord,
            destination,
            state: AgentState::Active(NavState::Moving),
            orientation: Direction::Up,
            path,
            cursor: 0,
            consecutive_waits: 0,
            steps_taken: 0,
            replan_threshold,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn destination(&self) -> Option<Coord> {
        self.destination
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn nav_state(&self) -> Option<NavState> {
        match self.state {
            AgentState::Active(nav) => Some(nav),
            AgentState::Arrived => None,
        }
    }

    pub fn orientation(&self) -> Direction {
        self.orientation
    }

    /// Steps still ahead on the current route
    pub fn remaining_path(&self) -> &[Coord] {
        &self.path[self.cursor.min(self.path.len())..]
    }

    pub fn path_cursor(&self) -> usize {
        self.cursor
    }

    pub fn consecutive_waits(&self) -> u32 {
        self.consecutive_waits
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AgentState::Active(_))
    }

    pub fn is_arrived(&self) -> bool {
        self.state == AgentState::Arrived
    }

    /// Held at a light or behind another agent
    pub fn is_waiting(&self) -> bool {
        matches!(
            self.state,
            AgentState::Active(NavState::WaitingOnSignal | NavState::AvoidingCollision)
        )
    }

    fn path_exhausted(&self) -> bool {
        self.cursor >= self.path.len()
    }

    fn set_nav_state(&mut self, nav: NavState) {
        if let AgentState::Active(current) = &mut self.state {
            *current = nav;
        }
    }

    /// Read the surroundings without touching any state
    pub fn perceive(&self, grid: &Grid, lights: &HashMap<LightId, TrafficLight>) -> Perception {
        let mut perception = Perception::default();

        if let Some(cell) = grid.cell_at(self.coord) {
            perception.on_surface = has_surface(self.kind, cell);
            perception.surface_direction = match self.kind {
                AgentKind::Car => cell.road_direction(),
                AgentKind::Pedestrian => cell
                    .first_of_kind(StaticKind::PedestrianWalk)
                    .or_else(|| cell.first_of_kind(StaticKind::Sidewalk))
                    .and_then(Occupant::direction),
            };
        }

        perception.next = if !self.path_exhausted() {
            Some(self.path[self.cursor])
        } else {
            perception
                .surface_direction
                .map(|direction| self.coord.step(direction))
                .filter(|next| grid.contains(*next))
        };

        if let Some(next_cell) = perception.next.and_then(|next| grid.cell_at(next)) {
            perception.next_has_surface = has_surface(self.kind, next_cell);
            perception.next_is_destination = self.destination == Some(next_cell.coord());
            perception.agents_ahead = next_cell
                .agents()
                .filter(|(id, _)| *id != self.id)
                .collect();
            perception.signal_ahead = next_cell
                .traffic_light()
                .and_then(|light| lights.get(&light))
                .map(TrafficLight::signal);
        }

        perception
    }

    /// Pick this tick's action; the first matching rule wins
    pub fn decide(&mut self, perception: &Perception) -> Action {
        if self.destination == Some(self.coord) {
            self.state = AgentState::Arrived;
            return Action::Stop;
        }

        if self.is_arrived() {
            return Action::Stop;
        }

        if self.path_exhausted() || self.consecutive_waits >= self.replan_threshold {
            self.set_nav_state(NavState::PlanningRoute);
            return Action::Replan;
        }

        let next_enterable = perception.next_has_surface || perception.next_is_destination;
        if !perception.on_surface || perception.next.is_none() || !next_enterable {
            self.set_nav_state(NavState::Blocked);
            return Action::Wait;
        }

        if perception
            .signal_ahead
            .is_some_and(|signal| held_by_signal(self.kind, signal))
        {
            self.set_nav_state(NavState::WaitingOnSignal);
            return Action::Wait;
        }

        if !perception.agents_ahead.is_empty() {
            self.set_nav_state(NavState::AvoidingCollision);
            return Action::Wait;
        }

        self.set_nav_state(NavState::Moving);
        Action::Move
    }

    /// Carry out `action`, mutating the grid for moves
    pub fn act(&mut self, action: Action, perception: &Perception, grid: &mut Grid) -> Result<()> {
        match action {
            Action::Move => {
                let next = perception
                    .next
                    .with_context(|| format!("Agent {:?} moved without a next cell", self.id))?;
                if let Some(direction) = self.coord.direction_to(&next) {
                    self.orientation = direction;
                }
                grid.move_agent(self.id, self.coord, next)?;
                self.coord = next;
                if !self.path_exhausted() {
                    self.cursor += 1;
                }
                self.consecutive_waits = 0;
                self.steps_taken += 1;
            }
            Action::Replan => {
                self.replan(grid);
            }
            Action::Wait => {
                self.consecutive_waits += 1;
            }
            Action::Stop => {}
        }
        Ok(())
    }

    /// Recompute the route from the current cell
    ///
    /// Returns `false` and leaves the agent blocked in place when there is
    /// no destination or no route to it.
    pub fn replan(&mut self, grid: &Grid) -> bool {
        let Some(goal) = self.destination else {
            self.set_nav_state(NavState::Blocked);
            return false;
        };

        let path = pathfinding::route(grid, self.kind, self.coord, goal);
        if path.is_empty() {
            debug!(
                "{} {:?} at {} has no route to {}",
                self.kind, self.id, self.coord, goal
            );
            self.set_nav_state(NavState::Blocked);
            return false;
        }

        self.path = path;
        self.cursor = 0;
        self.consecutive_waits = 0;
        true
    }

    /// Run one perceive -> decide -> act cycle
    pub fn step(
        &mut self,
        grid: &mut Grid,
        lights: &HashMap<LightId, TrafficLight>,
    ) -> Result<StepOutcome> {
        let perception = self.perceive(grid, lights);
        let action = self.decide(&perception);
        self.act(action, &perception, grid)?;

        Ok(if self.is_arrived() {
            StepOutcome::Arrived
        } else {
            StepOutcome::Continue
        })
    }
}
