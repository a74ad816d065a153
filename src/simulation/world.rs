//! Main simulation world that ties everything together
//!
//! The world is the single owner of the grid, the traffic lights, the live
//! agent table, the spawner and the seeded RNG. One call to [`World::step`]
//! advances all of them by exactly one tick.

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

use super::agent::{AgentState, NavAgent, StepOutcome};
use super::builder::{build_world, Destinations, StaticEntitySpec, StaticWorld};
use super::config::SimConfig;
use super::grid::{Grid, Occupant};
use super::pathfinding::{has_surface, is_reachable, reachability_graph};
use super::spawner::{SpawnRequest, Spawner};
use super::stats::SimulationStats;
use super::traffic_light::TrafficLight;
use super::types::{
    AgentId, AgentKind, Coord, Direction, EntityKind, LightId, SimId, StaticKind,
};

/// Read-only view of one entity for external reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySnapshot {
    pub id: SimId,
    pub coord: Coord,
    /// Facing of agents, heading of directional static entities
    pub orientation: Option<Direction>,
    /// Traffic lights only
    pub signal: Option<bool>,
    /// Traffic lights only
    pub remaining_ticks: Option<u32>,
    /// Agents only
    pub state: Option<AgentState>,
}

impl EntitySnapshot {
    fn bare(id: SimId, coord: Coord) -> Self {
        Self {
            id,
            coord,
            orientation: None,
            signal: None,
            remaining_ticks: None,
            state: None,
        }
    }
}

/// An entry cell from which a destination cannot be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreachableRoute {
    pub kind: AgentKind,
    pub entry: Coord,
    pub destination: Coord,
}

/// The main simulation world
pub struct World {
    grid: Grid,

    /// All traffic lights
    lights: HashMap<LightId, TrafficLight>,

    destinations: Destinations,

    /// Live agents, ordered by id so the shuffle input is reproducible
    agents: BTreeMap<AgentId, NavAgent>,

    spawner: Spawner,

    config: SimConfig,

    rng: StdRng,

    /// Completed ticks
    clock: u64,

    /// Next ID to assign
    next_id: usize,

    stats: SimulationStats,
}

impl World {
    /// Create a world from already-built static content
    ///
    /// Fails when a configured entry cell lies outside the grid. Entry and
    /// destination pairs without a route are only logged.
    pub fn new(static_world: StaticWorld, config: SimConfig) -> Result<Self> {
        let StaticWorld {
            grid,
            lights,
            destinations,
            next_id,
        } = static_world;

        for kind in AgentKind::ALL {
            for &entry in config.spawn.entries(kind) {
                let Some(cell) = grid.cell_at(entry) else {
                    bail!("{} entry {} lies outside the grid", kind, entry);
                };
                if !has_surface(kind, cell) {
                    warn!("{} entry {} has no {} surface", kind, entry, kind);
                }
            }
        }

        let mut world = Self {
            grid,
            lights,
            destinations,
            agents: BTreeMap::new(),
            spawner: Spawner::new(config.spawn.clone()),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            clock: 0,
            next_id,
            stats: SimulationStats::new(),
        };

        for route in world.unreachable_routes() {
            warn!(
                "{} entry {} cannot reach destination {}",
                route.kind, route.entry, route.destination
            );
        }

        world.populate_initial()?;
        Ok(world)
    }

    /// Build the static world and the simulation in one go
    pub fn build(
        width: u32,
        height: u32,
        entities: &[StaticEntitySpec],
        config: SimConfig,
    ) -> Result<Self> {
        let static_world =
            build_world(width, height, entities).context("Failed to build the city grid")?;
        Self::new(static_world, config)
    }

    fn next_agent_id(&mut self) -> AgentId {
        let id = AgentId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    /// Spawn the configured starting population through the spawner rules
    fn populate_initial(&mut self) -> Result<()> {
        for kind in AgentKind::ALL {
            for _ in 0..self.config.initial(kind) {
                let live = self.live_count(kind);
                let request = self.spawner.plan_spawn(
                    kind,
                    live,
                    &self.grid,
                    &self.destinations,
                    &mut self.rng,
                );
                if let Some(request) = request {
                    self.spawn_request(request)?;
                }
            }
        }
        Ok(())
    }

    fn spawn_request(&mut self, request: SpawnRequest) -> Result<AgentId> {
        self.spawn_agent(request.kind, request.entry, request.destination)
    }

    /// Place a new agent on the grid
    ///
    /// The route to `destination` is planned immediately. No population cap
    /// applies here; caps are a spawner policy.
    pub fn spawn_agent(
        &mut self,
        kind: AgentKind,
        coord: Coord,
        destination: Option<Coord>,
    ) -> Result<AgentId> {
        if !self.grid.contains(coord) {
            bail!("Cannot spawn {} outside the grid at {}", kind, coord);
        }

        let id = self.next_agent_id();
        let agent = NavAgent::new(
            id,
            kind,
            coord,
            destination,
            &self.grid,
            self.config.replan_threshold,
        );
        self.grid.insert_agent(id, kind, coord)?;
        if self.agents.insert(id, agent).is_some() {
            bail!("Agent {:?} registered twice", id);
        }
        self.stats.record_spawn(kind);

        match destination {
            Some(goal) => debug!("Spawned {} {:?} at {} heading to {}", kind, id, coord, goal),
            None => debug!("Spawned {} {:?} at {} without a destination", kind, id, coord),
        }
        Ok(id)
    }

    /// Drop an arrived agent from the live table
    ///
    /// Its grid cell was already vacated during the agent pass.
    fn deregister(&mut self, id: AgentId) -> Result<()> {
        let agent = self
            .agents
            .remove(&id)
            .with_context(|| format!("Agent {:?} deregistered twice", id))?;
        self.stats.record_arrival(agent.kind);
        debug!(
            "{} {:?} arrived at {} after {} steps",
            agent.kind,
            id,
            agent.coord(),
            agent.steps_taken()
        );
        Ok(())
    }

    /// Update all traffic lights for the tick in progress
    fn update_lights(&mut self, tick: u64) {
        for light in self.lights.values_mut() {
            light.tick(tick);
        }
    }

    /// Step every live agent once in a fresh random order
    ///
    /// An agent that arrives leaves its cell at once, so agents stepped
    /// later in the same pass no longer see it. Returns the agents that
    /// arrived during the pass.
    fn update_agents(&mut self, tick: u64) -> Result<Vec<AgentId>> {
        let mut order: Vec<AgentId> = self.agents.keys().copied().collect();
        order.shuffle(&mut self.rng);

        let mut arrived = Vec::new();
        for id in order {
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };
            if agent.is_arrived() {
                continue;
            }
            let outcome = agent
                .step(&mut self.grid, &self.lights)
                .with_context(|| format!("Agent {:?} failed on tick {}", id, tick))?;
            if outcome == StepOutcome::Arrived {
                self.grid.remove_agent(id, agent.coord())?;
                arrived.push(id);
            }
        }
        Ok(arrived)
    }

    /// Let the spawner introduce new agents
    fn update_spawner(&mut self) -> Result<()> {
        let agents = &self.agents;
        let live = |kind: AgentKind| agents.values().filter(|agent| agent.kind == kind).count();
        let requests =
            self.spawner
                .evaluate(live, &self.grid, &self.destinations, &mut self.rng);

        for request in requests {
            self.spawn_request(request)?;
        }
        Ok(())
    }

    /// Main simulation tick
    pub fn step(&mut self) -> Result<()> {
        let tick = self.clock + 1;

        self.update_lights(tick);

        let arrived = self.update_agents(tick)?;
        for id in arrived {
            self.deregister(id)?;
        }

        self.update_spawner()?;

        self.clock = tick;
        self.stats.ticks = tick;
        Ok(())
    }

    /// Completed ticks
    pub fn tick_count(&self) -> u64 {
        self.clock
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn light(&self, id: LightId) -> Option<&TrafficLight> {
        self.lights.get(&id)
    }

    /// Traffic light standing on `coord`
    pub fn light_at(&self, coord: Coord) -> Option<&TrafficLight> {
        self.grid
            .cell_at(coord)
            .and_then(|cell| cell.traffic_light())
            .and_then(|id| self.lights.get(&id))
    }

    pub fn agent(&self, id: AgentId) -> Option<&NavAgent> {
        self.agents.get(&id)
    }

    /// Live agents in id order
    pub fn agents(&self) -> impl Iterator<Item = &NavAgent> {
        self.agents.values()
    }

    pub fn live_count(&self, kind: AgentKind) -> usize {
        self.agents.values().filter(|agent| agent.kind == kind).count()
    }

    pub fn destinations(&self, kind: AgentKind) -> &[Coord] {
        self.destinations.for_kind(kind)
    }

    /// Every live entity of `kind`, in row-major cell order
    pub fn snapshot(&self, kind: impl Into<EntityKind>) -> Vec<EntitySnapshot> {
        let kind = kind.into();
        let mut entries = Vec::new();

        for cell in self.grid.cells() {
            for occupant in cell.occupants() {
                if occupant.kind() != kind {
                    continue;
                }
                let mut entry = EntitySnapshot::bare(occupant.sim_id(), cell.coord());
                match occupant {
                    Occupant::TrafficLight { id } => {
                        if let Some(light) = self.lights.get(id) {
                            entry.signal = Some(light.signal());
                            entry.remaining_ticks = Some(light.remaining_ticks());
                        }
                    }
                    Occupant::Agent { id, .. } => {
                        if let Some(agent) = self.agents.get(id) {
                            entry.orientation = Some(agent.orientation());
                            entry.state = Some(agent.state());
                        }
                    }
                    _ => entry.orientation = occupant.direction(),
                }
                entries.push(entry);
            }
        }

        entries
    }

    /// Entry and destination pairs with no legal route
    pub fn unreachable_routes(&self) -> Vec<UnreachableRoute> {
        let mut unreachable = Vec::new();
        for kind in AgentKind::ALL {
            let entries = self.config.spawn.entries(kind);
            if entries.is_empty() {
                continue;
            }
            for &destination in self.destinations.for_kind(kind) {
                let graph = reachability_graph(&self.grid, kind, destination);
                for &entry in entries {
                    if !is_reachable(&graph, entry, destination) {
                        unreachable.push(UnreachableRoute {
                            kind,
                            entry,
                            destination,
                        });
                    }
                }
            }
        }
        unreachable
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Traffic Simulation Summary ===");
        println!("Tick: {}", self.clock);
        println!(
            "Grid: {}x{}, Traffic lights: {}",
            self.grid.width(),
            self.grid.height(),
            self.lights.len()
        );
        for kind in AgentKind::ALL {
            let stats = self.stats.for_kind(kind);
            println!(
                "{}s: active={}, spawned={}, arrived={}",
                kind, stats.active, stats.spawned, stats.arrived
            );
        }

        if !self.agents.is_empty() {
            println!("--- Active Agents ---");
            for agent in self.agents.values() {
                println!(
                    "  {} {:?}: at {} facing {}, {}, path_remaining={}",
                    agent.kind,
                    agent.id.0 .0,
                    agent.coord(),
                    agent.orientation(),
                    agent.state(),
                    agent.remaining_path().len()
                );
            }
        }
    }

    /// Render the grid as text, top row first
    ///
    /// Legend: `c` car, `p` pedestrian, `S`/`s` red/green light, `D`
    /// destination, `#` obstacle, arrows for roads, `=` crossing, `B` sidewalk.
    pub fn render_map(&self) -> String {
        let width = self.grid.width() as i32;
        let height = self.grid.height() as i32;
        let mut map = String::with_capacity(((width + 1) * height) as usize);

        for y in (0..height).rev() {
            for x in 0..width {
                let glyph = self
                    .grid
                    .cell_at(Coord::new(x, y))
                    .map_or(' ', |cell| {
                        if cell.has_agent_of_kind(AgentKind::Car) {
                            'c'
                        } else if cell.has_agent_of_kind(AgentKind::Pedestrian) {
                            'p'
                        } else if let Some(light) =
                            cell.traffic_light().and_then(|id| self.lights.get(&id))
                        {
                            if light.signal() {
                                's'
                            } else {
                                'S'
                            }
                        } else if cell.has(StaticKind::Destination) {
                            'D'
                        } else if cell.has(StaticKind::Obstacle) {
                            '#'
                        } else if cell.has(StaticKind::PedestrianWalk) {
                            '='
                        } else if let Some(direction) = cell.road_direction() {
                            direction.arrow()
                        } else if cell.has(StaticKind::Sidewalk) {
                            'B'
                        } else {
                            '.'
                        }
                    });
                map.push(glyph);
            }
            map.push('\n');
        }

        map
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        println!("\n=== World Map ===");
        println!("Legend: c=Car, p=Pedestrian, S/s=Red/Green light, D=Destination, #=Obstacle, =/B=Crossing/Sidewalk");
        println!();
        print!("{}", self.render_map());
        println!();
    }
}
