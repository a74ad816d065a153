//! Simulation configuration

use super::types::{
    AgentKind, Coord, DEFAULT_MAX_AGENTS, DEFAULT_SEED, DEFAULT_SPAWN_INTERVAL,
    REPLAN_WAIT_THRESHOLD,
};

/// Spawner settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    /// Ticks between spawn evaluations
    pub interval: u32,
    pub max_cars: usize,
    pub max_pedestrians: usize,
    /// Cells where new cars appear
    pub car_entries: Vec<Coord>,
    /// Cells where new pedestrians appear
    pub pedestrian_entries: Vec<Coord>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SPAWN_INTERVAL,
            max_cars: DEFAULT_MAX_AGENTS,
            max_pedestrians: DEFAULT_MAX_AGENTS,
            car_entries: Vec::new(),
            pedestrian_entries: Vec::new(),
        }
    }
}

impl SpawnConfig {
    pub fn cap(&self, kind: AgentKind) -> usize {
        match kind {
            AgentKind::Car => self.max_cars,
            AgentKind::Pedestrian => self.max_pedestrians,
        }
    }

    pub fn entries(&self, kind: AgentKind) -> &[Coord] {
        match kind {
            AgentKind::Car => &self.car_entries,
            AgentKind::Pedestrian => &self.pedestrian_entries,
        }
    }
}

/// Top-level simulation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Seed for the scheduler order, spawn entries and destinations
    pub seed: u64,
    /// Consecutive waits after which an agent replans
    pub replan_threshold: u32,
    /// Cars spawned while the world is created
    pub initial_cars: usize,
    /// Pedestrians spawned while the world is created
    pub initial_pedestrians: usize,
    pub spawn: SpawnConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            replan_threshold: REPLAN_WAIT_THRESHOLD,
            initial_cars: 0,
            initial_pedestrians: 0,
            spawn: SpawnConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn initial(&self, kind: AgentKind) -> usize {
        match kind {
            AgentKind::Car => self.initial_cars,
            AgentKind::Pedestrian => self.initial_pedestrians,
        }
    }
}
