//! Population management: periodic spawning at entry cells
//!
//! The spawner only decides *what* to create. The world turns each
//! [`SpawnRequest`] into an agent, so the live population has a single owner.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::builder::Destinations;
use super::config::SpawnConfig;
use super::grid::Grid;
use super::types::{AgentKind, Coord};

/// A new agent the world should create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRequest {
    pub kind: AgentKind,
    pub entry: Coord,
    pub destination: Option<Coord>,
}

/// Interval timer plus per-kind caps and entry cells
#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnConfig,
    timer: u32,
}

impl Spawner {
    pub fn new(config: SpawnConfig) -> Self {
        Self { config, timer: 0 }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Ticks counted since the last spawn evaluation
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Count one tick; `true` when a spawn evaluation is due
    fn advance(&mut self) -> bool {
        self.timer += 1;
        if self.timer >= self.config.interval.max(1) {
            self.timer = 0;
            true
        } else {
            false
        }
    }

    /// Plan at most one new agent of `kind`
    ///
    /// Nothing is planned when the kind is at its cap, has no entries, or the
    /// randomly picked entry already holds an agent of the same kind.
    pub fn plan_spawn<R: Rng + ?Sized>(
        &self,
        kind: AgentKind,
        live: usize,
        grid: &Grid,
        destinations: &Destinations,
        rng: &mut R,
    ) -> Option<SpawnRequest> {
        if live >= self.config.cap(kind) {
            return None;
        }

        let entry = *self.config.entries(kind).choose(rng)?;
        if grid.cell_at(entry)?.has_agent_of_kind(kind) {
            return None;
        }

        let destination = destinations.for_kind(kind).choose(rng).copied();
        Some(SpawnRequest {
            kind,
            entry,
            destination,
        })
    }

    /// Per-tick evaluation
    ///
    /// `live` reports the current population of a kind.
    pub fn evaluate<R, F>(
        &mut self,
        live: F,
        grid: &Grid,
        destinations: &Destinations,
        rng: &mut R,
    ) -> Vec<SpawnRequest>
    where
        R: Rng + ?Sized,
        F: Fn(AgentKind) -> usize,
    {
        if !self.advance() {
            return Vec::new();
        }

        AgentKind::ALL
            .into_iter()
            .filter_map(|kind| self.plan_spawn(kind, live(kind), grid, destinations, rng))
            .collect()
    }
}
