//! Population statistics for the traffic simulation
//!
//! Tracks how many agents of each kind were spawned, how many reached their
//! destination and how many are still on the map.

use log::info;

use super::types::AgentKind;

/// Counters for one agent kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    /// Agents created so far
    pub spawned: u64,
    /// Agents that reached their destination and left the map
    pub arrived: u64,
    /// Agents currently on the map
    pub active: usize,
}

impl KindStats {
    /// Percentage of spawned agents that arrived
    pub fn completion_rate(&self) -> f32 {
        if self.spawned == 0 {
            0.0
        } else {
            (self.arrived as f32 / self.spawned as f32) * 100.0
        }
    }
}

/// Simulation-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Completed ticks
    pub ticks: u64,
    pub cars: KindStats,
    pub pedestrians: KindStats,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_kind(&self, kind: AgentKind) -> &KindStats {
        match kind {
            AgentKind::Car => &self.cars,
            AgentKind::Pedestrian => &self.pedestrians,
        }
    }

    fn for_kind_mut(&mut self, kind: AgentKind) -> &mut KindStats {
        match kind {
            AgentKind::Car => &mut self.cars,
            AgentKind::Pedestrian => &mut self.pedestrians,
        }
    }

    pub fn record_spawn(&mut self, kind: AgentKind) {
        let stats = self.for_kind_mut(kind);
        stats.spawned += 1;
        stats.active += 1;
    }

    pub fn record_arrival(&mut self, kind: AgentKind) {
        let stats = self.for_kind_mut(kind);
        stats.arrived += 1;
        stats.active = stats.active.saturating_sub(1);
    }

    /// Log the end-of-run report
    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks: {}", self.ticks);
        for kind in AgentKind::ALL {
            let stats = self.for_kind(kind);
            info!("Total {}s spawned: {}", kind, stats.spawned);
            info!("Total {}s arrived: {}", kind, stats.arrived);
            info!("Active {}s: {}", kind, stats.active);
            info!("{} success rate: {:.1}%", kind, stats.completion_rate());
        }
    }
}
