//! Traffic light timing for the traffic simulation
//!
//! A light is a countdown tied to the global tick counter so that every
//! light with the same period flips on the same tick.

use super::types::{Coord, LightId};

/// A traffic light standing on an intersection cell
///
/// `signal == true` means cars may flow through the cell; pedestrians cross
/// while it is `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLight {
    pub id: LightId,
    pub coord: Coord,
    signal: bool,
    period: u32,
    remaining: u32,
}

impl TrafficLight {
    pub fn new(id: LightId, coord: Coord, signal: bool, period: u32) -> Self {
        let period = period.max(1);
        Self {
            id,
            coord,
            signal,
            period,
            remaining: period,
        }
    }

    /// Advance the light for the tick numbered `tick` (1-based)
    ///
    /// `remaining` counts down from `period` to 1 and is reset to `period`
    /// on the tick where the signal flips.
    pub fn tick(&mut self, tick: u64) {
        let period = u64::from(self.period);
        let since_change = tick % period;
        if since_change == 0 {
            self.signal = !self.signal;
            self.remaining = self.period;
        } else {
            self.remaining = (period - since_change) as u32;
        }
    }

    /// `true` while cars have right of way
    pub fn signal(&self) -> bool {
        self.signal
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Ticks left before the next flip
    pub fn remaining_ticks(&self) -> u32 {
        self.remaining
    }
}
