//! City Traffic Simulation Library
//!
//! A deterministic grid simulation of cars and pedestrians that can be
//! driven headless or embedded behind a query/control surface.

pub mod simulation;
