//! Conway's Game of Life (B3/S23) on a fixed-size bounded grid.
//!
//! [`GridSimulation`] owns the board and its run state; renderers read it
//! through [`GridSimulation::grid`] and hear about changes through a render
//! hook.

pub mod config;
pub mod error;
pub mod grid;
pub mod patterns;
pub mod simulation;

pub use config::SimulationConfig;
pub use error::{LifeError, Result};
pub use grid::{Cell, CellState, Grid};
pub use patterns::{Pattern, PATTERNS};
pub use simulation::{GridSimulation, MAX_TICKS_PER_ADVANCE};
