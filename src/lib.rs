//! Push-Puzzle SAT Planner
//!
//! This library encodes bounded-horizon push-puzzle planning (an actor that
//! walks a grid and pushes objects onto goal cells) as boolean satisfiability,
//! solves it with an off-the-shelf SAT solver and decodes the model back into
//! a move sequence. A sudoku encoder shares the same solver boundary.

pub mod config;
pub mod error;
pub mod puzzle;
pub mod sat;
pub mod plan;
pub mod sudoku;
pub mod utils;

pub use config::Settings;
pub use error::{AllocationError, DecodeError, EncodeError, ValidationError};
pub use plan::{PlanOutcome, PlanningProblem, Solution};

use anyhow::Result;

/// Main entry point for solving push-puzzle planning problems
pub fn solve_puzzle(settings: Settings) -> Result<PlanOutcome> {
    let problem = PlanningProblem::new(settings)?;
    problem.solve()
}
