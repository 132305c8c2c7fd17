//! Solution representation for push-puzzle planning problems

use crate::puzzle::{Grid, Move, PuzzleState};
use crate::sat::{MoveSequence, Plan, Trajectory};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A validated plan for a puzzle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Exactly `horizon` moves, waits included
    pub moves: MoveSequence,
    /// Positions at t = 0..=horizon
    pub trajectory: Trajectory,
    /// Smallest horizon the search found a plan for
    pub horizon: usize,
    /// Time spent in the oracle for the winning horizon
    #[serde(skip)]
    pub solve_time: Duration,
    /// Metadata about the solution
    pub metadata: SolutionMetadata,
}

/// Metadata about a solution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionMetadata {
    pub grid_width: usize,
    pub grid_height: usize,
    pub objects: usize,
    pub variables: usize,
    pub clauses: usize,
    /// Steps where some object moved
    pub pushes: usize,
    pub waits: usize,
    /// Horizons that were tried and proved unsatisfiable
    pub unsatisfiable_horizons: Vec<usize>,
}

impl Solution {
    /// Create a solution from a validated plan
    pub fn new(grid: &Grid, plan: Plan, unsatisfiable_horizons: Vec<usize>) -> Self {
        let pushes = plan
            .trajectory
            .states
            .windows(2)
            .filter(|pair| pair[0].objects != pair[1].objects)
            .count();

        let metadata = SolutionMetadata {
            grid_width: grid.width,
            grid_height: grid.height,
            objects: grid.object_count(),
            variables: plan.variables,
            clauses: plan.clauses,
            pushes,
            waits: plan.moves.wait_count(),
            unsatisfiable_horizons,
        };

        Self {
            moves: plan.moves,
            trajectory: plan.trajectory,
            horizon: plan.horizon,
            solve_time: plan.solve_time,
            metadata,
        }
    }

    /// Moves without waits
    pub fn effective_moves(&self) -> Vec<Move> {
        self.moves.without_waits()
    }

    pub fn initial_state(&self) -> Option<&PuzzleState> {
        self.trajectory.states.first()
    }

    pub fn final_state(&self) -> Option<&PuzzleState> {
        self.trajectory.states.last()
    }

    /// Get the state at a specific time step
    pub fn state_at(&self, t: usize) -> Option<&PuzzleState> {
        self.trajectory.states.get(t)
    }

    /// Get a summary of the solution
    pub fn summary(&self) -> SolutionSummary {
        SolutionSummary {
            horizon: self.horizon,
            moves: self.moves.to_string(),
            effective_moves: self.effective_moves().len(),
            pushes: self.metadata.pushes,
            variables: self.metadata.variables,
            clauses: self.metadata.clauses,
            solve_time_ms: self.solve_time.as_millis() as u64,
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Shorter horizons first, then fewer pushes
    pub fn is_better_than(&self, other: &Solution) -> bool {
        (self.horizon, self.moves.len(), self.metadata.pushes)
            < (other.horizon, other.moves.len(), other.metadata.pushes)
    }
}

/// Summary of a solution for display purposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionSummary {
    pub horizon: usize,
    pub moves: String,
    pub effective_moves: usize,
    pub pushes: usize,
    pub variables: usize,
    pub clauses: usize,
    pub solve_time_ms: u64,
}

impl std::fmt::Display for SolutionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plan at T={}: {} ({} moves, {} pushes), {} vars, {} clauses, {}ms",
            self.horizon,
            self.moves,
            self.effective_moves,
            self.pushes,
            self.variables,
            self.clauses,
            self.solve_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{parse_grid_from_string, Cell, PushRules};
    use tempfile::tempdir;

    fn corridor_solution() -> Solution {
        corridor_plan(vec![Move::Right, Move::Wait, Move::Right])
    }

    fn corridor_plan(moves: Vec<Move>) -> Solution {
        let grid = parse_grid_from_string("P.BG").unwrap();
        let states = PushRules::replay(&grid, &moves).unwrap();
        let plan = Plan {
            horizon: moves.len(),
            moves: MoveSequence { moves },
            trajectory: Trajectory { states },
            solve_time: Duration::from_millis(7),
            variables: 32,
            clauses: 100,
        };
        Solution::new(&grid, plan, vec![1, 2])
    }

    #[test]
    fn test_solution_creation() {
        let solution = corridor_solution();
        assert_eq!(solution.horizon, 3);
        assert_eq!(solution.effective_moves(), vec![Move::Right, Move::Right]);
        assert_eq!(solution.metadata.pushes, 1);
        assert_eq!(solution.metadata.waits, 1);
        assert_eq!(solution.final_state().unwrap().objects, vec![Cell::new(4, 1)]);
        assert_eq!(solution.state_at(1).unwrap().actor, Cell::new(2, 1));

        let summary = solution.summary();
        assert_eq!(summary.moves, "RWR");
        assert!(summary.to_string().contains("T=3"));
    }

    #[test]
    fn test_json_file_round_trip() {
        let solution = corridor_solution();
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");

        solution.save_to_file(&path).unwrap();
        let loaded = Solution::load_from_file(&path).unwrap();

        assert_eq!(loaded.moves, solution.moves);
        assert_eq!(loaded.trajectory, solution.trajectory);
        assert_eq!(loaded.metadata.unsatisfiable_horizons, vec![1, 2]);
        assert_eq!(loaded.solve_time, Duration::ZERO);
    }

    #[test]
    fn test_solution_comparison() {
        let longer = corridor_solution();
        let shorter = corridor_plan(vec![Move::Right, Move::Right]);
        // same effective moves, but the wait costs a time step
        assert_eq!(shorter.effective_moves(), longer.effective_moves());
        assert!(shorter.is_better_than(&longer));
        assert!(!longer.is_better_than(&shorter));
        assert!(!shorter.is_better_than(&shorter.clone()));

        let wandering = corridor_plan(vec![Move::Right, Move::Left, Move::Right, Move::Right]);
        let idle = corridor_plan(vec![Move::Wait, Move::Wait, Move::Right, Move::Right]);
        assert!(!wandering.is_better_than(&idle));
        assert!(!idle.is_better_than(&wandering));
    }
}
