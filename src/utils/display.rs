//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::plan::Solution;
use crate::puzzle::{Cell, Grid, PuzzleState, Tile};
use anyhow::{Context, Result};
use std::path::Path;

/// Format plans for display
pub struct PlanFormatter;

impl PlanFormatter {
    /// Format a single solution for console output
    pub fn format_solution(solution: &Solution, grid: &Grid, show_trajectory: bool, include_waits: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== Plan (T={}) ===\n", solution.horizon));
        output.push_str(&format!("Moves: {}\n", solution.moves.to_string_with(include_waits)));
        output.push_str(&format!(
            "Steps: {} ({} moves, {} waits, {} pushes)\n",
            solution.moves.len(),
            solution.effective_moves().len(),
            solution.metadata.waits,
            solution.metadata.pushes
        ));
        output.push_str(&format!("Solve Time: {:.3}s\n", solution.solve_time.as_secs_f64()));
        output.push_str(&format!(
            "Encoding: {} variables, {} clauses\n",
            solution.metadata.variables, solution.metadata.clauses
        ));
        if !solution.metadata.unsatisfiable_horizons.is_empty() {
            output.push_str(&format!(
                "Unsatisfiable horizons: {:?}\n",
                solution.metadata.unsatisfiable_horizons
            ));
        }

        output.push('\n');

        if show_trajectory {
            output.push_str("Trajectory:\n");
            for (t, state) in solution.trajectory.states.iter().enumerate() {
                match t.checked_sub(1).and_then(|i| solution.moves.moves.get(i)) {
                    Some(mv) => output.push_str(&format!("t={} after {}:\n", t, mv)),
                    None => output.push_str(&format!("t={}:\n", t)),
                }
                output.push_str(&Self::format_state(grid, state));
                output.push('\n');
            }
        } else {
            if let Some(state) = solution.initial_state() {
                output.push_str("Initial State:\n");
                output.push_str(&Self::format_state(grid, state));
                output.push('\n');
            }
            if let Some(state) = solution.final_state() {
                output.push_str(&format!("Final State (t={}):\n", solution.horizon));
                output.push_str(&Self::format_state(grid, state));
            }
        }

        output
    }

    /// Render the grid with the entities of `state` placed on it
    pub fn format_state(grid: &Grid, state: &PuzzleState) -> String {
        let mut output = String::new();
        for cell in grid.cells() {
            let goal = grid.is_goal(cell);
            let tile = if grid.is_obstacle(cell) {
                Tile::Obstacle
            } else if state.actor == cell {
                if goal { Tile::ActorOnGoal } else { Tile::ActorStart }
            } else if state.object_at(cell).is_some() {
                if goal { Tile::ObjectOnGoal } else { Tile::ObjectStart }
            } else if goal {
                Tile::Goal
            } else {
                Tile::Empty
            };
            output.push(tile.symbol());
            if cell.x == grid.width {
                output.push('\n');
            }
        }
        output
    }

    /// Render a state with 1-based column and row numbers
    pub fn format_state_with_coords(grid: &Grid, state: &PuzzleState) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for x in 1..=grid.width {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        for (y, line) in Self::format_state(grid, state).lines().enumerate() {
            output.push_str(&format!("{:2} ", y + 1));
            for symbol in line.chars() {
                output.push(' ');
                output.push(symbol);
            }
            output.push('\n');
        }

        output
    }

    /// Save a solution to the output directory in the requested format
    pub fn save_solution<P: AsRef<Path>>(
        solution: &Solution,
        grid: &Grid,
        output_dir: P,
        format: OutputFormat,
        include_waits: bool,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        match format {
            OutputFormat::Text => {
                let content = Self::format_solution(solution, grid, true, include_waits);
                std::fs::write(output_dir.join("plan.txt"), content)?;
            }
            OutputFormat::Json => {
                solution.save_to_file(output_dir.join("plan.json"))?;

                let summary_json = serde_json::to_string_pretty(&solution.summary())?;
                std::fs::write(output_dir.join("plan_summary.json"), summary_json)?;
            }
            OutputFormat::Visual => {
                let content = Self::create_visual_trajectory(solution, grid);
                std::fs::write(output_dir.join("plan_visual.txt"), content)?;
            }
        }

        Ok(())
    }

    /// Create a visual representation of every step
    fn create_visual_trajectory(solution: &Solution, grid: &Grid) -> String {
        let mut output = String::new();

        output.push_str(&format!("Visual Trajectory - {} steps\n", solution.horizon));
        output.push_str(&"=".repeat(50));
        output.push('\n');

        for (t, state) in solution.trajectory.states.iter().enumerate() {
            let on_goal = state.objects.iter().filter(|&&c| grid.is_goal(c)).count();
            output.push_str(&format!("\nt={} (objects on goals: {}/{}):\n", t, on_goal, state.objects.len()));
            output.push_str(&Self::format_state_with_coords(grid, state));
        }

        output.push_str("\nPaths:\n");
        output.push_str(&format!("  actor: {}\n", Self::format_path(&solution.trajectory.actor_path())));
        for object in 0..grid.object_count() {
            if let Some(path) = solution.trajectory.object_path(object) {
                output.push_str(&format!("  object {}: {}\n", object, Self::format_path(&path)));
            }
        }

        output.push_str("\nPlan Statistics:\n");
        output.push_str(&format!("Moves: {}\n", solution.moves));
        output.push_str(&format!("Pushes: {}\n", solution.metadata.pushes));
        output.push_str(&format!("Solve Time: {:.3}s\n", solution.solve_time.as_secs_f64()));

        output
    }

    fn format_path(path: &[Cell]) -> String {
        path.iter().map(|cell| cell.to_string()).collect::<Vec<_>>().join(" -> ")
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    /// Format success message
    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    /// Format error message
    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    /// Format warning message
    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    /// Format info message
    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{parse_grid_from_string, Move, PushRules};
    use crate::sat::{MoveSequence, Plan, Trajectory};
    use std::time::Duration;
    use tempfile::tempdir;

    fn solved_corridor() -> (Grid, Solution) {
        let grid = parse_grid_from_string("P.BG").unwrap();
        let moves = vec![Move::Right, Move::Wait, Move::Right];
        let states = PushRules::replay(&grid, &moves).unwrap();
        let plan = Plan {
            horizon: 3,
            moves: MoveSequence { moves },
            trajectory: Trajectory { states },
            solve_time: Duration::from_millis(3),
            variables: 32,
            clauses: 90,
        };
        let solution = Solution::new(&grid, plan, vec![1, 2]);
        (grid, solution)
    }

    #[test]
    fn test_state_rendering() {
        let grid = parse_grid_from_string("#P.#\n.B.G").unwrap();
        let state = grid.initial_state();
        assert_eq!(PlanFormatter::format_state(&grid, &state), "#P.#\n.B.G\n");

        let moved = PuzzleState {
            actor: grid.goals()[0],
            objects: vec![state.objects[0]],
        };
        assert_eq!(PlanFormatter::format_state(&grid, &moved), "#..#\n.B.+\n");

        let with_coords = PlanFormatter::format_state_with_coords(&grid, &state);
        assert!(with_coords.starts_with("    1 2 3 4\n"));
    }

    #[test]
    fn test_solution_formatting() {
        let (grid, solution) = solved_corridor();

        let brief = PlanFormatter::format_solution(&solution, &grid, false, false);
        assert!(brief.contains("Moves: RR\n"));
        assert!(brief.contains("Final State (t=3):\n..P*\n"));

        let full = PlanFormatter::format_solution(&solution, &grid, true, true);
        assert!(full.contains("Moves: RWR\n"));
        assert!(full.contains("t=2 after W:"));
    }

    #[test]
    fn test_save_solution_formats() {
        let (grid, solution) = solved_corridor();
        let temp_dir = tempdir().unwrap();

        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Visual] {
            PlanFormatter::save_solution(&solution, &grid, temp_dir.path(), format, true).unwrap();
        }

        assert!(temp_dir.path().join("plan.txt").exists());
        assert!(temp_dir.path().join("plan_summary.json").exists());
        let loaded = Solution::load_from_file(temp_dir.path().join("plan.json")).unwrap();
        assert_eq!(loaded.moves, solution.moves);
        let visual = std::fs::read_to_string(temp_dir.path().join("plan_visual.txt")).unwrap();
        assert!(visual.contains("objects on goals: 1/1"));
        assert!(visual.contains("  actor: (1, 1) -> (2, 1) -> (2, 1) -> (3, 1)\n"));
        assert!(visual.contains("  object 0: (3, 1) -> (3, 1) -> (3, 1) -> (4, 1)\n"));
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));

        let success = ColorOutput::success("OK");
        assert!(success.contains("OK"));
    }
}
