//! Push-puzzle planning problem and horizon search

use super::{PlanValidator, Solution};
use crate::config::{HorizonSearch, Settings};
use crate::puzzle::{load_grid_from_file, Grid};
use crate::sat::{AttemptOutcome, ComplexityEstimate, EncodingStatistics, Plan, SatEncoder};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a horizon search
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Solved(Solution),
    /// Every horizon tried was proved unsatisfiable
    Unsatisfiable { horizons: Vec<usize> },
}

impl PlanOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            PlanOutcome::Solved(solution) => Some(solution),
            PlanOutcome::Unsatisfiable { .. } => None,
        }
    }
}

/// Represents a push-puzzle planning problem
pub struct PlanningProblem {
    settings: Settings,
    encoder: SatEncoder,
    validator: PlanValidator,
}

impl PlanningProblem {
    /// Create a new planning problem, loading the puzzle named in the settings
    pub fn new(settings: Settings) -> Result<Self> {
        let grid = load_grid_from_file(&settings.input.puzzle_file)
            .context("Failed to load puzzle file")?;
        Self::with_grid(settings, grid)
    }

    /// Create a problem with an explicit grid (useful for testing)
    pub fn with_grid(settings: Settings, grid: Grid) -> Result<Self> {
        if settings.planning.min_horizon > settings.planning.max_horizon {
            anyhow::bail!(
                "min_horizon ({}) must not exceed max_horizon ({})",
                settings.planning.min_horizon,
                settings.planning.max_horizon
            );
        }

        let validator = PlanValidator::new(settings.planning.goal_policy);
        let encoder = SatEncoder::new(settings.clone(), grid);

        Ok(Self {
            settings,
            encoder,
            validator,
        })
    }

    /// Search the configured horizons for the shortest plan
    pub fn solve(&self) -> Result<PlanOutcome> {
        let start_time = Instant::now();
        let horizons = self.settings.horizons();
        let grid = self.encoder.grid();

        info!(
            width = grid.width,
            height = grid.height,
            objects = grid.object_count(),
            search = ?self.settings.planning.search,
            "solving push puzzle"
        );

        if let Some(&last) = horizons.last() {
            let complexity = self.encoder.estimate_complexity(last)?;
            debug!(
                horizon = last,
                variables = complexity.estimated_variables,
                clauses = complexity.estimated_clauses,
                "largest encoding"
            );
        }

        let found = match self.settings.planning.search {
            HorizonSearch::Fixed | HorizonSearch::Incremental => self.search_sequential(&horizons)?,
            HorizonSearch::Parallel => self.search_parallel(&horizons)?,
        };

        let Some(plan) = found else {
            info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "no plan within horizons");
            return Ok(PlanOutcome::Unsatisfiable { horizons });
        };

        let validation = self
            .validator
            .validate_with_trajectory(grid, &plan.moves.moves, &plan.trajectory)?;
        if !validation.is_valid {
            anyhow::bail!(
                "Decoded plan at horizon {} fails replay: {}",
                plan.horizon,
                validation.error_message.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        let unsatisfiable: Vec<usize> = horizons.iter().copied().filter(|&t| t < plan.horizon).collect();
        info!(
            horizon = plan.horizon,
            moves = %plan.moves,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "plan found"
        );

        Ok(PlanOutcome::Solved(Solution::new(grid, plan, unsatisfiable)))
    }

    /// Try horizons one after another, stopping at the first plan
    fn search_sequential(&self, horizons: &[usize]) -> Result<Option<Plan>> {
        for &horizon in horizons {
            match self.encoder.attempt(horizon)? {
                AttemptOutcome::Solved(plan) => return Ok(Some(plan)),
                AttemptOutcome::Unsatisfiable => continue,
            }
        }
        Ok(None)
    }

    /// Try all horizons concurrently; the smallest satisfiable one wins
    fn search_parallel(&self, horizons: &[usize]) -> Result<Option<Plan>> {
        let first = horizons.par_iter().find_map_first(|&horizon| match self.encoder.attempt(horizon) {
            Ok(AttemptOutcome::Solved(plan)) => Some(Ok(plan)),
            Ok(AttemptOutcome::Unsatisfiable) => None,
            Err(e) => {
                warn!(horizon, error = %e, "attempt failed");
                Some(Err(e))
            }
        });

        first.transpose()
    }

    /// Get the puzzle grid
    pub fn grid(&self) -> &Grid {
        self.encoder.grid()
    }

    /// Get the problem settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get encoding statistics at one horizon
    pub fn encoding_statistics(&self, horizon: usize) -> Result<EncodingStatistics> {
        self.encoder.statistics(horizon)
    }

    /// Closed-form size estimate at one horizon
    pub fn estimate_complexity(&self, horizon: usize) -> Result<ComplexityEstimate> {
        self.encoder.estimate_complexity(horizon)
    }
}
