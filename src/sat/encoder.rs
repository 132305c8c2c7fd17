//! SAT encoder facade: one encode -> solve -> decode cycle per horizon

use super::{
    create_oracle, decode_trajectory, moves_from_trajectory, ClauseFamily, ConstraintGenerator,
    MoveSequence, Trajectory,
};
use crate::config::Settings;
use crate::puzzle::Grid;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info};

/// A decoded plan for one horizon, not yet replayed
#[derive(Debug, Clone)]
pub struct Plan {
    pub horizon: usize,
    pub moves: MoveSequence,
    pub trajectory: Trajectory,
    pub solve_time: Duration,
    pub variables: usize,
    pub clauses: usize,
}

/// Result of a single horizon attempt
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Solved(Plan),
    /// No plan of exactly this many steps exists
    Unsatisfiable,
}

/// Main SAT encoder for push-puzzle planning problems
pub struct SatEncoder {
    settings: Settings,
    grid: Grid,
}

impl SatEncoder {
    /// Create a new SAT encoder with the given settings and puzzle
    pub fn new(settings: Settings, grid: Grid) -> Self {
        Self { settings, grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Encode and solve the puzzle at one horizon.
    ///
    /// Every call builds its own allocator, clause set and oracle, so attempts
    /// at different horizons share nothing and can run on separate threads.
    pub fn attempt(&self, horizon: usize) -> Result<AttemptOutcome> {
        let generator = ConstraintGenerator::new(&self.grid, horizon, self.settings.planning.goal_policy)
            .context("Puzzle cannot be encoded")?;
        let cnf = generator
            .generate_all_constraints()
            .context("Failed to generate SAT constraints")?;

        debug!(
            horizon,
            variables = cnf.num_variables,
            clauses = cnf.len(),
            "encoded horizon"
        );

        let mut oracle = create_oracle(self.settings.solver.backend);
        let model = oracle
            .solve_clauses(&cnf.clauses)
            .with_context(|| format!("SAT solving failed at horizon {}", horizon))?;

        let Some(model) = model else {
            info!(horizon, backend = ?oracle.backend(), "unsatisfiable");
            return Ok(AttemptOutcome::Unsatisfiable);
        };

        info!(
            horizon,
            backend = ?oracle.backend(),
            solve_ms = model.solve_time.as_millis() as u64,
            "satisfiable"
        );

        let trajectory = decode_trajectory(&model, &self.grid, generator.allocator(), horizon)
            .with_context(|| format!("Model at horizon {} does not decode", horizon))?;
        let moves = moves_from_trajectory(&trajectory)
            .with_context(|| format!("Model at horizon {} does not decode", horizon))?;

        Ok(AttemptOutcome::Solved(Plan {
            horizon,
            moves,
            trajectory,
            solve_time: model.solve_time,
            variables: cnf.num_variables,
            clauses: cnf.len(),
        }))
    }

    /// Get encoding statistics for one horizon (generates the clauses)
    pub fn statistics(&self, horizon: usize) -> Result<EncodingStatistics> {
        let generator = ConstraintGenerator::new(&self.grid, horizon, self.settings.planning.goal_policy)?;
        let cnf = generator.generate_all_constraints()?;

        Ok(EncodingStatistics {
            grid_width: self.grid.width,
            grid_height: self.grid.height,
            objects: self.grid.object_count(),
            horizon,
            total_variables: cnf.num_variables,
            total_clauses: cnf.len(),
            total_literals: cnf.literal_count(),
            family_counts: cnf.family_counts,
        })
    }

    /// Closed-form size estimate for one horizon, without generating clauses
    pub fn estimate_complexity(&self, horizon: usize) -> Result<ComplexityEstimate> {
        let generator = ConstraintGenerator::new(&self.grid, horizon, self.settings.planning.goal_policy)?;

        let family_estimates: Vec<(ClauseFamily, usize)> = ClauseFamily::ALL
            .iter()
            .map(|&family| (family, generator.estimate_family_size(family)))
            .collect();
        let estimated_clauses = family_estimates.iter().map(|(_, n)| n).sum::<usize>();
        let estimated_variables = generator.allocator().variable_count();

        let complexity_level = if estimated_clauses < 10_000 {
            ComplexityLevel::Low
        } else if estimated_clauses < 1_000_000 {
            ComplexityLevel::Medium
        } else if estimated_clauses < 20_000_000 {
            ComplexityLevel::High
        } else {
            ComplexityLevel::VeryHigh
        };

        Ok(ComplexityEstimate {
            complexity_level,
            estimated_variables,
            estimated_clauses,
            family_estimates,
            grid_size: self.grid.cell_count(),
            time_steps: horizon + 1,
        })
    }
}

/// Statistics about the SAT encoding at one horizon
#[derive(Debug, Clone)]
pub struct EncodingStatistics {
    pub grid_width: usize,
    pub grid_height: usize,
    pub objects: usize,
    pub horizon: usize,
    pub total_variables: usize,
    pub total_clauses: usize,
    pub total_literals: usize,
    pub family_counts: Vec<(ClauseFamily, usize)>,
}

/// Complexity estimate for the problem
#[derive(Debug, Clone)]
pub struct ComplexityEstimate {
    pub complexity_level: ComplexityLevel,
    pub estimated_variables: usize,
    pub estimated_clauses: usize,
    pub family_estimates: Vec<(ClauseFamily, usize)>,
    pub grid_size: usize,
    pub time_steps: usize,
}

impl ComplexityEstimate {
    /// Family with the most clauses
    pub fn dominant_family(&self) -> Option<ClauseFamily> {
        self.family_estimates
            .iter()
            .max_by_key(|(_, n)| *n)
            .map(|(family, _)| *family)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Grid: {}x{}", self.grid_width, self.grid_height)?;
        writeln!(f, "  Objects: {}", self.objects)?;
        writeln!(f, "  Horizon: {}", self.horizon)?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Total clauses: {}", self.total_clauses)?;
        writeln!(f, "  Total literals: {}", self.total_literals)?;
        for (family, count) in &self.family_counts {
            writeln!(f, "    {:<18} {}", family.name(), count)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ComplexityEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Problem Complexity Estimate:")?;
        writeln!(f, "  Complexity level: {:?}", self.complexity_level)?;
        writeln!(f, "  Estimated variables: {}", self.estimated_variables)?;
        writeln!(f, "  Estimated clauses: {}", self.estimated_clauses)?;
        writeln!(f, "  Grid size: {} cells", self.grid_size)?;
        writeln!(f, "  Time steps: {}", self.time_steps)?;
        for (family, count) in &self.family_estimates {
            writeln!(f, "    {:<18} {}", family.name(), count)?;
        }
        if let Some(family) = self.dominant_family() {
            writeln!(f, "  Dominant family: {}", family)?;
        }

        let recommendation = match self.complexity_level {
            ComplexityLevel::Low => "Should solve quickly",
            ComplexityLevel::Medium => "May take some time to solve",
            ComplexityLevel::High => "Likely to be challenging, consider a shorter horizon",
            ComplexityLevel::VeryHigh => "Very challenging, strongly consider a smaller grid or horizon",
        };
        writeln!(f, "  Recommendation: {}", recommendation)?;

        Ok(())
    }
}
