//! Configuration settings for the push-puzzle planner

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub planning: PlanningConfig,
    pub solver: SolverConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Horizon used by the `fixed` search
    pub horizon: usize,
    /// Range tried by the `incremental` and `parallel` searches
    pub min_horizon: usize,
    pub max_horizon: usize,
    pub search: HorizonSearch,
    pub goal_policy: GoalPolicy,
}

/// How horizons are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HorizonSearch {
    /// Exactly one horizon
    Fixed,
    /// Increasing horizons, one after another
    Incremental,
    /// Every horizon in the range at once; the shortest satisfiable one wins
    Parallel,
}

/// Which goal cells the objects must end on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GoalPolicy {
    /// Every object on some goal cell
    AnyGoal,
    /// Object `i` on goal `i`, both in row-major order
    Matched,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    Cadical,
    Varisat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub puzzle_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Show `W` steps in printed move strings
    pub include_waits: bool,
    pub show_trajectory: bool,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
    Visual,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            planning: PlanningConfig {
                horizon: 10,
                min_horizon: 1,
                max_horizon: 30,
                search: HorizonSearch::Incremental,
                goal_policy: GoalPolicy::AnyGoal,
            },
            solver: SolverConfig {
                backend: SolverBackend::Cadical,
            },
            input: InputConfig {
                puzzle_file: PathBuf::from("input/puzzles/corridor.txt"),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                include_waits: true,
                show_trajectory: false,
                output_directory: PathBuf::from("output/plans"),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.planning.min_horizon > self.planning.max_horizon {
            anyhow::bail!(
                "min_horizon ({}) must not exceed max_horizon ({})",
                self.planning.min_horizon,
                self.planning.max_horizon
            );
        }

        if !self.input.puzzle_file.exists() {
            anyhow::bail!("Puzzle file does not exist: {}", self.input.puzzle_file.display());
        }

        Ok(())
    }

    /// Horizons tried by the configured search, in order
    pub fn horizons(&self) -> Vec<usize> {
        match self.planning.search {
            HorizonSearch::Fixed => vec![self.planning.horizon],
            HorizonSearch::Incremental | HorizonSearch::Parallel => {
                (self.planning.min_horizon..=self.planning.max_horizon).collect()
            }
        }
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(search) = cli_overrides.search {
            self.planning.search = search;
        }
        // an explicit horizon always means a fixed search
        if let Some(horizon) = cli_overrides.horizon {
            self.planning.horizon = horizon;
            self.planning.search = HorizonSearch::Fixed;
        }
        if let Some(max_horizon) = cli_overrides.max_horizon {
            self.planning.max_horizon = max_horizon;
        }
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if let Some(goal_policy) = cli_overrides.goal_policy {
            self.planning.goal_policy = goal_policy;
        }
        if let Some(ref puzzle_file) = cli_overrides.puzzle_file {
            self.input.puzzle_file = puzzle_file.clone();
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    /// Also switches the search to `fixed`
    pub horizon: Option<usize>,
    pub max_horizon: Option<usize>,
    pub search: Option<HorizonSearch>,
    pub backend: Option<SolverBackend>,
    pub goal_policy: Option<GoalPolicy>,
    pub puzzle_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}
