//! Configuration management for the push-puzzle planner

pub mod settings;

pub use settings::{
    Settings, PlanningConfig, SolverConfig, InputConfig, OutputConfig,
    HorizonSearch, GoalPolicy, SolverBackend, OutputFormat, CliOverrides
};
