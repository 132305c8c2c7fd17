//! Planning problem definition, horizon search and solution handling

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::{PlanOutcome, PlanningProblem};
pub use solution::{Solution, SolutionMetadata, SolutionSummary};
pub use validator::{PlanValidator, ValidationDetails, ValidationResult};
