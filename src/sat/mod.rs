//! SAT encoding, solving and decoding for push-puzzle planning

pub mod variables;
pub mod constraints;
pub mod solver;
pub mod decoder;
pub mod dimacs;
pub mod encoder;

pub use variables::{Proposition, VariableAllocator, VariableStatistics};
pub use constraints::{encode, Clause, ClauseFamily, Cnf, ConstraintGenerator};
pub use solver::{create_oracle, Model, SatSolver, SolveOracle, SolverStatistics, VarisatSolver};
pub use decoder::{decode, decode_trajectory, moves_from_trajectory, MoveSequence, Trajectory};
pub use dimacs::{parse_dimacs, parse_solver_output, to_dimacs, write_dimacs, SolverOutput};
pub use encoder::{AttemptOutcome, ComplexityEstimate, ComplexityLevel, EncodingStatistics, Plan, SatEncoder};
