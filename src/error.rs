//! Typed errors for puzzle validation, variable allocation and model decoding

use crate::puzzle::Cell;
use thiserror::Error;

/// A puzzle (or puzzle/horizon combination) that cannot be encoded.
///
/// Raised before any clause is generated so that malformed input never
/// shows up as a silent UNSAT.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("grid is empty or contains no rows")]
    EmptyGrid,

    #[error("row {row} has width {width}, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },

    #[error("unknown symbol '{symbol}' at row {row}, column {column}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        column: usize,
    },

    #[error("grid has no actor start cell")]
    MissingActor,

    #[error("grid has more than one actor start ({first} and {second})")]
    MultipleActors { first: Cell, second: Cell },

    #[error("{objects} objects but only {goals} goal cells")]
    InsufficientGoals { objects: usize, goals: usize },

    #[error("matched goal policy needs one goal per object ({objects} objects, {goals} goals)")]
    GoalCountMismatch { objects: usize, goals: usize },

    #[error("{required} variables needed for this grid and horizon, the solver supports at most {limit}")]
    VariableSpaceExhausted { required: u128, limit: u128 },

    #[error("sudoku grid is {rows}x{columns}, expected a square grid")]
    NotSquare { rows: usize, columns: usize },

    #[error("sudoku size {size} is not a perfect square")]
    BadBoxSize { size: usize },

    #[error("sudoku value {value} at row {row}, column {column} is outside 0..={max}")]
    ValueOutOfRange {
        value: usize,
        row: usize,
        column: usize,
        max: usize,
    },
}

/// A request for a proposition outside the allocator's domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("cell ({x}, {y}) lies outside the {width}x{height} grid")]
    CellOutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("time step {t} exceeds horizon {horizon}")]
    TimeOutOfRange { t: usize, horizon: usize },

    #[error("object {object} does not exist ({count} objects)")]
    ObjectOutOfRange { object: usize, count: usize },
}

/// A satisfying assignment that does not describe a legal trajectory.
///
/// Every variant means the clause families failed to enforce what they
/// claim; none of them is a property of the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{entity} occupies no cell at t={t}")]
    MissingPosition { entity: Entity, t: usize },

    #[error("{entity} occupies {} cells at t={t}", .cells.len())]
    AmbiguousPosition {
        entity: Entity,
        t: usize,
        cells: Vec<Cell>,
    },

    #[error("actor jumps from {from} to {to} arriving at t={t}")]
    NonAdjacentStep { t: usize, from: Cell, to: Cell },

    #[error("model has horizon {found}, expected {expected}")]
    HorizonMismatch { expected: usize, found: usize },

    #[error("sudoku cell ({row}, {column}) holds {count} values")]
    SudokuCell {
        row: usize,
        column: usize,
        count: usize,
    },
}

/// Entity whose position is being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Actor,
    Object(usize),
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Actor => write!(f, "actor"),
            Entity::Object(o) => write!(f, "object {}", o),
        }
    }
}

/// Failure while generating clauses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}
