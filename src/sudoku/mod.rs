//! Static constraint puzzle (sudoku) on the same oracle boundary

pub mod grid;
pub mod encoder;

pub use grid::{create_example_sudoku, load_sudoku_from_file, parse_sudoku, SudokuGrid};
pub use encoder::{solve_clauses, solve_sudoku, SudokuEncoder};
