//! Push-puzzle grid model and rules

pub mod grid;
pub mod rules;
pub mod io;

pub use grid::{Cell, Grid, Tile};
pub use rules::{IllegalMove, Move, PushRules, PuzzleState};
pub use io::{
    create_example_puzzles, grid_to_string, load_grid_from_file, parse_grid_from_string,
    save_grid_to_file,
};
