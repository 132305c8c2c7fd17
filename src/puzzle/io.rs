//! File I/O for puzzle grids

use super::{Grid, Tile};
use crate::error::ValidationError;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a puzzle from a text file.
/// Format: one row per line using `# P B G . * +`; blank lines are ignored.
pub fn load_grid_from_file<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read puzzle file: {}", path.as_ref().display()))?;

    parse_grid_from_string(&content)
        .with_context(|| format!("Failed to parse puzzle from file: {}", path.as_ref().display()))
}

/// Parse a puzzle from its text representation
pub fn parse_grid_from_string(content: &str) -> Result<Grid, ValidationError> {
    let lines: Vec<&str> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(ValidationError::EmptyGrid);
    }

    let mut rows = Vec::with_capacity(lines.len());
    for (row_idx, line) in lines.iter().enumerate() {
        let mut row = Vec::with_capacity(line.len());
        for (col_idx, symbol) in line.chars().enumerate() {
            let tile = Tile::from_symbol(symbol).ok_or(ValidationError::UnknownSymbol {
                symbol,
                row: row_idx + 1,
                column: col_idx + 1,
            })?;
            row.push(tile);
        }
        rows.push(row);
    }

    Grid::from_tiles(rows)
}

/// Save a puzzle to a text file
pub fn save_grid_to_file<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, grid_to_string(grid))
        .with_context(|| format!("Failed to write puzzle to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Convert a puzzle to its text representation
pub fn grid_to_string(grid: &Grid) -> String {
    grid.to_string()
}

/// Create example puzzle files for testing
pub fn create_example_puzzles<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    // One push along a corridor
    std::fs::write(dir.join("corridor.txt"), "PBG\n")
        .context("Failed to write corridor.txt")?;

    // Walk, then push; needs two steps
    std::fs::write(dir.join("two_step.txt"), "P.BG\n")
        .context("Failed to write two_step.txt")?;

    // Object wedged against the edge; no solution at any horizon
    std::fs::write(dir.join("stuck.txt"), "GPB\n")
        .context("Failed to write stuck.txt")?;

    // Walled room with two objects
    let room = "#######\n#.....#\n#.B.B.#\n#..P..#\n#.G.G.#\n#######\n";
    std::fs::write(dir.join("room.txt"), room)
        .context("Failed to write room.txt")?;

    Ok(())
}
