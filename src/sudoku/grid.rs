//! Sudoku grid: n x n with n = b^2, 0 marks a blank

use crate::error::ValidationError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuGrid {
    pub size: usize,
    pub box_size: usize,
    cells: Vec<Vec<usize>>,
}

impl SudokuGrid {
    /// Build a grid from rows of values, validating shape and range
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Result<Self, ValidationError> {
        let size = rows.len();
        if size == 0 {
            return Err(ValidationError::EmptyGrid);
        }

        let columns = rows[0].len();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(ValidationError::RaggedRow {
                    row: r,
                    width: row.len(),
                    expected: columns,
                });
            }
        }
        if columns != size {
            return Err(ValidationError::NotSquare { rows: size, columns });
        }

        let required = (size as u128).pow(3);
        let limit = i32::MAX as u128;
        if required > limit {
            return Err(ValidationError::VariableSpaceExhausted { required, limit });
        }

        let box_size = (1..=size).find(|b| b * b >= size).unwrap_or(size);
        if box_size * box_size != size {
            return Err(ValidationError::BadBoxSize { size });
        }

        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value > size {
                    return Err(ValidationError::ValueOutOfRange {
                        value,
                        row: r,
                        column: c,
                        max: size,
                    });
                }
            }
        }

        Ok(Self {
            size,
            box_size,
            cells: rows,
        })
    }

    /// Grid from already-validated parts
    pub(super) fn from_parts(size: usize, box_size: usize, cells: Vec<Vec<usize>>) -> Self {
        Self {
            size,
            box_size,
            cells,
        }
    }

    /// Empty 9x9 grid
    pub fn empty() -> Self {
        Self {
            size: 9,
            box_size: 3,
            cells: vec![vec![0; 9]; 9],
        }
    }

    /// Value at (row, column), 0 when blank
    pub fn get(&self, row: usize, column: usize) -> usize {
        self.cells[row][column]
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.cells
    }

    /// Number of given (non-blank) cells
    pub fn given_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    pub fn is_complete(&self) -> bool {
        self.given_count() == self.size * self.size
    }

    /// Whether no row, column or box repeats a value (blanks ignored)
    pub fn is_consistent(&self) -> bool {
        let n = self.size;
        let b = self.box_size;
        let unit_ok = |cells: Vec<usize>| {
            let mut seen = vec![false; n + 1];
            cells.into_iter().filter(|&v| v != 0).all(|v| !std::mem::replace(&mut seen[v], true))
        };

        (0..n).all(|r| unit_ok((0..n).map(|c| self.cells[r][c]).collect()))
            && (0..n).all(|c| unit_ok((0..n).map(|r| self.cells[r][c]).collect()))
            && (0..n).all(|i| {
                let (br, bc) = ((i / b) * b, (i % b) * b);
                unit_ok(
                    (0..n)
                        .map(|k| self.cells[br + k / b][bc + k % b])
                        .collect(),
                )
            })
    }

    /// Whether this grid is complete, consistent and agrees with every given of `puzzle`
    pub fn solves(&self, puzzle: &SudokuGrid) -> bool {
        self.size == puzzle.size
            && self.is_complete()
            && self.is_consistent()
            && puzzle
                .cells
                .iter()
                .flatten()
                .zip(self.cells.iter().flatten())
                .all(|(&given, &value)| given == 0 || given == value)
    }
}

/// Parse a grid from text.
///
/// A line that is a single token is read one character per cell; otherwise
/// every whitespace-separated token is a cell. `.`, `0` and `_` are blanks.
pub fn parse_sudoku(content: &str) -> Result<SudokuGrid, ValidationError> {
    let mut rows = Vec::new();

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let row_index = rows.len();
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let row = if tokens.len() == 1 {
            line.chars()
                .enumerate()
                .map(|(c, ch)| parse_cell(&ch.to_string(), row_index, c))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            tokens
                .iter()
                .enumerate()
                .map(|(c, token)| parse_cell(token, row_index, c))
                .collect::<Result<Vec<_>, _>>()?
        };

        rows.push(row);
    }

    SudokuGrid::from_rows(rows)
}

fn parse_cell(token: &str, row: usize, column: usize) -> Result<usize, ValidationError> {
    match token {
        "." | "_" => Ok(0),
        _ => token.parse().map_err(|_| ValidationError::UnknownSymbol {
            symbol: token.chars().next().unwrap_or(' '),
            row,
            column,
        }),
    }
}

/// Load a sudoku grid from a file
pub fn load_sudoku_from_file<P: AsRef<Path>>(path: P) -> Result<SudokuGrid> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sudoku file: {}", path.display()))?;
    parse_sudoku(&content).with_context(|| format!("Failed to parse sudoku file: {}", path.display()))
}

/// Write a classic 9x9 puzzle with a unique solution
pub fn create_example_sudoku<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    std::fs::write(dir.join("classic.txt"), CLASSIC).context("Failed to write classic.txt")?;
    Ok(())
}

const CLASSIC: &str = "\
53..7....
6..195...
.98....6.
8...6...3
4..8.3..1
7...2...6
.6....28.
...419..5
....8..79
";

impl fmt::Display for SudokuGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.size.to_string().len();
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 && r % self.box_size == 0 {
                writeln!(f)?;
            }
            for (c, &value) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(if c % self.box_size == 0 { "  " } else { " " })?;
                }
                if value == 0 {
                    write!(f, "{:>width$}", ".", width = width)?;
                } else {
                    write!(f, "{:>width$}", value, width = width)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
