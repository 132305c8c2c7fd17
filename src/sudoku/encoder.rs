//! SAT encoding of sudoku: one boolean per (row, column, value)

use super::SudokuGrid;
use crate::error::DecodeError;
use crate::sat::{Clause, Model, SolveOracle};
use anyhow::{Context, Result};
use itertools::Itertools;
use tracing::{debug, info};

/// Variable scheme and clause families for an n x n sudoku
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SudokuEncoder {
    size: usize,
    box_size: usize,
}

impl SudokuEncoder {
    pub fn new(grid: &SudokuGrid) -> Self {
        Self {
            size: grid.size,
            box_size: grid.box_size,
        }
    }

    /// Variable for "cell (row, column) holds value", 0-based row/column, value in 1..=n
    pub fn var(&self, row: usize, column: usize, value: usize) -> i32 {
        ((row * self.size + column) * self.size + value) as i32
    }

    /// Inverse of [`Self::var`]
    pub fn inverse(&self, var: i32) -> Option<(usize, usize, usize)> {
        if var < 1 || var as usize > self.variable_count() {
            return None;
        }
        let index = var as usize - 1;
        let value = index % self.size + 1;
        let cell = index / self.size;
        Some((cell / self.size, cell % self.size, value))
    }

    pub fn variable_count(&self) -> usize {
        self.size * self.size * self.size
    }

    /// All clauses: givens, unit coverage, and cell exclusivity
    pub fn encode(&self, grid: &SudokuGrid) -> Vec<Clause> {
        let n = self.size;
        let b = self.box_size;
        let values = 1..=n;
        let mut clauses = Vec::new();

        // givens
        for r in 0..n {
            for c in 0..n {
                let value = grid.get(r, c);
                if value != 0 {
                    clauses.push(Clause::unit(self.var(r, c, value)));
                }
            }
        }

        // every value at least once per row, column and box
        for v in values.clone() {
            for r in 0..n {
                clauses.push(Clause::new((0..n).map(|c| self.var(r, c, v)).collect()));
            }
            for c in 0..n {
                clauses.push(Clause::new((0..n).map(|r| self.var(r, c, v)).collect()));
            }
            for i in 0..n {
                let (br, bc) = ((i / b) * b, (i % b) * b);
                clauses.push(Clause::new(
                    (0..n).map(|k| self.var(br + k / b, bc + k % b, v)).collect(),
                ));
            }
        }

        // every cell holds at least one and at most one value
        for r in 0..n {
            for c in 0..n {
                clauses.push(Clause::new(values.clone().map(|v| self.var(r, c, v)).collect()));
                for (v1, v2) in values.clone().tuple_combinations() {
                    clauses.push(Clause::binary(-self.var(r, c, v1), -self.var(r, c, v2)));
                }
            }
        }

        debug!(size = n, clauses = clauses.len(), "encoded sudoku");
        clauses
    }

    /// Read the grid back out of a model; every cell must hold exactly one value
    pub fn decode(&self, model: &Model) -> Result<SudokuGrid, DecodeError> {
        let n = self.size;
        let mut rows = vec![vec![0; n]; n];

        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                let held: Vec<usize> = (1..=n).filter(|&v| model.value(self.var(r, c, v))).collect();
                match held.as_slice() {
                    [value] => *cell = *value,
                    _ => {
                        return Err(DecodeError::SudokuCell {
                            row: r,
                            column: c,
                            count: held.len(),
                        })
                    }
                }
            }
        }

        Ok(SudokuGrid::from_parts(self.size, self.box_size, rows))
    }
}

/// Solve a sudoku; `Ok(None)` means the givens admit no solution
pub fn solve_sudoku(grid: &SudokuGrid, oracle: &mut dyn SolveOracle) -> Result<Option<SudokuGrid>> {
    let encoder = SudokuEncoder::new(grid);
    let clauses = encoder.encode(grid);
    solve_clauses(grid, &encoder, &clauses, oracle)
}

/// Solve with a caller-supplied clause list for `grid`
pub fn solve_clauses(
    grid: &SudokuGrid,
    encoder: &SudokuEncoder,
    clauses: &[Clause],
    oracle: &mut dyn SolveOracle,
) -> Result<Option<SudokuGrid>> {
    let Some(model) = oracle.solve_clauses(clauses).context("Sudoku SAT solving failed")? else {
        info!(size = grid.size, givens = grid.given_count(), "sudoku unsatisfiable");
        return Ok(None);
    };

    let solution = encoder.decode(&model).context("Sudoku model does not decode")?;
    if !solution.solves(grid) {
        anyhow::bail!("Decoded sudoku violates the puzzle rules");
    }

    info!(
        size = grid.size,
        givens = grid.given_count(),
        solve_ms = model.solve_time.as_millis() as u64,
        "sudoku solved"
    );
    Ok(Some(solution))
}
