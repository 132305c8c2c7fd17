//! Grid representation for push puzzles

use super::rules::{Move, PuzzleState};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A grid coordinate, 1-indexed. `x` is the column, `y` the row (growing downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What a cell holds in the initial layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Empty,
    Obstacle,
    ActorStart,
    ObjectStart,
    Goal,
    /// Object starting on a goal cell
    ObjectOnGoal,
    /// Actor starting on a goal cell
    ActorOnGoal,
}

impl Tile {
    /// Decode a single puzzle symbol
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Tile::Empty),
            '#' => Some(Tile::Obstacle),
            'P' => Some(Tile::ActorStart),
            'B' => Some(Tile::ObjectStart),
            'G' => Some(Tile::Goal),
            '*' => Some(Tile::ObjectOnGoal),
            '+' => Some(Tile::ActorOnGoal),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Obstacle => '#',
            Tile::ActorStart => 'P',
            Tile::ObjectStart => 'B',
            Tile::Goal => 'G',
            Tile::ObjectOnGoal => '*',
            Tile::ActorOnGoal => '+',
        }
    }

    pub fn is_goal(self) -> bool {
        matches!(self, Tile::Goal | Tile::ObjectOnGoal | Tile::ActorOnGoal)
    }
}

/// Immutable puzzle layout: obstacles, the actor's start, object starts and goals.
///
/// Object identity is the index into [`Grid::objects`], assigned in row-major
/// order and stable for the whole encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    tiles: Vec<Tile>,
    obstacles: BTreeSet<Cell>,
    actor_start: Cell,
    objects: Vec<Cell>,
    goals: Vec<Cell>,
}

impl Grid {
    /// Build a grid from rows of tiles, validating the layout
    pub fn from_tiles(rows: Vec<Vec<Tile>>) -> Result<Self, ValidationError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(ValidationError::EmptyGrid);
        }

        let height = rows.len();
        let width = rows[0].len();

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ValidationError::RaggedRow {
                    row: i + 1,
                    width: row.len(),
                    expected: width,
                });
            }
        }

        let mut obstacles = BTreeSet::new();
        let mut actor_start: Option<Cell> = None;
        let mut objects = Vec::new();
        let mut goals = Vec::new();

        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, &tile) in row.iter().enumerate() {
                let cell = Cell::new(col_idx + 1, row_idx + 1);
                match tile {
                    Tile::Obstacle => {
                        obstacles.insert(cell);
                    }
                    Tile::ActorStart | Tile::ActorOnGoal => {
                        if let Some(first) = actor_start {
                            return Err(ValidationError::MultipleActors { first, second: cell });
                        }
                        actor_start = Some(cell);
                    }
                    Tile::ObjectStart | Tile::ObjectOnGoal => objects.push(cell),
                    Tile::Goal | Tile::Empty => {}
                }
                if tile.is_goal() {
                    goals.push(cell);
                }
            }
        }

        let actor_start = actor_start.ok_or(ValidationError::MissingActor)?;

        Ok(Self {
            width,
            height,
            tiles: rows.into_iter().flatten().collect(),
            obstacles,
            actor_start,
            objects,
            goals,
        })
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        (cell.y - 1) * self.width + (cell.x - 1)
    }

    /// Whether a cell lies within `[1, width] x [1, height]`
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 1 && cell.x <= self.width && cell.y >= 1 && cell.y <= self.height
    }

    /// Tile at a cell; out-of-range cells read as obstacles
    pub fn tile(&self, cell: Cell) -> Tile {
        if self.contains(cell) {
            self.tiles[self.index(cell)]
        } else {
            Tile::Obstacle
        }
    }

    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell) || !self.contains(cell)
    }

    pub fn is_goal(&self, cell: Cell) -> bool {
        self.contains(cell) && self.tile(cell).is_goal()
    }

    pub fn obstacles(&self) -> &BTreeSet<Cell> {
        &self.obstacles
    }

    pub fn actor_start(&self) -> Cell {
        self.actor_start
    }

    pub fn objects(&self) -> &[Cell] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn goals(&self) -> &[Cell] {
        &self.goals
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (1..=self.height).flat_map(move |y| (1..=self.width).map(move |x| Cell::new(x, y)))
    }

    /// The cell reached from `cell` by `mv`, if it is on the grid
    pub fn step(&self, cell: Cell, mv: Move) -> Option<Cell> {
        let (dx, dy) = mv.delta();
        let x = cell.x as isize + dx;
        let y = cell.y as isize + dy;
        if x < 1 || y < 1 {
            return None;
        }
        let next = Cell::new(x as usize, y as usize);
        self.contains(next).then_some(next)
    }

    /// In-bounds orthogonal neighbours of a cell
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        Move::DIRECTIONS
            .iter()
            .filter_map(|&mv| self.step(cell, mv))
            .collect()
    }

    /// State at t=0
    pub fn initial_state(&self) -> PuzzleState {
        PuzzleState {
            actor: self.actor_start,
            objects: self.objects.clone(),
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 1..=self.height {
            for x in 1..=self.width {
                write!(f, "{}", self.tile(Cell::new(x, y)).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles(rows: &[&str]) -> Vec<Vec<Tile>> {
        rows.iter()
            .map(|row| row.chars().map(|c| Tile::from_symbol(c).unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_grid_from_tiles() {
        let grid = Grid::from_tiles(tiles(&["#####", "#PBG#", "#####"])).unwrap();
        assert_eq!(grid.width, 5);
        assert_eq!(grid.height, 3);
        assert_eq!(grid.actor_start(), Cell::new(2, 2));
        assert_eq!(grid.objects(), &[Cell::new(3, 2)]);
        assert_eq!(grid.goals(), &[Cell::new(4, 2)]);
        assert_eq!(grid.obstacles().len(), 12);
    }

    #[test]
    fn test_overlay_tiles() {
        let grid = Grid::from_tiles(tiles(&["+*B", "..G"])).unwrap();
        assert_eq!(grid.actor_start(), Cell::new(1, 1));
        assert_eq!(grid.objects(), &[Cell::new(2, 1), Cell::new(3, 1)]);
        assert_eq!(grid.goals(), &[Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 2)]);
        assert!(grid.is_goal(Cell::new(1, 1)));
        assert!(!grid.is_goal(Cell::new(3, 1)));
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(Grid::from_tiles(vec![]), Err(ValidationError::EmptyGrid));
        assert_eq!(
            Grid::from_tiles(tiles(&["..B", "G.."])),
            Err(ValidationError::MissingActor)
        );
        assert_eq!(
            Grid::from_tiles(tiles(&["P.P"])),
            Err(ValidationError::MultipleActors {
                first: Cell::new(1, 1),
                second: Cell::new(3, 1),
            })
        );
        assert!(matches!(
            Grid::from_tiles(tiles(&["P..", ".."])),
            Err(ValidationError::RaggedRow { row: 2, width: 2, expected: 3 })
        ));
    }

    #[test]
    fn test_neighbors_and_step() {
        let grid = Grid::from_tiles(tiles(&["P..", "...", "..."])).unwrap();
        assert_eq!(grid.neighbors(Cell::new(1, 1)).len(), 2);
        assert_eq!(grid.neighbors(Cell::new(2, 2)).len(), 4);
        assert_eq!(grid.step(Cell::new(1, 1), Move::Up), None);
        assert_eq!(grid.step(Cell::new(1, 1), Move::Down), Some(Cell::new(1, 2)));
        assert_eq!(grid.step(Cell::new(3, 3), Move::Right), None);
        assert_eq!(grid.step(Cell::new(2, 2), Move::Wait), Some(Cell::new(2, 2)));
    }

    #[test]
    fn test_display_round_trips_symbols() {
        let grid = Grid::from_tiles(tiles(&["#P*", "B.G"])).unwrap();
        assert_eq!(grid.to_string(), "#P*\nB.G\n");
    }
}
