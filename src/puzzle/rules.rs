//! Movement and push rules, applied directly to puzzle states

use super::{Cell, Grid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One actor action per time step.
///
/// Orientation: `Up` is `(0, -1)`, `Down` is `(0, +1)`, `Left` is `(-1, 0)`,
/// `Right` is `(+1, 0)`, with `y` growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
    Wait,
}

impl Move {
    /// The four moves that change the actor's cell
    pub const DIRECTIONS: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Move::Up => (0, -1),
            Move::Down => (0, 1),
            Move::Left => (-1, 0),
            Move::Right => (1, 0),
            Move::Wait => (0, 0),
        }
    }

    pub fn from_delta(dx: isize, dy: isize) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Move::Up),
            (0, 1) => Some(Move::Down),
            (-1, 0) => Some(Move::Left),
            (1, 0) => Some(Move::Right),
            (0, 0) => Some(Move::Wait),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
            Move::Wait => Move::Wait,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Move::Up => 'U',
            Move::Down => 'D',
            Move::Left => 'L',
            Move::Right => 'R',
            Move::Wait => 'W',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'U' => Some(Move::Up),
            'D' => Some(Move::Down),
            'L' => Some(Move::Left),
            'R' => Some(Move::Right),
            'W' => Some(Move::Wait),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Positions of every entity at one time step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PuzzleState {
    pub actor: Cell,
    pub objects: Vec<Cell>,
}

impl PuzzleState {
    /// Index of the object at a cell, if any
    pub fn object_at(&self, cell: Cell) -> Option<usize> {
        self.objects.iter().position(|&c| c == cell)
    }
}

/// Why a move cannot be applied to a state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IllegalMove {
    OffGrid { from: Cell, mv: Move },
    IntoObstacle { cell: Cell },
    PushOffGrid { object: usize, from: Cell },
    PushIntoObstacle { object: usize, cell: Cell },
    PushIntoObject { object: usize, blocker: usize },
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalMove::OffGrid { from, mv } => write!(f, "move {} from {} leaves the grid", mv, from),
            IllegalMove::IntoObstacle { cell } => write!(f, "actor walks into obstacle at {}", cell),
            IllegalMove::PushOffGrid { object, from } => {
                write!(f, "object {} at {} would be pushed off the grid", object, from)
            }
            IllegalMove::PushIntoObstacle { object, cell } => {
                write!(f, "object {} would be pushed into obstacle at {}", object, cell)
            }
            IllegalMove::PushIntoObject { object, blocker } => {
                write!(f, "object {} would be pushed into object {}", object, blocker)
            }
        }
    }
}

/// Sokoban-style rules: the actor moves one cell and pushes at most one object
pub struct PushRules;

impl PushRules {
    /// Apply one move, returning the successor state
    pub fn apply(grid: &Grid, state: &PuzzleState, mv: Move) -> Result<PuzzleState, IllegalMove> {
        if mv == Move::Wait {
            return Ok(state.clone());
        }

        let target = grid
            .step(state.actor, mv)
            .ok_or(IllegalMove::OffGrid { from: state.actor, mv })?;

        if grid.is_obstacle(target) {
            return Err(IllegalMove::IntoObstacle { cell: target });
        }

        let mut next = state.clone();
        next.actor = target;

        if let Some(object) = state.object_at(target) {
            let pushed_to = grid
                .step(target, mv)
                .ok_or(IllegalMove::PushOffGrid { object, from: target })?;

            if grid.is_obstacle(pushed_to) {
                return Err(IllegalMove::PushIntoObstacle { object, cell: pushed_to });
            }
            if let Some(blocker) = state.object_at(pushed_to) {
                return Err(IllegalMove::PushIntoObject { object, blocker });
            }

            next.objects[object] = pushed_to;
        }

        Ok(next)
    }

    /// Replay a move sequence from the grid's initial state, returning every visited state
    pub fn replay(grid: &Grid, moves: &[Move]) -> Result<Vec<PuzzleState>, (usize, IllegalMove)> {
        let mut states = Vec::with_capacity(moves.len() + 1);
        states.push(grid.initial_state());

        for (step, &mv) in moves.iter().enumerate() {
            let current = &states[states.len() - 1];
            let next = Self::apply(grid, current, mv).map_err(|e| (step, e))?;
            states.push(next);
        }

        Ok(states)
    }

    /// Every object sits on some goal cell
    pub fn is_goal(grid: &Grid, state: &PuzzleState) -> bool {
        state.objects.iter().all(|&cell| grid.is_goal(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::parse_grid_from_string;

    #[test]
    fn test_move_delta_round_trip() {
        for mv in [Move::Up, Move::Down, Move::Left, Move::Right, Move::Wait] {
            let (dx, dy) = mv.delta();
            assert_eq!(Move::from_delta(dx, dy), Some(mv));
            assert_eq!(Move::from_symbol(mv.symbol()), Some(mv));
        }
        assert_eq!(Move::from_delta(1, 1), None);
        assert_eq!(Move::Left.opposite(), Move::Right);
    }

    #[test]
    fn test_push_moves_object() {
        let grid = parse_grid_from_string("PBG").unwrap();
        let next = PushRules::apply(&grid, &grid.initial_state(), Move::Right).unwrap();
        assert_eq!(next.actor, Cell::new(2, 1));
        assert_eq!(next.objects, vec![Cell::new(3, 1)]);
        assert!(PushRules::is_goal(&grid, &next));
    }

    #[test]
    fn test_illegal_moves() {
        let grid = parse_grid_from_string("GPB").unwrap();
        let start = grid.initial_state();
        assert_eq!(
            PushRules::apply(&grid, &start, Move::Right),
            Err(IllegalMove::PushOffGrid { object: 0, from: Cell::new(3, 1) })
        );
        assert!(matches!(
            PushRules::apply(&grid, &start, Move::Up),
            Err(IllegalMove::OffGrid { .. })
        ));

        let walled = parse_grid_from_string("PB#\n..G").unwrap();
        assert!(matches!(
            PushRules::apply(&walled, &walled.initial_state(), Move::Right),
            Err(IllegalMove::PushIntoObstacle { object: 0, .. })
        ));

        let crowded = parse_grid_from_string("PBB.\n..GG").unwrap();
        assert_eq!(
            PushRules::apply(&crowded, &crowded.initial_state(), Move::Right),
            Err(IllegalMove::PushIntoObject { object: 0, blocker: 1 })
        );
    }

    #[test]
    fn test_replay_reports_failing_step() {
        let grid = parse_grid_from_string("P.BG").unwrap();
        let states = PushRules::replay(&grid, &[Move::Right, Move::Right]).unwrap();
        assert_eq!(states.len(), 3);
        assert!(PushRules::is_goal(&grid, &states[2]));

        let err = PushRules::replay(&grid, &[Move::Right, Move::Right, Move::Right]).unwrap_err();
        assert_eq!(err.0, 2);
    }
}
