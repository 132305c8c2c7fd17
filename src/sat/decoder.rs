//! Model decoding: satisfying assignment -> trajectory -> move sequence

use super::{Model, VariableAllocator};
use crate::error::{DecodeError, Entity};
use crate::puzzle::{Cell, Grid, Move, PuzzleState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positions of every entity at every time step `0..=horizon`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    pub states: Vec<PuzzleState>,
}

impl Trajectory {
    pub fn horizon(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn actor_path(&self) -> Vec<Cell> {
        self.states.iter().map(|s| s.actor).collect()
    }

    /// `None` when `object` is not an object id of this trajectory
    pub fn object_path(&self, object: usize) -> Option<Vec<Cell>> {
        self.states.iter().map(|s| s.objects.get(object).copied()).collect()
    }
}

/// Exactly one move per time step. Waits are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSequence {
    pub moves: Vec<Move>,
}

impl MoveSequence {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Moves with the waits removed
    pub fn without_waits(&self) -> Vec<Move> {
        self.moves.iter().copied().filter(|&m| m != Move::Wait).collect()
    }

    pub fn wait_count(&self) -> usize {
        self.moves.len() - self.without_waits().len()
    }

    /// Move string, optionally with the waits dropped
    pub fn to_string_with(&self, include_waits: bool) -> String {
        if include_waits {
            self.moves.iter().map(|m| m.symbol()).collect()
        } else {
            self.without_waits().iter().map(|m| m.symbol()).collect()
        }
    }

    /// Parse a move string such as `"RRW D"`; whitespace and commas are ignored
    pub fn parse(text: &str) -> Option<Self> {
        text.chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(Move::from_symbol)
            .collect::<Option<Vec<_>>>()
            .map(|moves| Self { moves })
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(true))
    }
}

/// Decode the position of every entity at every time step.
///
/// Each entity must occupy exactly one cell per step; anything else means
/// the encoding is broken and is reported, never patched over.
pub fn decode_trajectory(
    model: &Model,
    grid: &Grid,
    allocator: &VariableAllocator,
    horizon: usize,
) -> Result<Trajectory, DecodeError> {
    let (_, _, allocated_horizon) = allocator.dimensions();
    if allocated_horizon != horizon {
        return Err(DecodeError::HorizonMismatch {
            expected: horizon,
            found: allocated_horizon,
        });
    }

    let mut states = Vec::with_capacity(horizon + 1);

    for t in 0..=horizon {
        let actor = locate(model, grid, Entity::Actor, t, |cell| allocator.actor(cell, t))?;
        let objects = (0..grid.object_count())
            .map(|o| locate(model, grid, Entity::Object(o), t, |cell| allocator.object(o, cell, t)))
            .collect::<Result<Vec<_>, _>>()?;
        states.push(PuzzleState { actor, objects });
    }

    Ok(Trajectory { states })
}

fn locate<F, E>(model: &Model, grid: &Grid, entity: Entity, t: usize, var: F) -> Result<Cell, DecodeError>
where
    F: Fn(Cell) -> Result<i32, E>,
{
    let cells: Vec<Cell> = grid
        .cells()
        .filter(|&cell| var(cell).map(|v| model.value(v)).unwrap_or(false))
        .collect();

    match cells.as_slice() {
        [cell] => Ok(*cell),
        [] => Err(DecodeError::MissingPosition { entity, t }),
        _ => Err(DecodeError::AmbiguousPosition { entity, t, cells }),
    }
}

/// Difference consecutive actor positions into moves
pub fn moves_from_trajectory(trajectory: &Trajectory) -> Result<MoveSequence, DecodeError> {
    let moves = trajectory
        .states
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (from, to) = (pair[0].actor, pair[1].actor);
            let dx = to.x as isize - from.x as isize;
            let dy = to.y as isize - from.y as isize;
            Move::from_delta(dx, dy).ok_or(DecodeError::NonAdjacentStep { t: i + 1, from, to })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MoveSequence { moves })
}

/// Decode a model into exactly `horizon` moves
pub fn decode(
    model: &Model,
    grid: &Grid,
    allocator: &VariableAllocator,
    horizon: usize,
) -> Result<MoveSequence, DecodeError> {
    let trajectory = decode_trajectory(model, grid, allocator, horizon)?;
    moves_from_trajectory(&trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::parse_grid_from_string;
    use std::time::Duration;

    /// Model that sets exactly the given propositions
    fn model_for(va: &VariableAllocator, actor: &[(usize, usize)], objects: &[Vec<(usize, usize)>]) -> Model {
        let mut lits = Vec::new();
        for (t, &(x, y)) in actor.iter().enumerate() {
            lits.push(va.actor(Cell::new(x, y), t).unwrap());
        }
        for (o, path) in objects.iter().enumerate() {
            for (t, &(x, y)) in path.iter().enumerate() {
                lits.push(va.object(o, Cell::new(x, y), t).unwrap());
            }
        }
        Model::from_literals(lits, Duration::ZERO)
    }

    #[test]
    fn test_decode_moves_with_waits() {
        let grid = parse_grid_from_string("P...\n.B..\n...G").unwrap();
        let va = VariableAllocator::new(4, 3, 4, 1).unwrap();
        let model = model_for(
            &va,
            &[(1, 1), (2, 1), (2, 1), (2, 2), (1, 2)],
            &[vec![(2, 2), (2, 2), (2, 2), (2, 3), (2, 3)]],
        );

        let moves = decode(&model, &grid, &va, 4).unwrap();
        assert_eq!(moves.moves, vec![Move::Right, Move::Wait, Move::Down, Move::Left]);
        assert_eq!(moves.len(), 4);
        assert_eq!(moves.wait_count(), 1);
        assert_eq!(moves.to_string_with(false), "RDL");
        assert_eq!(moves.to_string(), "RWDL");

        let trajectory = decode_trajectory(&model, &grid, &va, 4).unwrap();
        assert_eq!(trajectory.object_path(0).unwrap()[3], Cell::new(2, 3));
        assert_eq!(trajectory.object_path(1), None);
        assert_eq!(trajectory.actor_path().len(), 5);
    }

    #[test]
    fn test_missing_position_is_fatal() {
        let grid = parse_grid_from_string("PBG").unwrap();
        let va = VariableAllocator::new(3, 1, 1, 1).unwrap();
        let model = model_for(&va, &[(1, 1)], &[vec![(2, 1), (3, 1)]]);

        assert_eq!(
            decode(&model, &grid, &va, 1),
            Err(DecodeError::MissingPosition { entity: Entity::Actor, t: 1 })
        );
    }

    #[test]
    fn test_ambiguous_position_is_fatal() {
        let grid = parse_grid_from_string("PBG").unwrap();
        let va = VariableAllocator::new(3, 1, 1, 1).unwrap();
        let mut model = model_for(&va, &[(1, 1), (2, 1)], &[vec![(2, 1), (3, 1)]]);
        model
            .assignment
            .insert(va.object(0, Cell::new(1, 1), 1).unwrap(), true);

        assert!(matches!(
            decode_trajectory(&model, &grid, &va, 1),
            Err(DecodeError::AmbiguousPosition { entity: Entity::Object(0), t: 1, .. })
        ));
    }

    #[test]
    fn test_jump_is_fatal() {
        let grid = parse_grid_from_string("P..\n..G\n.B.").unwrap();
        let va = VariableAllocator::new(3, 3, 1, 1).unwrap();
        let model = model_for(&va, &[(1, 1), (3, 2)], &[vec![(2, 3), (2, 3)]]);

        assert_eq!(
            decode(&model, &grid, &va, 1),
            Err(DecodeError::NonAdjacentStep {
                t: 1,
                from: Cell::new(1, 1),
                to: Cell::new(3, 2),
            })
        );
    }

    #[test]
    fn test_parse_move_sequence() {
        let seq = MoveSequence::parse("R, r w\nD").unwrap();
        assert_eq!(seq.moves, vec![Move::Right, Move::Right, Move::Wait, Move::Down]);
        assert!(MoveSequence::parse("RX").is_none());
        assert!(MoveSequence::parse("").unwrap().is_empty());
    }
}
