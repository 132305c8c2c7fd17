//! Variable allocation for the SAT encoding

use crate::error::{AllocationError, ValidationError};
use crate::puzzle::Cell;

/// Boolean propositions used in the encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Proposition {
    /// Actor occupies (x, y) at time t
    Actor { x: usize, y: usize, t: usize },
    /// Object `object` occupies (x, y) at time t
    Object {
        object: usize,
        x: usize,
        y: usize,
        t: usize,
    },
}

/// Maps propositions to SAT variable ids (positive integers) and back.
///
/// Ids are mixed-radix numbers with digits `x - 1` (radix `width`),
/// `y - 1` (radix `height`), `t` (radix `horizon + 1`) and an entity slot
/// (`0` for the actor, `1 + o` for object `o`). Every radix is taken from
/// the grid and horizon, so the map is a bijection onto
/// `1..=variable_count()` with no table behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableAllocator {
    width: usize,
    height: usize,
    horizon: usize,
    object_count: usize,
}

impl VariableAllocator {
    /// Create an allocator, rejecting dimensions whose id space would overflow `i32`
    pub fn new(
        width: usize,
        height: usize,
        horizon: usize,
        object_count: usize,
    ) -> Result<Self, ValidationError> {
        let required = (width as u128)
            * (height as u128)
            * (horizon as u128 + 1)
            * (object_count as u128 + 1);
        let limit = i32::MAX as u128;

        if required > limit {
            return Err(ValidationError::VariableSpaceExhausted { required, limit });
        }

        Ok(Self {
            width,
            height,
            horizon,
            object_count,
        })
    }

    /// Variable id for a proposition
    pub fn id(&self, prop: &Proposition) -> Result<i32, AllocationError> {
        let (slot, x, y, t) = match *prop {
            Proposition::Actor { x, y, t } => (0, x, y, t),
            Proposition::Object { object, x, y, t } => {
                if object >= self.object_count {
                    return Err(AllocationError::ObjectOutOfRange {
                        object,
                        count: self.object_count,
                    });
                }
                (object + 1, x, y, t)
            }
        };

        if x == 0 || x > self.width || y == 0 || y > self.height {
            return Err(AllocationError::CellOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        if t > self.horizon {
            return Err(AllocationError::TimeOutOfRange {
                t,
                horizon: self.horizon,
            });
        }

        let steps = self.horizon + 1;
        let packed = ((slot * steps + t) * self.height + (y - 1)) * self.width + (x - 1);
        Ok(packed as i32 + 1)
    }

    /// Variable id for the actor at a cell and time
    pub fn actor(&self, cell: Cell, t: usize) -> Result<i32, AllocationError> {
        self.id(&Proposition::Actor {
            x: cell.x,
            y: cell.y,
            t,
        })
    }

    /// Variable id for an object at a cell and time
    pub fn object(&self, object: usize, cell: Cell, t: usize) -> Result<i32, AllocationError> {
        self.id(&Proposition::Object {
            object,
            x: cell.x,
            y: cell.y,
            t,
        })
    }

    /// Recover the proposition behind a variable id
    pub fn inverse(&self, var: i32) -> Option<Proposition> {
        if var < 1 || var as usize > self.variable_count() {
            return None;
        }

        let mut rest = var as usize - 1;
        let x = rest % self.width + 1;
        rest /= self.width;
        let y = rest % self.height + 1;
        rest /= self.height;
        let t = rest % (self.horizon + 1);
        let slot = rest / (self.horizon + 1);

        Some(if slot == 0 {
            Proposition::Actor { x, y, t }
        } else {
            Proposition::Object {
                object: slot - 1,
                x,
                y,
                t,
            }
        })
    }

    /// Number of variables in the id space
    pub fn variable_count(&self) -> usize {
        self.width * self.height * (self.horizon + 1) * (self.object_count + 1)
    }

    /// Grid dimensions and horizon
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.horizon)
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        let per_entity = self.width * self.height * (self.horizon + 1);
        VariableStatistics {
            total_variables: self.variable_count(),
            actor_variables: per_entity,
            object_variables: per_entity * self.object_count,
        }
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub actor_variables: usize,
    pub object_variables: usize,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Actor variables: {}", self.actor_variables)?;
        writeln!(f, "  Object variables: {}", self.object_variables)?;
        Ok(())
    }
}
