//! Constraint generation for the push-puzzle SAT encoding

use super::VariableAllocator;
use crate::config::GoalPolicy;
use crate::error::{EncodeError, ValidationError};
use crate::puzzle::{Cell, Grid, Move};
use itertools::Itertools;
use tracing::debug;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self {
            literals: vec![literal],
        }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self {
            literals: vec![lit1, lit2],
        }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }
}

/// Groups of clauses, each encoding one law of the puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClauseFamily {
    InitialState,
    Totality,
    Exclusivity,
    ObstacleExclusion,
    MutualExclusion,
    ActorMotion,
    PushPhysics,
    BoundaryGuard,
    Inertia,
    Goal,
}

impl ClauseFamily {
    pub const ALL: [ClauseFamily; 10] = [
        ClauseFamily::InitialState,
        ClauseFamily::Totality,
        ClauseFamily::Exclusivity,
        ClauseFamily::ObstacleExclusion,
        ClauseFamily::MutualExclusion,
        ClauseFamily::ActorMotion,
        ClauseFamily::PushPhysics,
        ClauseFamily::BoundaryGuard,
        ClauseFamily::Inertia,
        ClauseFamily::Goal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClauseFamily::InitialState => "initial state",
            ClauseFamily::Totality => "totality",
            ClauseFamily::Exclusivity => "exclusivity",
            ClauseFamily::ObstacleExclusion => "obstacle exclusion",
            ClauseFamily::MutualExclusion => "mutual exclusion",
            ClauseFamily::ActorMotion => "actor motion",
            ClauseFamily::PushPhysics => "push physics",
            ClauseFamily::BoundaryGuard => "boundary guard",
            ClauseFamily::Inertia => "inertia",
            ClauseFamily::Goal => "goal",
        }
    }
}

impl std::fmt::Display for ClauseFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A CNF instance: the conjunction of its clauses
#[derive(Debug, Clone)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
    pub num_variables: usize,
    /// Clause count per family, in generation order
    pub family_counts: Vec<(ClauseFamily, usize)>,
}

impl Cnf {
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn count(&self, family: ClauseFamily) -> usize {
        self.family_counts
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn literal_count(&self) -> usize {
        self.clauses.iter().map(|c| c.literals.len()).sum()
    }
}

/// Encode a puzzle and horizon with the default goal policy
pub fn encode(grid: &Grid, horizon: usize) -> Result<Cnf, EncodeError> {
    ConstraintGenerator::new(grid, horizon, GoalPolicy::AnyGoal)?.generate_all_constraints()
}

/// Generates SAT constraints for a push puzzle over a fixed horizon
pub struct ConstraintGenerator<'a> {
    grid: &'a Grid,
    allocator: VariableAllocator,
    horizon: usize,
    goal_policy: GoalPolicy,
}

impl<'a> ConstraintGenerator<'a> {
    /// Create a new constraint generator, validating the grid against the goal policy
    pub fn new(grid: &'a Grid, horizon: usize, goal_policy: GoalPolicy) -> Result<Self, ValidationError> {
        let objects = grid.object_count();
        let goals = grid.goals().len();

        match goal_policy {
            GoalPolicy::AnyGoal if goals < objects => {
                return Err(ValidationError::InsufficientGoals { objects, goals });
            }
            GoalPolicy::Matched if goals != objects => {
                return Err(ValidationError::GoalCountMismatch { objects, goals });
            }
            _ => {}
        }

        let allocator = VariableAllocator::new(grid.width, grid.height, horizon, objects)?;

        Ok(Self {
            grid,
            allocator,
            horizon,
            goal_policy,
        })
    }

    pub fn allocator(&self) -> &VariableAllocator {
        &self.allocator
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Generate every clause family
    pub fn generate_all_constraints(&self) -> Result<Cnf, EncodeError> {
        let mut clauses = Vec::new();
        let mut family_counts = Vec::with_capacity(ClauseFamily::ALL.len());

        for family in ClauseFamily::ALL {
            let generated = self.generate_family(family)?;
            debug!(family = family.name(), clauses = generated.len(), "generated clause family");
            family_counts.push((family, generated.len()));
            clauses.extend(generated);
        }

        Ok(Cnf {
            clauses,
            num_variables: self.allocator.variable_count(),
            family_counts,
        })
    }

    /// Generate the clauses of a single family
    pub fn generate_family(&self, family: ClauseFamily) -> Result<Vec<Clause>, EncodeError> {
        match family {
            ClauseFamily::InitialState => self.generate_initial_constraints(),
            ClauseFamily::Totality => self.generate_totality_constraints(),
            ClauseFamily::Exclusivity => self.generate_exclusivity_constraints(),
            ClauseFamily::ObstacleExclusion => self.generate_obstacle_constraints(),
            ClauseFamily::MutualExclusion => self.generate_mutual_exclusion_constraints(),
            ClauseFamily::ActorMotion => self.generate_motion_constraints(),
            ClauseFamily::PushPhysics => self.generate_push_constraints(),
            ClauseFamily::BoundaryGuard => self.generate_boundary_constraints(),
            ClauseFamily::Inertia => self.generate_inertia_constraints(),
            ClauseFamily::Goal => self.generate_goal_constraints(),
        }
    }

    /// Closed-form clause count of a family, without generating it
    pub fn estimate_family_size(&self, family: ClauseFamily) -> usize {
        let (m, n) = (self.grid.width, self.grid.height);
        let cells = m * n;
        let objects = self.grid.object_count();
        let entities = objects + 1;
        let steps = self.horizon + 1;
        let t = self.horizon;

        match family {
            ClauseFamily::InitialState => entities,
            ClauseFamily::Totality => entities * steps,
            ClauseFamily::Exclusivity => entities * steps * (cells * cells.saturating_sub(1) / 2),
            ClauseFamily::ObstacleExclusion => self.grid.obstacles().len() * steps * entities,
            ClauseFamily::MutualExclusion => {
                steps * cells * (objects + objects * objects.saturating_sub(1) / 2)
            }
            ClauseFamily::ActorMotion => t * cells,
            ClauseFamily::PushPhysics => {
                objects * t * (2 * n * m.saturating_sub(2) + 2 * m * n.saturating_sub(2))
            }
            ClauseFamily::BoundaryGuard => {
                let horizontal = if m >= 2 { 2 * n } else { 0 };
                let vertical = if n >= 2 { 2 * m } else { 0 };
                objects * t * (horizontal + vertical)
            }
            ClauseFamily::Inertia => objects * t * cells,
            ClauseFamily::Goal => objects,
        }
    }

    fn actor(&self, cell: Cell, t: usize) -> Result<i32, EncodeError> {
        Ok(self.allocator.actor(cell, t)?)
    }

    fn object(&self, object: usize, cell: Cell, t: usize) -> Result<i32, EncodeError> {
        Ok(self.allocator.object(object, cell, t)?)
    }

    /// Fix every entity's position at t=0
    fn generate_initial_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = vec![Clause::unit(self.actor(self.grid.actor_start(), 0)?)];

        for (o, &start) in self.grid.objects().iter().enumerate() {
            clauses.push(Clause::unit(self.object(o, start, 0)?));
        }

        Ok(clauses)
    }

    /// Each entity occupies at least one cell at every time step
    fn generate_totality_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for t in 0..=self.horizon {
            let actor = self
                .grid
                .cells()
                .map(|cell| self.actor(cell, t))
                .collect::<Result<Vec<_>, _>>()?;
            clauses.push(Clause::new(actor));

            for o in 0..self.grid.object_count() {
                let object = self
                    .grid
                    .cells()
                    .map(|cell| self.object(o, cell, t))
                    .collect::<Result<Vec<_>, _>>()?;
                clauses.push(Clause::new(object));
            }
        }

        Ok(clauses)
    }

    /// Each entity occupies at most one cell at every time step (pairwise, quadratic in cells)
    fn generate_exclusivity_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();
        let cells: Vec<Cell> = self.grid.cells().collect();

        for t in 0..=self.horizon {
            for (&a, &b) in cells.iter().tuple_combinations() {
                clauses.push(Clause::binary(-self.actor(a, t)?, -self.actor(b, t)?));
                for o in 0..self.grid.object_count() {
                    clauses.push(Clause::binary(-self.object(o, a, t)?, -self.object(o, b, t)?));
                }
            }
        }

        Ok(clauses)
    }

    /// Nothing ever stands on an obstacle
    fn generate_obstacle_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for &cell in self.grid.obstacles() {
            for t in 0..=self.horizon {
                clauses.push(Clause::unit(-self.actor(cell, t)?));
                for o in 0..self.grid.object_count() {
                    clauses.push(Clause::unit(-self.object(o, cell, t)?));
                }
            }
        }

        Ok(clauses)
    }

    /// No two entities share a cell
    fn generate_mutual_exclusion_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();
        let objects = self.grid.object_count();

        for t in 0..=self.horizon {
            for cell in self.grid.cells() {
                let actor = self.actor(cell, t)?;
                for o in 0..objects {
                    clauses.push(Clause::binary(-actor, -self.object(o, cell, t)?));
                }
                for (o1, o2) in (0..objects).tuple_combinations() {
                    clauses.push(Clause::binary(
                        -self.object(o1, cell, t)?,
                        -self.object(o2, cell, t)?,
                    ));
                }
            }
        }

        Ok(clauses)
    }

    /// The actor stays put or moves to an orthogonal neighbour
    fn generate_motion_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for t in 0..self.horizon {
            for cell in self.grid.cells() {
                let mut literals = vec![-self.actor(cell, t)?, self.actor(cell, t + 1)?];
                for neighbor in self.grid.neighbors(cell) {
                    literals.push(self.actor(neighbor, t + 1)?);
                }
                clauses.push(Clause::new(literals));
            }
        }

        Ok(clauses)
    }

    /// Stepping onto an object from `behind` moves it one cell further along
    fn generate_push_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for o in 0..self.grid.object_count() {
            for t in 0..self.horizon {
                for cell in self.grid.cells() {
                    for dir in Move::DIRECTIONS {
                        let (Some(behind), Some(ahead)) = (
                            self.grid.step(cell, dir.opposite()),
                            self.grid.step(cell, dir),
                        ) else {
                            continue;
                        };

                        clauses.push(Clause::new(vec![
                            -self.object(o, cell, t)?,
                            -self.actor(cell, t + 1)?,
                            -self.actor(behind, t)?,
                            self.object(o, ahead, t + 1)?,
                        ]));
                    }
                }
            }
        }

        Ok(clauses)
    }

    /// An object on an edge cannot be pushed across that edge
    fn generate_boundary_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for o in 0..self.grid.object_count() {
            for t in 0..self.horizon {
                for dir in Move::DIRECTIONS {
                    for cell in self.edge_cells(dir) {
                        let Some(behind) = self.grid.step(cell, dir.opposite()) else {
                            continue;
                        };

                        clauses.push(Clause::new(vec![
                            -self.object(o, cell, t)?,
                            -self.actor(behind, t)?,
                            -self.actor(cell, t + 1)?,
                        ]));
                    }
                }
            }
        }

        Ok(clauses)
    }

    /// Cells on the edge that `dir` points off
    fn edge_cells(&self, dir: Move) -> Vec<Cell> {
        let (m, n) = (self.grid.width, self.grid.height);
        match dir {
            Move::Right => (1..=n).map(|y| Cell::new(m, y)).collect(),
            Move::Left => (1..=n).map(|y| Cell::new(1, y)).collect(),
            Move::Down => (1..=m).map(|x| Cell::new(x, n)).collect(),
            Move::Up => (1..=m).map(|x| Cell::new(x, 1)).collect(),
            Move::Wait => Vec::new(),
        }
    }

    /// An object the actor does not step onto stays where it is
    fn generate_inertia_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();

        for o in 0..self.grid.object_count() {
            for t in 0..self.horizon {
                for cell in self.grid.cells() {
                    clauses.push(Clause::new(vec![
                        -self.object(o, cell, t)?,
                        self.actor(cell, t + 1)?,
                        self.object(o, cell, t + 1)?,
                    ]));
                }
            }
        }

        Ok(clauses)
    }

    /// Objects rest on goal cells at the horizon
    fn generate_goal_constraints(&self) -> Result<Vec<Clause>, EncodeError> {
        let mut clauses = Vec::new();
        let goals = self.grid.goals();

        for o in 0..self.grid.object_count() {
            match self.goal_policy {
                GoalPolicy::AnyGoal => {
                    let literals = goals
                        .iter()
                        .map(|&goal| self.object(o, goal, self.horizon))
                        .collect::<Result<Vec<_>, _>>()?;
                    clauses.push(Clause::new(literals));
                }
                GoalPolicy::Matched => {
                    clauses.push(Clause::unit(self.object(o, goals[o], self.horizon)?));
                }
            }
        }

        Ok(clauses)
    }
}
