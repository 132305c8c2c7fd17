//! Plan validation by replaying moves under the push rules

use crate::config::GoalPolicy;
use crate::puzzle::{Grid, Move, PushRules, PuzzleState};
use crate::sat::Trajectory;
use anyhow::Result;

/// Validates plans against the puzzle rules, independently of the SAT encoding
pub struct PlanValidator {
    goal_policy: GoalPolicy,
}

/// Result of plan validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// States visited by the replay, starting with the initial state
    pub states: Vec<PuzzleState>,
    pub error_message: Option<String>,
    pub details: ValidationDetails,
}

/// Detailed validation information
#[derive(Debug, Clone, Default)]
pub struct ValidationDetails {
    pub steps_checked: usize,
    /// Index of the first move the rules reject
    pub illegal_step: Option<usize>,
    pub goal_reached: bool,
    /// First step where the replayed state differs from the decoded one
    pub trajectory_divergence: Option<usize>,
    pub pushes: usize,
    pub waits: usize,
}

impl PlanValidator {
    /// Create a new plan validator
    pub fn new(goal_policy: GoalPolicy) -> Self {
        Self { goal_policy }
    }

    /// Replay `moves` from the initial state and check the goal
    pub fn validate(&self, grid: &Grid, moves: &[Move]) -> Result<ValidationResult> {
        let mut details = ValidationDetails {
            waits: moves.iter().filter(|&&m| m == Move::Wait).count(),
            ..Default::default()
        };

        let states = match PushRules::replay(grid, moves) {
            Ok(states) => states,
            Err((step, illegal)) => {
                details.steps_checked = step;
                details.illegal_step = Some(step);
                return Ok(ValidationResult {
                    is_valid: false,
                    states: Vec::new(),
                    error_message: Some(format!("Move {} ({}) is illegal: {}", step + 1, moves[step], illegal)),
                    details,
                });
            }
        };

        details.steps_checked = moves.len();
        details.pushes = states
            .windows(2)
            .filter(|pair| pair[0].objects != pair[1].objects)
            .count();

        let Some(final_state) = states.last() else {
            anyhow::bail!("Replay produced no states");
        };
        details.goal_reached = self.is_solved(grid, final_state);

        let error_message = if details.goal_reached {
            None
        } else {
            Some(format!(
                "Final state leaves objects off their goals: {:?}",
                final_state.objects
            ))
        };

        Ok(ValidationResult {
            is_valid: details.goal_reached,
            states,
            error_message,
            details,
        })
    }

    /// Validate moves and also require the replay to match a decoded trajectory step for step
    pub fn validate_with_trajectory(
        &self,
        grid: &Grid,
        moves: &[Move],
        trajectory: &Trajectory,
    ) -> Result<ValidationResult> {
        let mut result = self.validate(grid, moves)?;
        if result.states.is_empty() {
            return Ok(result);
        }

        let divergence = result
            .states
            .iter()
            .zip(trajectory.states.iter())
            .position(|(replayed, decoded)| replayed != decoded)
            .or_else(|| {
                (result.states.len() != trajectory.states.len())
                    .then(|| result.states.len().min(trajectory.states.len()))
            });

        if let Some(step) = divergence {
            result.is_valid = false;
            result.details.trajectory_divergence = Some(step);
            result.error_message = Some(format!(
                "Replayed state at t={} differs from the decoded trajectory",
                step
            ));
        }

        Ok(result)
    }

    /// Quick check that a plan is legal and solves the puzzle
    pub fn quick_validate(&self, grid: &Grid, moves: &[Move]) -> bool {
        PushRules::replay(grid, moves)
            .ok()
            .and_then(|states| states.last().map(|s| self.is_solved(grid, s)))
            .unwrap_or(false)
    }

    /// Goal test under the configured goal policy
    pub fn is_solved(&self, grid: &Grid, state: &PuzzleState) -> bool {
        match self.goal_policy {
            GoalPolicy::AnyGoal => PushRules::is_goal(grid, state),
            GoalPolicy::Matched => state
                .objects
                .iter()
                .zip(grid.goals())
                .all(|(object, goal)| object == goal),
        }
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Valid: {}", if self.is_valid { "Yes" } else { "No" })?;
        writeln!(f, "  Steps checked: {}", self.details.steps_checked)?;
        writeln!(f, "  Pushes: {}", self.details.pushes)?;
        writeln!(f, "  Waits: {}", self.details.waits)?;
        writeln!(f, "  Goal reached: {}", self.details.goal_reached)?;

        if let Some(ref error) = self.error_message {
            writeln!(f, "  Error: {}", error)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{parse_grid_from_string, Cell};

    #[test]
    fn test_valid_plan() {
        let grid = parse_grid_from_string("P.BG").unwrap();
        let validator = PlanValidator::new(GoalPolicy::AnyGoal);
        let result = validator
            .validate(&grid, &[Move::Wait, Move::Right, Move::Right])
            .unwrap();

        assert!(result.is_valid);
        assert_eq!(result.states.len(), 4);
        assert_eq!(result.details.pushes, 1);
        assert_eq!(result.details.waits, 1);
    }

    #[test]
    fn test_illegal_move_reported() {
        let grid = parse_grid_from_string("GPB").unwrap();
        let validator = PlanValidator::new(GoalPolicy::AnyGoal);
        let result = validator.validate(&grid, &[Move::Wait, Move::Right]).unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.details.illegal_step, Some(1));
        assert!(result.error_message.unwrap().contains("off the grid"));
    }

    #[test]
    fn test_goal_not_reached() {
        let grid = parse_grid_from_string("P.BG").unwrap();
        let validator = PlanValidator::new(GoalPolicy::AnyGoal);
        let result = validator.validate(&grid, &[Move::Right]).unwrap();

        assert!(!result.is_valid);
        assert!(!result.details.goal_reached);
        assert!(!validator.quick_validate(&grid, &[Move::Right]));
        assert!(validator.quick_validate(&grid, &[Move::Right, Move::Right]));
    }

    #[test]
    fn test_matched_policy_needs_own_goal() {
        // Objects in row-major order: (2,1), (2,3); goals: (3,1), (1,3)
        let grid = parse_grid_from_string("PBG\n...\nGB.").unwrap();
        let state = PuzzleState {
            actor: Cell::new(2, 2),
            objects: vec![Cell::new(1, 3), Cell::new(3, 1)],
        };
        assert!(PlanValidator::new(GoalPolicy::AnyGoal).is_solved(&grid, &state));
        assert!(!PlanValidator::new(GoalPolicy::Matched).is_solved(&grid, &state));
    }

    #[test]
    fn test_trajectory_divergence() {
        let grid = parse_grid_from_string("PBG").unwrap();
        let validator = PlanValidator::new(GoalPolicy::AnyGoal);
        let mut states = PushRules::replay(&grid, &[Move::Right]).unwrap();

        let matching = Trajectory { states: states.clone() };
        assert!(validator
            .validate_with_trajectory(&grid, &[Move::Right], &matching)
            .unwrap()
            .is_valid);

        states[1].objects[0] = Cell::new(2, 1);
        let broken = Trajectory { states };
        let result = validator
            .validate_with_trajectory(&grid, &[Move::Right], &broken)
            .unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.details.trajectory_divergence, Some(1));
    }
}
