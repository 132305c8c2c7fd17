//! SAT oracle boundary: CaDiCaL and Varisat backends behind one trait

use super::constraints::Clause;
use crate::config::SolverBackend;
use anyhow::Result;
use cadical::Solver;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use varisat::{ExtendFormula, Lit};

/// A satisfying assignment returned by an oracle
#[derive(Debug, Clone)]
pub struct Model {
    pub assignment: HashMap<i32, bool>,
    pub solve_time: Duration,
}

impl Model {
    /// Build a model from signed literals (positive = true)
    pub fn from_literals<I: IntoIterator<Item = i32>>(literals: I, solve_time: Duration) -> Self {
        let assignment = literals
            .into_iter()
            .filter(|&lit| lit != 0)
            .map(|lit| (lit.abs(), lit > 0))
            .collect();
        Self {
            assignment,
            solve_time,
        }
    }

    /// Value of a variable; unassigned variables read as false
    pub fn value(&self, var: i32) -> bool {
        self.assignment.get(&var).copied().unwrap_or(false)
    }

    /// Variables assigned true, ascending
    pub fn true_variables(&self) -> Vec<i32> {
        let mut vars: Vec<i32> = self
            .assignment
            .iter()
            .filter(|(_, &value)| value)
            .map(|(&var, _)| var)
            .collect();
        vars.sort_unstable();
        vars
    }

    /// Check that every clause has a true literal under this model
    pub fn satisfies(&self, clauses: &[Clause]) -> bool {
        clauses.iter().all(|clause| {
            clause
                .literals
                .iter()
                .any(|&lit| self.value(lit.abs()) == (lit > 0))
        })
    }
}

/// External solving engine.
///
/// `Ok(None)` means UNSAT. Nothing is assumed about strategy, determinism or
/// which of several models comes back.
pub trait SolveOracle {
    fn backend(&self) -> SolverBackend;

    /// Solve a fresh instance made of exactly these clauses
    fn solve_clauses(&mut self, clauses: &[Clause]) -> Result<Option<Model>>;
}

/// Create an oracle with no clauses loaded
pub fn create_oracle(backend: SolverBackend) -> Box<dyn SolveOracle> {
    match backend {
        SolverBackend::Cadical => Box::new(SatSolver::new()),
        SolverBackend::Varisat => Box::new(VarisatSolver::new()),
    }
}

fn check_clause(clause: &Clause) -> Result<()> {
    if clause.is_empty() {
        anyhow::bail!("Cannot add empty clause (unsatisfiable)");
    }
    if clause.literals.contains(&0) {
        anyhow::bail!("Clause contains the literal 0");
    }
    Ok(())
}

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
}

/// Statistics about the solving process
#[derive(Debug, Clone)]
pub struct SolverStatistics {
    pub variable_count: usize,
    pub clause_count: usize,
}

impl SatSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
        }
    }

    /// Add clauses to the solver
    pub fn add_clauses(&mut self, clauses: &[Clause]) -> Result<()> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    /// Add a single clause to the solver
    pub fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        check_clause(clause)?;

        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());

        self.clause_count += 1;
        Ok(())
    }

    /// Solve the SAT problem and return the first solution
    pub fn solve(&mut self) -> Result<Option<Model>> {
        let start_time = Instant::now();
        let result = self.solver.solve();
        let solve_time = start_time.elapsed();

        debug!(
            variables = self.variable_count,
            clauses = self.clause_count,
            ?result,
            "cadical finished"
        );

        match result {
            Some(true) => Ok(Some(Model {
                assignment: self.extract_assignment(),
                solve_time,
            })),
            Some(false) => Ok(None),
            None => anyhow::bail!("CaDiCaL stopped without a result"),
        }
    }

    /// Solve and find multiple solutions up to a limit
    pub fn solve_multiple(&mut self, max_solutions: usize) -> Result<Vec<Model>> {
        let mut solutions = Vec::new();
        let start_time = Instant::now();

        for _ in 0..max_solutions {
            if self.solver.solve() == Some(true) {
                let assignment = self.extract_assignment();
                self.add_blocking_clause(&assignment)?;
                solutions.push(Model {
                    assignment,
                    solve_time: start_time.elapsed(),
                });
            } else {
                break;
            }
        }

        Ok(solutions)
    }

    /// Extract variable assignment from the solver
    fn extract_assignment(&self) -> HashMap<i32, bool> {
        let mut assignment = HashMap::new();

        for var in 1..=self.variable_count as i32 {
            if let Some(value) = self.solver.value(var) {
                assignment.insert(var, value);
            }
        }

        assignment
    }

    /// Add a blocking clause to prevent finding the same solution again
    fn add_blocking_clause(&mut self, assignment: &HashMap<i32, bool>) -> Result<()> {
        let blocking_literals = assignment
            .iter()
            .map(|(&var, &value)| if value { -var } else { var })
            .collect();

        self.add_clause(&Clause::new(blocking_literals))
    }

    /// Get solver statistics
    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            variable_count: self.variable_count,
            clause_count: self.clause_count,
        }
    }

    /// Reset the solver (clear all clauses)
    pub fn reset(&mut self) {
        self.solver = Solver::new();
        self.variable_count = 0;
        self.clause_count = 0;
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolveOracle for SatSolver {
    fn backend(&self) -> SolverBackend {
        SolverBackend::Cadical
    }

    fn solve_clauses(&mut self, clauses: &[Clause]) -> Result<Option<Model>> {
        self.reset();
        self.add_clauses(clauses)?;
        self.solve()
    }
}

/// Pure-Rust backend built on Varisat
pub struct VarisatSolver {
    solver: varisat::Solver<'static>,
    variable_count: usize,
}

impl VarisatSolver {
    pub fn new() -> Self {
        Self {
            solver: varisat::Solver::new(),
            variable_count: 0,
        }
    }

    pub fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        check_clause(clause)?;

        let lits: Vec<Lit> = clause
            .literals
            .iter()
            .map(|&lit| Lit::from_dimacs(lit as isize))
            .collect();
        for &literal in &clause.literals {
            self.variable_count = self.variable_count.max(literal.unsigned_abs() as usize);
        }

        self.solver.add_clause(&lits);
        Ok(())
    }

    pub fn solve(&mut self) -> Result<Option<Model>> {
        let start_time = Instant::now();
        let satisfiable = self
            .solver
            .solve()
            .map_err(|e| anyhow::anyhow!("Varisat error: {}", e))?;
        let solve_time = start_time.elapsed();

        debug!(variables = self.variable_count, satisfiable, "varisat finished");

        if !satisfiable {
            return Ok(None);
        }

        let model = self
            .solver
            .model()
            .ok_or_else(|| anyhow::anyhow!("Varisat reported SAT without a model"))?;

        let mut result = Model::from_literals(
            model.iter().map(|lit| lit.to_dimacs() as i32),
            solve_time,
        );
        for var in 1..=self.variable_count as i32 {
            result.assignment.entry(var).or_insert(false);
        }
        Ok(Some(result))
    }
}

impl Default for VarisatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolveOracle for VarisatSolver {
    fn backend(&self) -> SolverBackend {
        SolverBackend::Varisat
    }

    fn solve_clauses(&mut self, clauses: &[Clause]) -> Result<Option<Model>> {
        *self = Self::new();
        for clause in clauses {
            self.add_clause(clause)?;
        }
        self.solve()
    }
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Clauses: {}", self.clause_count)?;
        Ok(())
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Model:")?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        writeln!(f, "  Variables assigned: {}", self.assignment.len())?;

        let mut vars: Vec<_> = self.assignment.keys().collect();
        vars.sort();

        write!(f, "  Sample assignments: ")?;
        for (i, &var) in vars.iter().take(10).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let value = self.assignment[var];
            write!(f, "{}={}", var, if value { "T" } else { "F" })?;
        }
        if vars.len() > 10 {
            write!(f, ", ...")?;
        }
        writeln!(f)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = SatSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
    }

    #[test]
    fn test_simple_satisfiable() {
        for backend in [SolverBackend::Cadical, SolverBackend::Varisat] {
            let mut oracle = create_oracle(backend);
            let clauses = vec![Clause::new(vec![1, 2]), Clause::new(vec![-1, 2])];

            let model = oracle.solve_clauses(&clauses).unwrap().unwrap();
            assert!(model.value(2), "{:?}", backend);
            assert!(model.satisfies(&clauses));
        }
    }

    #[test]
    fn test_unsatisfiable() {
        for backend in [SolverBackend::Cadical, SolverBackend::Varisat] {
            let mut oracle = create_oracle(backend);
            let clauses = vec![Clause::unit(1), Clause::unit(-1)];
            assert!(oracle.solve_clauses(&clauses).unwrap().is_none());
        }
    }

    #[test]
    fn test_varisat_incremental_clauses() {
        let mut solver = VarisatSolver::new();
        solver.add_clause(&Clause::new(vec![1, 2, 3])).unwrap();
        solver.add_clause(&Clause::binary(-1, -2)).unwrap();
        solver.add_clause(&Clause::unit(-3)).unwrap();

        let model = solver.solve().unwrap().unwrap();
        assert!(model.value(1) != model.value(2));
        assert!(!model.value(3));
        assert_eq!(model.assignment.len(), 3);

        assert!(solver.add_clause(&Clause::new(Vec::new())).is_err());
    }

    #[test]
    fn test_oracle_calls_are_independent() {
        let mut oracle = create_oracle(SolverBackend::Cadical);
        assert!(oracle
            .solve_clauses(&[Clause::unit(1), Clause::unit(-1)])
            .unwrap()
            .is_none());
        assert!(oracle.solve_clauses(&[Clause::unit(1)]).unwrap().is_some());
    }

    #[test]
    fn test_multiple_solutions() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();

        let solutions = solver.solve_multiple(5).unwrap();
        // x1 v x2 has exactly three models
        assert_eq!(solutions.len(), 3);
        for solution in &solutions {
            assert!(solution.value(1) || solution.value(2));
        }
    }

    #[test]
    fn test_empty_clause_error() {
        let mut solver = SatSolver::new();
        assert!(solver.add_clause(&Clause::new(vec![])).is_err());

        let mut varisat = VarisatSolver::new();
        assert!(varisat.add_clause(&Clause::new(vec![])).is_err());
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = SatSolver::new();

        solver.add_clause(&Clause::new(vec![1, -5, 3])).unwrap();
        assert_eq!(solver.variable_count(), 5);

        solver.add_clause(&Clause::new(vec![2, -7])).unwrap();
        assert_eq!(solver.variable_count(), 7);
    }

    #[test]
    fn test_model_helpers() {
        let model = Model::from_literals(vec![1, -2, 3], Duration::ZERO);
        assert_eq!(model.true_variables(), vec![1, 3]);
        assert!(!model.value(2));
        assert!(!model.value(42));
        assert!(model.satisfies(&[Clause::new(vec![-1, 3]), Clause::unit(-2)]));
        assert!(!model.satisfies(&[Clause::binary(-1, 2)]));
    }
}
