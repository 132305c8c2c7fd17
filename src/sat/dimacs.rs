//! DIMACS CNF export and parsing of external solver output

use super::{Clause, Cnf, Model};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

/// Result reported by an external DIMACS solver
#[derive(Debug, Clone)]
pub enum SolverOutput {
    Satisfiable(Model),
    Unsatisfiable,
    Unknown,
}

/// Render a CNF instance in DIMACS format
pub fn to_dimacs(cnf: &Cnf) -> String {
    let mut dimacs = String::from("c push-puzzle planning encoding\n");
    for (family, count) in &cnf.family_counts {
        dimacs.push_str(&format!("c {}: {} clauses\n", family, count));
    }
    dimacs.push_str(&format!("p cnf {} {}\n", cnf.num_variables, cnf.clauses.len()));

    for clause in &cnf.clauses {
        for lit in &clause.literals {
            dimacs.push_str(&lit.to_string());
            dimacs.push(' ');
        }
        dimacs.push_str("0\n");
    }

    dimacs
}

/// Write a CNF instance to a DIMACS file
pub fn write_dimacs<P: AsRef<Path>>(cnf: &Cnf, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, to_dimacs(cnf))
        .with_context(|| format!("Failed to write DIMACS file: {}", path.display()))
}

/// Parse the clauses of a DIMACS CNF document
pub fn parse_dimacs(content: &str) -> Result<Cnf> {
    let mut declared: Option<(usize, usize)> = None;
    let mut clauses = Vec::new();
    let mut current = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if let Some(header) = line.strip_prefix("p cnf") {
            let numbers: Vec<usize> = header
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .with_context(|| format!("Malformed header on line {}", line_no + 1))?;
            match numbers.as_slice() {
                [vars, count] => declared = Some((*vars, *count)),
                _ => anyhow::bail!("Malformed header on line {}", line_no + 1),
            }
            continue;
        }

        for token in line.split_whitespace() {
            let lit: i32 = token
                .parse()
                .with_context(|| format!("Invalid literal '{}' on line {}", token, line_no + 1))?;
            if lit == 0 {
                clauses.push(Clause::new(std::mem::take(&mut current)));
            } else {
                current.push(lit);
            }
        }
    }

    if !current.is_empty() {
        anyhow::bail!("Last clause is not terminated by 0");
    }

    let (num_variables, num_clauses) =
        declared.ok_or_else(|| anyhow::anyhow!("Missing 'p cnf' header"))?;
    if num_clauses != clauses.len() {
        anyhow::bail!("Header declares {} clauses, found {}", num_clauses, clauses.len());
    }

    Ok(Cnf {
        clauses,
        num_variables,
        family_counts: Vec::new(),
    })
}

/// Parse the `s` status line and `v` value lines of a competition-format solver
pub fn parse_solver_output(output: &str) -> Result<SolverOutput> {
    let mut status = None;
    let mut literals = Vec::new();

    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("s ") {
            status = Some(rest.trim().to_string());
        } else if let Some(rest) = trimmed.strip_prefix('v') {
            for token in rest.split_whitespace() {
                let lit: i32 = token
                    .parse()
                    .with_context(|| format!("Invalid value literal '{}'", token))?;
                literals.push(lit);
            }
        }
    }

    match status.as_deref() {
        Some("SATISFIABLE") => Ok(SolverOutput::Satisfiable(Model::from_literals(
            literals,
            Duration::ZERO,
        ))),
        Some("UNSATISFIABLE") => Ok(SolverOutput::Unsatisfiable),
        Some("UNKNOWN") | None => Ok(SolverOutput::Unknown),
        Some(other) => anyhow::bail!("Unrecognised solver status: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::parse_grid_from_string;
    use crate::sat::encode;

    #[test]
    fn test_dimacs_header_and_terminators() {
        let cnf = Cnf {
            clauses: vec![Clause::new(vec![1, -2]), Clause::unit(3)],
            num_variables: 3,
            family_counts: Vec::new(),
        };
        let text = to_dimacs(&cnf);
        let body: Vec<&str> = text.lines().filter(|l| !l.starts_with('c')).collect();
        assert_eq!(body, vec!["p cnf 3 2", "1 -2 0", "3 0"]);
    }

    #[test]
    fn test_encoding_survives_dimacs() {
        let grid = parse_grid_from_string("P.BG").unwrap();
        let cnf = encode(&grid, 2).unwrap();
        let parsed = parse_dimacs(&to_dimacs(&cnf)).unwrap();
        assert_eq!(parsed.num_variables, cnf.num_variables);
        assert_eq!(parsed.clauses, cnf.clauses);
    }

    #[test]
    fn test_parse_dimacs_rejects_bad_input() {
        assert!(parse_dimacs("1 2 0\n").is_err());
        assert!(parse_dimacs("p cnf 2 1\n1 2\n").is_err());
        assert!(parse_dimacs("p cnf 2 2\n1 2 0\n").is_err());
        assert!(parse_dimacs("p cnf 2 1\n1 x 0\n").is_err());
    }

    #[test]
    fn test_parse_satisfiable_output() {
        let output = "c comment\ns SATISFIABLE\nv 1 -2 3\nv -4 5 0\n";
        match parse_solver_output(output).unwrap() {
            SolverOutput::Satisfiable(model) => {
                assert_eq!(model.true_variables(), vec![1, 3, 5]);
                assert!(!model.value(2));
            }
            other => panic!("expected SAT, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_other_statuses() {
        assert!(matches!(
            parse_solver_output("s UNSATISFIABLE\n").unwrap(),
            SolverOutput::Unsatisfiable
        ));
        assert!(matches!(parse_solver_output("s UNKNOWN").unwrap(), SolverOutput::Unknown));
        assert!(matches!(parse_solver_output("").unwrap(), SolverOutput::Unknown));
        assert!(parse_solver_output("s MAYBE").is_err());
    }
}
