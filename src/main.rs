//! Main CLI application for the push-puzzle SAT planner

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sokoban_sat::{
    config::{CliOverrides, GoalPolicy, HorizonSearch, Settings, SolverBackend},
    plan::{PlanOutcome, PlanValidator, PlanningProblem},
    puzzle::{create_example_puzzles, load_grid_from_file, Grid},
    sat::{
        create_oracle, decode_trajectory, moves_from_trajectory, parse_solver_output, write_dimacs,
        ConstraintGenerator, MoveSequence, SolverOutput, VariableAllocator,
    },
    sudoku::{create_example_sudoku, load_sudoku_from_file, solve_sudoku},
    utils::{ColorOutput, PlanFormatter},
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sokoban_sat")]
#[command(about = "Bounded-horizon push-puzzle planner on a SAT solver")]
#[command(version = "0.1.0")]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the shortest plan for a puzzle
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file (overrides config)
        #[arg(short, long)]
        puzzle: Option<PathBuf>,

        /// Solve at exactly this horizon (overrides config, implies fixed search)
        #[arg(long, conflicts_with = "search")]
        horizon: Option<usize>,

        /// Largest horizon to try (overrides config)
        #[arg(long)]
        max_horizon: Option<usize>,

        /// Horizon search strategy (overrides config)
        #[arg(long, value_enum)]
        search: Option<HorizonSearch>,

        /// SAT backend (overrides config)
        #[arg(long, value_enum)]
        backend: Option<SolverBackend>,

        /// Goal policy (overrides config)
        #[arg(long, value_enum)]
        goal_policy: Option<GoalPolicy>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every intermediate state
        #[arg(long)]
        show_trajectory: bool,
    },

    /// Write the CNF for one horizon as DIMACS
    Encode {
        /// Puzzle file
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Horizon to encode
        #[arg(long)]
        horizon: usize,

        /// Goal policy
        #[arg(long, value_enum, default_value = "any-goal")]
        goal_policy: GoalPolicy,

        /// DIMACS output file
        #[arg(short, long, default_value = "output/encoding.cnf")]
        output: PathBuf,
    },

    /// Decode the output of an external DIMACS solver into moves
    Decode {
        /// Puzzle file the CNF was generated from
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Horizon the CNF was generated for
        #[arg(long)]
        horizon: usize,

        /// Solver output with `s` and `v` lines
        #[arg(short, long)]
        model: PathBuf,

        /// Goal policy the CNF was generated with
        #[arg(long, value_enum, default_value = "any-goal")]
        goal_policy: GoalPolicy,

        /// Print every intermediate state
        #[arg(long)]
        show_trajectory: bool,
    },

    /// Replay a move string against a puzzle
    Validate {
        /// Puzzle file
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Moves, e.g. "RRDW"
        #[arg(short, long)]
        moves: String,

        /// Goal policy
        #[arg(long, value_enum, default_value = "any-goal")]
        goal_policy: GoalPolicy,

        /// Print every intermediate state
        #[arg(long)]
        show_trajectory: bool,
    },

    /// Report encoding sizes for a puzzle
    Analyze {
        /// Puzzle file
        #[arg(short, long)]
        puzzle: PathBuf,

        /// Horizon to analyze
        #[arg(long, default_value = "10")]
        horizon: usize,

        /// Also generate the clauses and count them exactly
        #[arg(long)]
        exact: bool,
    },

    /// Solve a sudoku through the same SAT backends
    Sudoku {
        /// Sudoku file: digits, `.` or `0` for blanks
        #[arg(short, long)]
        file: PathBuf,

        /// SAT backend
        #[arg(long, value_enum, default_value = "cadical")]
        backend: SolverBackend,
    },

    /// Create example configuration and puzzle files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;

    match cli.command {
        Commands::Solve {
            config,
            puzzle,
            horizon,
            max_horizon,
            search,
            backend,
            goal_policy,
            output,
            show_trajectory,
        } => {
            let overrides = CliOverrides {
                horizon,
                max_horizon,
                search,
                backend,
                goal_policy,
                puzzle_file: puzzle,
                output_dir: output,
            };
            solve_command(config, overrides, show_trajectory)
        }
        Commands::Encode {
            puzzle,
            horizon,
            goal_policy,
            output,
        } => encode_command(puzzle, horizon, goal_policy, output),
        Commands::Decode {
            puzzle,
            horizon,
            model,
            goal_policy,
            show_trajectory,
        } => decode_command(puzzle, horizon, model, goal_policy, show_trajectory),
        Commands::Validate {
            puzzle,
            moves,
            goal_policy,
            show_trajectory,
        } => validate_command(puzzle, moves, goal_policy, show_trajectory),
        Commands::Analyze { puzzle, horizon, exact } => analyze_command(puzzle, horizon, exact),
        Commands::Sudoku { file, backend } => sudoku_command(file, backend),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn load_settings(config_path: &Path) -> Result<Settings> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "Config file {} not found, using defaults",
                config_path.display()
            ))
        );
        Ok(Settings::default())
    }
}

fn solve_command(config_path: PathBuf, overrides: CliOverrides, show_trajectory: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Starting push-puzzle planner"));

    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides);
    settings.output.show_trajectory |= show_trajectory;
    settings.validate().context("Configuration validation failed")?;

    debug!(?settings, "effective configuration");

    let start_time = Instant::now();
    let problem = PlanningProblem::new(settings.clone()).context("Failed to create planning problem")?;

    println!("Puzzle ({}x{}):", problem.grid().width, problem.grid().height);
    println!("{}", problem.grid());

    let outcome = problem.solve().context("Failed to solve planning problem")?;
    let total_time = start_time.elapsed();

    let solution = match outcome {
        PlanOutcome::Solved(solution) => solution,
        PlanOutcome::Unsatisfiable { horizons } => {
            println!(
                "{}",
                ColorOutput::warning(&format!(
                    "No plan exists for horizons {:?} ({:.3}s)",
                    horizons,
                    total_time.as_secs_f64()
                ))
            );
            return Ok(());
        }
    };

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Found a {}-step plan in {:.3}s",
            solution.horizon,
            total_time.as_secs_f64()
        ))
    );
    println!(
        "{}",
        PlanFormatter::format_solution(
            &solution,
            problem.grid(),
            settings.output.show_trajectory,
            settings.output.include_waits
        )
    );

    PlanFormatter::save_solution(
        &solution,
        problem.grid(),
        &settings.output.output_directory,
        settings.output.format,
        settings.output.include_waits,
    )
    .context("Failed to save plan")?;

    println!(
        "{}",
        ColorOutput::success(&format!("Plan saved to {}", settings.output.output_directory.display()))
    );

    Ok(())
}

fn encode_command(puzzle: PathBuf, horizon: usize, goal_policy: GoalPolicy, output: PathBuf) -> Result<()> {
    let grid = load_grid_from_file(&puzzle)?;
    let generator = ConstraintGenerator::new(&grid, horizon, goal_policy).context("Puzzle cannot be encoded")?;
    let cnf = generator.generate_all_constraints()?;

    write_dimacs(&cnf, &output)?;

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Wrote {} variables, {} clauses to {}",
            cnf.num_variables,
            cnf.len(),
            output.display()
        ))
    );
    Ok(())
}

fn decode_command(
    puzzle: PathBuf,
    horizon: usize,
    model_path: PathBuf,
    goal_policy: GoalPolicy,
    show_trajectory: bool,
) -> Result<()> {
    let grid = load_grid_from_file(&puzzle)?;
    let content = std::fs::read_to_string(&model_path)
        .with_context(|| format!("Failed to read solver output: {}", model_path.display()))?;

    let model = match parse_solver_output(&content)? {
        SolverOutput::Satisfiable(model) => model,
        SolverOutput::Unsatisfiable => {
            println!("{}", ColorOutput::warning(&format!("No plan of {} steps exists", horizon)));
            return Ok(());
        }
        SolverOutput::Unknown => anyhow::bail!("Solver did not decide the instance"),
    };

    let generator = ConstraintGenerator::new(&grid, horizon, goal_policy)?;
    let cnf = generator.generate_all_constraints()?;
    if !model.satisfies(&cnf.clauses) {
        anyhow::bail!("Model does not satisfy the {}-step encoding of {}", horizon, puzzle.display());
    }

    let trajectory = decode_trajectory(&model, &grid, generator.allocator(), horizon)?;
    let moves = moves_from_trajectory(&trajectory)?;

    let validation = PlanValidator::new(goal_policy).validate_with_trajectory(&grid, &moves.moves, &trajectory)?;
    if !validation.is_valid {
        anyhow::bail!(
            "Decoded plan fails replay: {}",
            validation.error_message.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    println!("Moves: {}", moves);
    if show_trajectory {
        for (t, state) in trajectory.states.iter().enumerate() {
            println!("t={}:", t);
            println!("{}", PlanFormatter::format_state(&grid, state));
        }
    }
    Ok(())
}

fn validate_command(puzzle: PathBuf, moves: String, goal_policy: GoalPolicy, show_trajectory: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Validating plan..."));

    let grid = load_grid_from_file(&puzzle)?;
    let moves = MoveSequence::parse(&moves).context("Moves may only contain U, D, L, R and W")?;

    let validator = PlanValidator::new(goal_policy);
    let result = validator.validate(&grid, &moves.moves)?;

    println!("{}", result);

    if show_trajectory {
        for (t, state) in result.states.iter().enumerate() {
            println!("t={}:", t);
            println!("{}", PlanFormatter::format_state(&grid, state));
        }
    }

    if result.is_valid {
        println!("{}", ColorOutput::success("Plan is valid"));
    } else {
        println!("{}", ColorOutput::error("Plan is invalid"));
    }

    Ok(())
}

fn analyze_command(puzzle: PathBuf, horizon: usize, exact: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Analyzing puzzle..."));

    let grid = load_grid_from_file(&puzzle)?;
    println!("{}", analyze_report(grid, horizon, exact)?);

    Ok(())
}

fn analyze_report(grid: Grid, horizon: usize, exact: bool) -> Result<String> {
    let mut report = String::new();
    report.push_str(&format!("Puzzle ({}x{}):\n", grid.width, grid.height));
    report.push_str(&PlanFormatter::format_state_with_coords(&grid, &grid.initial_state()));
    report.push_str(&format!("  Obstacles: {}\n", grid.obstacles().len()));
    report.push_str(&format!("  Objects: {}\n", grid.object_count()));
    report.push_str(&format!("  Goals: {}\n", grid.goals().len()));

    let allocator = VariableAllocator::new(grid.width, grid.height, horizon, grid.object_count())
        .context("Puzzle cannot be encoded at this horizon")?;
    report.push_str(&format!("\n{}", allocator.statistics()));

    let problem = PlanningProblem::with_grid(Settings::default(), grid)?;
    report.push_str(&format!("\n{}", problem.estimate_complexity(horizon)?));

    if exact {
        report.push_str(&format!("\n{}", problem.encoding_statistics(horizon)?));
    }

    Ok(report)
}

fn sudoku_command(file: PathBuf, backend: SolverBackend) -> Result<()> {
    let grid = load_sudoku_from_file(&file)?;
    println!("Puzzle ({}x{}, {} givens):", grid.size, grid.size, grid.given_count());
    println!("{}", grid);

    let mut oracle = create_oracle(backend);
    match solve_sudoku(&grid, oracle.as_mut())? {
        Some(solution) => {
            println!("{}", ColorOutput::success("Solved:"));
            println!("{}", solution);
        }
        None => println!("{}", ColorOutput::warning("The givens admit no solution")),
    }
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let input_dir = directory.join("input/puzzles");
    let sudoku_dir = directory.join("input/sudoku");
    let output_dir = directory.join("output/plans");

    for dir in [&config_dir, &input_dir, &sudoku_dir, &output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_puzzles(&input_dir).context("Failed to create example puzzles")?;
    println!("Created example puzzles in: {}", input_dir.display());

    create_example_sudoku(&sudoku_dir).context("Failed to create example sudoku")?;
    println!("Created example sudoku in: {}", sudoku_dir.display());

    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)?;

    let mut parallel_config = Settings::default();
    parallel_config.planning.search = HorizonSearch::Parallel;
    parallel_config.planning.max_horizon = 16;
    parallel_config.input.puzzle_file = PathBuf::from("input/puzzles/room.txt");
    parallel_config.to_file(&examples_dir.join("room_parallel.yaml"))?;

    let mut matched_config = Settings::default();
    matched_config.planning.goal_policy = GoalPolicy::Matched;
    matched_config.solver.backend = SolverBackend::Varisat;
    matched_config.input.puzzle_file = PathBuf::from("input/puzzles/two_step.txt");
    matched_config.to_file(&examples_dir.join("matched_varisat.yaml"))?;

    println!("Created example configurations in: {}", examples_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your puzzles to {}", input_dir.display());
    println!("3. Run: cargo run -- solve --config config/default.yaml");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "sokoban_sat",
            "solve",
            "--config",
            "test.yaml",
            "--max-horizon",
            "5",
            "--search",
            "parallel",
            "--backend",
            "varisat",
        ]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["sokoban_sat", "-v", "encode", "--puzzle", "p.txt", "--horizon", "3"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["sokoban_sat", "solve", "--search", "sideways"]);
        assert!(cli.is_err());

        // a fixed horizon and a search strategy cannot both be given
        let cli = Cli::try_parse_from(["sokoban_sat", "solve", "--horizon", "4", "--search", "parallel"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        let result = setup_command(temp_dir.path().to_path_buf(), false);

        assert!(result.is_ok());
        assert!(temp_dir.path().join("config/default.yaml").exists());
        assert!(temp_dir.path().join("input/puzzles/corridor.txt").exists());
        assert!(temp_dir.path().join("input/sudoku/classic.txt").exists());
    }

    #[test]
    fn test_encode_then_decode_commands() {
        let temp_dir = tempdir().unwrap();
        let puzzle = temp_dir.path().join("corridor.txt");
        std::fs::write(&puzzle, "PBG\n").unwrap();
        let cnf = temp_dir.path().join("out/corridor.cnf");

        encode_command(puzzle.clone(), 1, GoalPolicy::AnyGoal, cnf.clone()).unwrap();
        assert!(std::fs::read_to_string(&cnf).unwrap().contains("p cnf"));

        let unsat = temp_dir.path().join("unsat.out");
        std::fs::write(&unsat, "s UNSATISFIABLE\n").unwrap();
        assert!(decode_command(puzzle.clone(), 1, unsat, GoalPolicy::AnyGoal, false).is_ok());

        let unknown = temp_dir.path().join("unknown.out");
        std::fs::write(&unknown, "s UNKNOWN\n").unwrap();
        assert!(decode_command(puzzle, 1, unknown, GoalPolicy::AnyGoal, false).is_err());
    }

    #[test]
    fn test_decode_checks_external_models() {
        let temp_dir = tempdir().unwrap();
        let puzzle = temp_dir.path().join("corridor.txt");
        std::fs::write(&puzzle, "P.BG\n").unwrap();

        // T=2: actor 1 -> 2 -> 3, object 3 -> 3 -> 4
        let good = temp_dir.path().join("good.out");
        std::fs::write(&good, "s SATISFIABLE\nv 1 6 11 15 19 24 0\n").unwrap();
        assert!(decode_command(puzzle.clone(), 2, good, GoalPolicy::AnyGoal, false).is_ok());

        // T=1: the actor waits and the object never reaches the goal
        let bad = temp_dir.path().join("bad.out");
        std::fs::write(&bad, "s SATISFIABLE\nv 1 5 11 15 0\n").unwrap();
        let err = decode_command(puzzle, 1, bad, GoalPolicy::AnyGoal, false).unwrap_err();
        assert!(err.to_string().contains("does not satisfy"));
    }

    #[test]
    fn test_analyze_report() {
        let grid = sokoban_sat::puzzle::parse_grid_from_string("P.BG").unwrap();
        let report = analyze_report(grid, 2, true).unwrap();

        assert!(report.contains("Objects: 1"));
        // 4 cells * 3 time steps * (actor + 1 object)
        assert!(report.contains("Total variables: 24"));
        assert!(report.contains("Actor variables: 12"));
    }
}
