use sokoban_sat::config::{GoalPolicy, HorizonSearch, Settings, SolverBackend};
use sokoban_sat::plan::{PlanOutcome, PlanValidator, PlanningProblem};
use sokoban_sat::puzzle::{parse_grid_from_string, Cell, Grid, Move, PushRules};
use sokoban_sat::sat::{
    decode_trajectory, encode, moves_from_trajectory, parse_dimacs, to_dimacs, AttemptOutcome,
    ConstraintGenerator, SatEncoder, SatSolver,
};

fn settings(search: HorizonSearch, max_horizon: usize) -> Settings {
    let mut settings = Settings::default();
    settings.planning.search = search;
    settings.planning.min_horizon = 1;
    settings.planning.max_horizon = max_horizon;
    settings
}

fn room() -> Grid {
    parse_grid_from_string("#####\n#P..#\n#.B.#\n#..G#\n#####").unwrap()
}

#[test]
fn push_moves_object_onto_goal() {
    let grid = parse_grid_from_string("P.BG").unwrap();
    let problem = PlanningProblem::with_grid(settings(HorizonSearch::Incremental, 5), grid).unwrap();

    let PlanOutcome::Solved(solution) = problem.solve().unwrap() else {
        panic!("corridor should be solvable");
    };

    assert_eq!(solution.horizon, 2);
    assert_eq!(solution.moves.to_string(), "RR");
    assert_eq!(solution.metadata.unsatisfiable_horizons, vec![1]);
    assert_eq!(solution.final_state().unwrap().objects, vec![Cell::new(4, 1)]);
}

#[test]
fn object_against_boundary_never_moves() {
    let grid = parse_grid_from_string("GPB").unwrap();
    let problem = PlanningProblem::with_grid(settings(HorizonSearch::Incremental, 4), grid).unwrap();

    match problem.solve().unwrap() {
        PlanOutcome::Unsatisfiable { horizons } => assert_eq!(horizons, vec![1, 2, 3, 4]),
        PlanOutcome::Solved(solution) => panic!("unexpected plan {}", solution.moves),
    }
}

#[test]
fn unreachable_object_stays_put_in_every_model() {
    let grid = parse_grid_from_string("P.#\n###\nG*G").unwrap();
    let generator = ConstraintGenerator::new(&grid, 3, GoalPolicy::AnyGoal).unwrap();
    let cnf = generator.generate_all_constraints().unwrap();

    let mut solver = SatSolver::new();
    solver.add_clauses(&cnf.clauses).unwrap();
    let models = solver.solve_multiple(20).unwrap();

    // the actor toggles or waits between its two cells at each of 3 steps
    assert_eq!(models.len(), 8);
    for model in &models {
        assert!(model.satisfies(&cnf.clauses));
        let trajectory = decode_trajectory(model, &grid, generator.allocator(), 3).unwrap();
        for state in &trajectory.states {
            assert_eq!(state.objects, vec![Cell::new(2, 3)]);
        }
        let moves = moves_from_trajectory(&trajectory).unwrap();
        assert_eq!(moves.len(), 3);
    }
}

#[test]
fn every_model_places_each_entity_exactly_once() {
    let grid = room();
    let generator = ConstraintGenerator::new(&grid, 5, GoalPolicy::AnyGoal).unwrap();
    let cnf = generator.generate_all_constraints().unwrap();

    let mut solver = SatSolver::new();
    solver.add_clauses(&cnf.clauses).unwrap();
    let model = solver.solve().unwrap().expect("room is solvable in 5 steps");

    let allocator = generator.allocator();
    for t in 0..=5 {
        let actor_cells = grid
            .cells()
            .filter(|&cell| model.value(allocator.actor(cell, t).unwrap()))
            .count();
        let object_cells = grid
            .cells()
            .filter(|&cell| model.value(allocator.object(0, cell, t).unwrap()))
            .count();
        assert_eq!(actor_cells, 1, "actor at t={}", t);
        assert_eq!(object_cells, 1, "object at t={}", t);
    }
}

#[test]
fn incremental_finds_minimal_horizon() {
    let problem = PlanningProblem::with_grid(settings(HorizonSearch::Incremental, 8), room()).unwrap();
    let solution = problem.solve().unwrap().solution().cloned().unwrap();

    assert_eq!(solution.horizon, 5);
    assert_eq!(solution.metadata.unsatisfiable_horizons, vec![1, 2, 3, 4]);

    let encoder = SatEncoder::new(Settings::default(), room());
    for horizon in 1..5 {
        assert!(matches!(encoder.attempt(horizon).unwrap(), AttemptOutcome::Unsatisfiable));
    }
}

#[test]
fn parallel_and_incremental_agree() {
    let incremental = PlanningProblem::with_grid(settings(HorizonSearch::Incremental, 8), room())
        .unwrap()
        .solve()
        .unwrap();
    let parallel = PlanningProblem::with_grid(settings(HorizonSearch::Parallel, 8), room())
        .unwrap()
        .solve()
        .unwrap();

    let (a, b) = (incremental.solution().unwrap(), parallel.solution().unwrap());
    assert_eq!(a.horizon, b.horizon);
    assert_eq!(a.final_state().unwrap().objects, b.final_state().unwrap().objects);

    let validator = PlanValidator::new(GoalPolicy::AnyGoal);
    assert!(validator.quick_validate(&room(), &b.moves.moves));
}

#[test]
fn varisat_backend_plans_the_same_corridor() {
    let mut config = settings(HorizonSearch::Incremental, 4);
    config.solver.backend = SolverBackend::Varisat;

    let grid = parse_grid_from_string("P.BG").unwrap();
    let outcome = PlanningProblem::with_grid(config, grid).unwrap().solve().unwrap();
    assert_eq!(outcome.solution().unwrap().moves.to_string(), "RR");
}

#[test]
fn matched_policy_routes_objects_to_their_own_goals() {
    let grid = parse_grid_from_string("....\nPB.G\n.B.G\n....").unwrap();
    let mut config = settings(HorizonSearch::Incremental, 12);
    config.planning.goal_policy = GoalPolicy::Matched;

    let outcome = PlanningProblem::with_grid(config, grid.clone()).unwrap().solve().unwrap();
    let solution = outcome.solution().expect("matched layout is solvable");
    let final_state = solution.final_state().unwrap();
    assert_eq!(final_state.objects, grid.goals().to_vec());
}

#[test]
fn dimacs_text_round_trips_the_encoding() {
    let grid = parse_grid_from_string("P.BG").unwrap();
    let cnf = encode(&grid, 2).unwrap();
    let parsed = parse_dimacs(&to_dimacs(&cnf)).unwrap();

    assert_eq!(parsed.num_variables, cnf.num_variables);
    assert_eq!(parsed.len(), cnf.len());

    let mut solver = SatSolver::new();
    solver.add_clauses(&parsed.clauses).unwrap();
    let model = solver.solve().unwrap().unwrap();
    assert!(model.satisfies(&cnf.clauses));

    let generator = ConstraintGenerator::new(&grid, 2, GoalPolicy::AnyGoal).unwrap();
    let trajectory = decode_trajectory(&model, &grid, generator.allocator(), 2).unwrap();
    let moves = moves_from_trajectory(&trajectory).unwrap();
    let replayed = PushRules::replay(&grid, &moves.moves).unwrap();
    assert_eq!(replayed, trajectory.states);
    assert_eq!(moves.moves, vec![Move::Right, Move::Right]);
}
