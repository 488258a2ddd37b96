//! Integration tests for the table cleaning pipeline.

use nalgebra::DMatrix;
use presence_clean::prelude::*;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// Write a synthetic table with a known missingness pattern.
///
/// 30 rows × 12 columns with one header row and one header column:
/// - Rows 0-19: sparse random noise (about 3% missing)
/// - Rows 20-24: half their cells missing
/// - Column 11: missing in every third row
fn create_synthetic_table() -> NamedTempFile {
    let n_rows = 30;
    let n_cols = 12;

    let mut rng_seed = 42u64;
    let simple_rand = |seed: &mut u64| -> f64 {
        *seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        ((*seed >> 16) & 0x7FFF) as f64 / 32768.0
    };

    let mut file = NamedTempFile::new().unwrap();
    let header: Vec<String> = (0..n_cols).map(|j| format!("sample_{}", j)).collect();
    writeln!(file, "id\t{}", header.join("\t")).unwrap();

    for i in 0..n_rows {
        let mut fields = vec![format!("gene_{}", i)];
        for j in 0..n_cols {
            let missing = match i {
                20..=24 => j % 2 == 0,
                _ if j == 11 => i % 3 == 0,
                _ => simple_rand(&mut rng_seed) < 0.03,
            };
            if missing {
                fields.push("NA".to_string());
            } else {
                fields.push(format!("{:.2}", 10.0 * simple_rand(&mut rng_seed)));
            }
        }
        writeln!(file, "{}", fields.join("\t")).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_clean_synthetic_table() {
    let file = create_synthetic_table();
    let table = DataTable::from_tsv(file.path(), "NA", 1, 1).unwrap();
    let matrix = table.presence().unwrap();
    assert_eq!(matrix.n_rows(), 30);
    assert_eq!(matrix.n_cols(), 12);

    for max_missing in [0.0, 0.05, 0.2] {
        let outcome = Cleaner::new().max_missing(max_missing).run(&matrix).unwrap();
        let solution = &outcome.solution;

        assert!(solution.max_missing_fraction(&matrix).unwrap() <= max_missing + 1e-12);
        assert!(solution.n_rows_kept() > 0);
        assert_eq!(
            outcome.report.chosen_summary().unwrap().n_valid_kept,
            solution.n_valid_kept(&matrix).unwrap()
        );

        // The half-missing rows never survive a tight budget
        for i in 20..25 {
            assert!(!solution.rows_to_keep()[i] || solution.n_cols_kept() <= 6);
        }
    }
}

#[test]
fn test_table_and_matrix_agree() {
    let file = create_synthetic_table();
    let table = DataTable::from_tsv(file.path(), "NA", 1, 1).unwrap();
    let matrix = table.presence().unwrap();

    // The solvers accept the table directly
    let from_table = ThresholdEliminationSolver::new(&table, 0.1)
        .unwrap()
        .solve()
        .unwrap();
    let from_matrix = ThresholdEliminationSolver::new(&matrix, 0.1)
        .unwrap()
        .solve()
        .unwrap();
    assert_eq!(from_table, from_matrix);

    let profile = profile_missingness(&table);
    assert_eq!(profile.valid_cells, matrix.n_valid());
    assert_eq!(profile.rows_over(0.4), 5);
}

#[test]
fn test_written_outputs_reload() {
    let file = create_synthetic_table();
    let table = DataTable::from_tsv(file.path(), "NA", 1, 1).unwrap();
    let matrix = table.presence().unwrap();
    let outcome = Cleaner::new().max_missing(0.1).run(&matrix).unwrap();

    let dir = tempdir().unwrap();
    let cleaned_path = dir.path().join("cleaned.tsv");
    let sol_path = dir.path().join("cleaned.sol");
    table.write_tsv(&cleaned_path, &outcome.solution).unwrap();
    outcome.solution.write_to_file(&sol_path).unwrap();

    let cleaned = DataTable::from_tsv(&cleaned_path, "NA", 1, 1).unwrap();
    assert_eq!(cleaned.n_rows(), outcome.solution.n_rows_kept());
    assert_eq!(cleaned.n_cols(), outcome.solution.n_cols_kept());
    assert_eq!(
        cleaned.presence().unwrap().n_valid(),
        outcome.solution.n_valid_kept(&matrix).unwrap()
    );

    let reloaded = CleanSolution::read_from_file(&sol_path, 30, 12).unwrap();
    assert_eq!(reloaded, outcome.solution);

    // Applying the reloaded solution reproduces the cleaned table
    let applied_path = dir.path().join("applied.tsv");
    table.write_tsv(&applied_path, &reloaded).unwrap();
    assert_eq!(
        std::fs::read_to_string(&applied_path).unwrap(),
        std::fs::read_to_string(&cleaned_path).unwrap()
    );
}

#[test]
fn test_solution_file_wrong_table() {
    let file = create_synthetic_table();
    let table = DataTable::from_tsv(file.path(), "NA", 1, 1).unwrap();
    let outcome = Cleaner::new().run(&table).unwrap();

    let sol_file = NamedTempFile::new().unwrap();
    outcome.solution.write_to_file(sol_file.path()).unwrap();
    let err = CleanSolution::read_from_file(sol_file.path(), 31, 12).unwrap_err();
    assert!(matches!(err, CleanError::DimensionMismatch { .. }));
}

#[test]
fn test_config_driven_run() {
    let yaml = "name: floors\nmax_missing: 0.0\nmin_rows: 25\nmin_cols: 1\n";
    let config = CleanConfig::from_yaml(yaml).unwrap();

    let file = create_synthetic_table();
    let table = DataTable::from_tsv(
        file.path(),
        &config.na_symbol,
        config.header_rows,
        config.header_cols,
    )
    .unwrap();

    let outcome = Cleaner::from_config(&config).run(&table).unwrap();
    assert_eq!(outcome.report.name, "floors");
    assert!(outcome.solution.n_rows_kept() >= 25);
    assert_eq!(outcome.solution.max_missing_fraction(&table).unwrap(), 0.0);
}

#[test]
fn test_infeasible_floors() {
    let file = create_synthetic_table();
    let table = DataTable::from_tsv(file.path(), "NA", 1, 1).unwrap();
    let result = Cleaner::new().floors(30, 12).run(&table);
    assert!(matches!(result, Err(CleanError::InfeasibleFloor { .. })));
}

#[test]
fn test_dense_and_sparse_inputs() {
    let dense = DMatrix::from_row_slice(
        3,
        3,
        &[1.0, f64::NAN, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
    );
    let matrix = PresenceMatrix::from_dense(&dense);
    let solution = clean_matrix(&matrix, 0.0).unwrap();
    assert_eq!(solution.n_valid_kept(&matrix).unwrap(), 6);

    let sparse = matrix.to_sparse();
    let from_sparse = PresenceMatrix::from_sparse(&sparse);
    assert_eq!(clean_matrix(&from_sparse, 0.0).unwrap(), solution);
}

#[test]
fn test_stepwise_matches_solve() {
    let file = create_synthetic_table();
    let table = DataTable::from_tsv(file.path(), "NA", 1, 1).unwrap();
    let params = EliminationParams::new(0.05);

    let mut state = EliminationState::new(&table);
    let mut n_steps = 0;
    while let Some(removal) = elimination_step(&table, &params, &mut state).unwrap() {
        assert!(!removal.removed.is_empty());
        assert!(state.counters_consistent(&table));
        n_steps += 1;
    }

    let mut solver = ThresholdEliminationSolver::from_params(&table, params).unwrap();
    let solved = solver.solve().unwrap();
    assert_eq!(state.to_solution(), solved);
    assert_eq!(solver.n_steps(), n_steps);
}
