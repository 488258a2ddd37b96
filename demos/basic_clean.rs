//! Basic example demonstrating a cleaning run.
//!
//! This example shows how to:
//! 1. Build a presence matrix
//! 2. Profile the missing data
//! 3. Step through threshold elimination
//! 4. Run the full cleaner and examine the report

use presence_clean::prelude::*;

fn main() -> Result<()> {
    println!("=== Missing-Data Cleaning Example ===\n");

    let matrix = create_example_matrix()?;
    println!("Data dimensions:");
    println!("  Rows:    {}", matrix.n_rows());
    println!("  Columns: {}", matrix.n_cols());
    println!();

    // Profile the data
    println!("=== Data Profiling ===\n");
    let profile = profile_missingness(&matrix);
    print!("{}", profile);
    println!("  Rows over 10%:     {}", profile.rows_over(0.1));
    println!("  Columns over 10%:  {}", profile.cols_over(0.1));
    println!();

    // Watch the elimination heuristic one step at a time
    println!("=== Threshold Elimination (10%) ===\n");
    let mut solver = ThresholdEliminationSolver::new(&matrix, 0.1)?;
    while let Some(removal) = solver.step()? {
        println!(
            "  step {:>2}: removed {:?} {:?} ({:?})",
            solver.n_steps(),
            removal.axis,
            removal.removed,
            removal.trigger
        );
    }
    println!(
        "  kept {} rows x {} columns",
        solver.n_rows_kept(),
        solver.n_cols_kept()
    );
    println!();

    // Zero budget: both heuristics run and the larger block wins
    println!("=== Cleaner (0%) ===\n");
    let outcome = Cleaner::new().name("example").run(&matrix)?;
    print!("{}", outcome.report);
    println!();
    println!("Kept rows:    {:?}", outcome.solution.kept_rows().collect::<Vec<_>>());
    println!("Kept columns: {:?}", outcome.solution.kept_cols().collect::<Vec<_>>());

    Ok(())
}

/// 12 rows × 8 columns with a few bad rows and one bad column.
fn create_example_matrix() -> Result<PresenceMatrix> {
    let mut missing = vec![(2, 0), (2, 3), (2, 5), (7, 1), (7, 6), (10, 4)];
    // Column 7 is missing in every fourth row
    missing.extend((0..12).step_by(4).map(|i| (i, 7)));
    PresenceMatrix::from_missing_cells(12, 8, &missing)
}
