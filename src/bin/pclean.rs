//! pclean - missing-data cleaning CLI
//!
//! Command-line interface for dropping rows and columns of a table until the
//! remaining cells meet a missing-data budget.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use presence_clean::data::{CleanSolution, DataTable, MissingData};
use presence_clean::error::Result;
use presence_clean::pipeline::{CleanConfig, Cleaner};
use presence_clean::profile::profile_missingness;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Output format for reports
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

/// Drop rows and columns with missing data
#[derive(Parser)]
#[command(name = "pclean")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Table layout shared by every subcommand that reads a table
#[derive(clap::Args, Debug, Clone)]
struct TableArgs {
    /// Path to the input table (tab-separated)
    #[arg(short, long)]
    input: PathBuf,

    /// Token marking a missing cell
    #[arg(long)]
    na: Option<String>,

    /// Number of header rows
    #[arg(long)]
    header_rows: Option<usize>,

    /// Number of header columns
    #[arg(long)]
    header_cols: Option<usize>,
}

impl TableArgs {
    fn apply_to(&self, config: &mut CleanConfig) {
        if let Some(na) = &self.na {
            config.na_symbol = na.clone();
        }
        if let Some(rows) = self.header_rows {
            config.header_rows = rows;
        }
        if let Some(cols) = self.header_cols {
            config.header_cols = cols;
        }
    }

    /// Default configuration with the table flags applied and checked
    fn config(&self) -> Result<CleanConfig> {
        let mut config = CleanConfig::default();
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn load(&self, config: &CleanConfig) -> Result<DataTable> {
        eprintln!("Loading table from {:?}...", self.input);
        let table = DataTable::from_tsv(
            &self.input,
            &config.na_symbol,
            config.header_rows,
            config.header_cols,
        )?;
        eprintln!("Loaded {} rows x {} columns", table.n_rows(), table.n_cols());
        Ok(table)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a table
    Clean {
        #[command(flatten)]
        table: TableArgs,

        /// Cleaning configuration YAML; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Largest missing fraction allowed in a kept row or column
        #[arg(short = 'g', long)]
        max_missing: Option<f64>,

        /// Minimum number of rows to keep
        #[arg(long)]
        min_rows: Option<usize>,

        /// Minimum number of columns to keep
        #[arg(long)]
        min_cols: Option<usize>,

        /// Directory for the cleaned table and solution file
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// CSV file collecting one summary line per run
        #[arg(long, default_value = "clean_summary.csv")]
        summary: PathBuf,

        /// Format of the report printed to stdout
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Profile the missing data of a table
    Profile {
        #[command(flatten)]
        table: TableArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply an existing solution file to a table
    Apply {
        #[command(flatten)]
        table: TableArgs,

        /// Solution file written by `pclean clean`
        #[arg(short, long)]
        solution: PathBuf,

        /// Output path for the cleaned table
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a table transposed
    Transpose {
        #[command(flatten)]
        table: TableArgs,

        /// Output path for the transposed table
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a table with data cells replaced by 1 (present) or 0 (missing)
    Binary {
        #[command(flatten)]
        table: TableArgs,

        /// Output path for the presence table
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an example configuration file
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "clean.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Clean {
            table,
            config,
            max_missing,
            min_rows,
            min_cols,
            output_dir,
            summary,
            format,
        } => cmd_clean(
            &table,
            config.as_deref(),
            max_missing,
            min_rows,
            min_cols,
            &output_dir,
            &summary,
            format,
        ),

        Commands::Profile { table, format } => cmd_profile(&table, format),

        Commands::Apply {
            table,
            solution,
            output,
        } => cmd_apply(&table, &solution, &output),

        Commands::Transpose { table, output } => cmd_transpose(&table, &output),

        Commands::Binary { table, output } => cmd_binary(&table, &output),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Clean a table and write the kept cells and solution
#[allow(clippy::too_many_arguments)]
fn cmd_clean(
    table_args: &TableArgs,
    config_path: Option<&Path>,
    max_missing: Option<f64>,
    min_rows: Option<usize>,
    min_cols: Option<usize>,
    output_dir: &Path,
    summary_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            eprintln!("Loading configuration from {:?}...", path);
            CleanConfig::from_yaml_file(path)?
        }
        None => CleanConfig::default(),
    };
    table_args.apply_to(&mut config);
    if let Some(max_missing) = max_missing {
        config.max_missing = max_missing;
    }
    if let Some(min_rows) = min_rows {
        config.min_rows = min_rows;
    }
    if let Some(min_cols) = min_cols {
        config.min_cols = min_cols;
    }
    config.validate()?;

    let table = table_args.load(&config)?;
    let matrix = table.presence()?;
    let profile = profile_missingness(&matrix);
    eprintln!(
        "  {} missing cells ({:.2}%)",
        profile.missing_cells,
        profile.missing_fraction * 100.0
    );

    eprintln!(
        "Cleaning with budget {:.2}% and floors {} x {}...",
        config.max_missing * 100.0,
        config.min_rows,
        config.min_cols
    );
    let start = Instant::now();
    let outcome = Cleaner::from_config(&config).run(&matrix)?;
    let seconds = start.elapsed().as_secs_f64();

    let solution = &outcome.solution;
    let n_valid = solution.n_valid_kept(&matrix)?;

    let stem = table_args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let base = format!("{}_gamma_{:.2}", stem, config.max_missing);
    std::fs::create_dir_all(output_dir)?;
    let cleaned_path = output_dir.join(format!("{}_cleaned.tsv", base));
    let solution_path = output_dir.join(format!("{}_cleaned.sol", base));

    eprintln!("Writing cleaned table to {:?}...", cleaned_path);
    table.write_tsv(&cleaned_path, solution)?;
    solution.write_to_file(&solution_path)?;
    append_summary(
        summary_path,
        &table_args.input,
        config.max_missing,
        seconds,
        n_valid,
        solution,
    )?;

    eprintln!(
        "Done! Kept {} ({} valid cells, {}) in {:.3}s",
        solution, n_valid, outcome.report.chosen, seconds
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome.report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&outcome.report)?),
        OutputFormat::Text => print!("{}", outcome.report),
    }

    Ok(())
}

/// Append one `data_file,max_missing,seconds,valid_cells,rows,cols` line
fn append_summary(
    path: &Path,
    data_file: &Path,
    max_missing: f64,
    seconds: f64,
    n_valid: usize,
    solution: &CleanSolution,
) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(&[
        data_file.display().to_string(),
        format!("{:.6}", max_missing),
        format!("{:.6}", seconds),
        n_valid.to_string(),
        solution.n_rows_kept().to_string(),
        solution.n_cols_kept().to_string(),
    ])?;
    writer.flush()?;
    Ok(())
}

/// Print the missingness profile of a table
fn cmd_profile(table_args: &TableArgs, format: OutputFormat) -> Result<()> {
    let config = table_args.config()?;
    let table = table_args.load(&config)?;
    let profile = profile_missingness(&table);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&profile)?),
        OutputFormat::Text => print!("{}", profile),
    }

    Ok(())
}

/// Write the cells of a table kept by a solution file
fn cmd_apply(table_args: &TableArgs, solution_path: &Path, output_path: &Path) -> Result<()> {
    let config = table_args.config()?;
    let table = table_args.load(&config)?;

    eprintln!("Loading solution from {:?}...", solution_path);
    let solution = CleanSolution::read_from_file(solution_path, table.n_rows(), table.n_cols())?;

    eprintln!("Writing cleaned table to {:?}...", output_path);
    table.write_tsv(output_path, &solution)?;
    eprintln!(
        "Done! Kept {} ({} valid cells)",
        solution,
        solution.n_valid_kept(&table)?
    );

    Ok(())
}

/// Write a table with rows and columns swapped
fn cmd_transpose(table_args: &TableArgs, output_path: &Path) -> Result<()> {
    let config = table_args.config()?;
    let table = table_args.load(&config)?;

    eprintln!("Writing transposed table to {:?}...", output_path);
    table.write_transposed_tsv(output_path)?;

    Ok(())
}

/// Write the presence table of a table as 1/0 cells
fn cmd_binary(table_args: &TableArgs, output_path: &Path) -> Result<()> {
    let config = table_args.config()?;
    let table = table_args.load(&config)?;

    eprintln!("Writing presence table to {:?}...", output_path);
    table.write_binary_tsv(output_path)?;

    Ok(())
}

/// Generate example cleaning configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let config = CleanConfig {
        name: "example-clean".to_string(),
        description: Some(
            "Keep rows and columns with at most 10% missing data, never fewer than 5 of each"
                .to_string(),
        ),
        max_missing: 0.1,
        min_rows: 5,
        min_cols: 5,
        ..CleanConfig::default()
    };
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
