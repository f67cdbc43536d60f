use clap::{Parser, Subcommand};
use jsonlogic_sql::cli::{self, CliError, TranspileOptions};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsonlogic2sql")]
#[command(about = "jsonlogic2sql - Compile JSON Logic rules into SQL WHERE conditions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON Logic expression to SQL
    Transpile {
        /// The JSON Logic expression (reads from stdin if not provided)
        expression: Option<String>,

        /// Target dialect: bigquery, spanner, postgresql, duckdb, clickhouse
        #[arg(short, long, default_value = "bigquery")]
        dialect: String,

        /// Schema file (JSON array of {name, type, allowedValues?})
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Print the bare condition without the WHERE prefix
        #[arg(short, long)]
        condition: bool,

        /// Maximum expression nesting depth
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'jsonlogic2sql docs' to list categories)
        category: String,
    },

    /// List dialects and compare their renderings
    Dialects,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transpile {
            expression,
            dialect,
            schema,
            condition,
            max_depth,
        } => run_transpile(expression, dialect, schema, condition, max_depth),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
        Commands::Dialects => {
            print!("{}", cli::get_dialects_overview());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn run_transpile(
    expression: Option<String>,
    dialect: String,
    schema: Option<PathBuf>,
    condition: bool,
    max_depth: Option<usize>,
) -> Result<(), CliError> {
    let expression = match expression {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };

    let options = TranspileOptions {
        expression,
        dialect,
        schema,
        condition,
        max_depth,
    };

    println!("{}", cli::execute_transpile(&options)?);
    Ok(())
}
