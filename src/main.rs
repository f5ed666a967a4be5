use clap::{Parser as ClapParser, Subcommand};
use sqlpath::cli::{self, CliError, Operation, RunOptions, RunOutput};
use std::io::{self, Read};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(ClapParser)]
#[command(name = "sqlpath")]
#[command(about = "sqlpath - Evaluate SQL/JSON path expressions against JSON")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RunArgs {
    /// The path statement, e.g. 'strict $.items[*].id'
    path: String,

    /// JSON input (reads from stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Treat each non-blank input line as a separate item
    #[arg(long)]
    lines: bool,

    /// Bind a variable, NAME=JSON (repeatable)
    #[arg(long = "var", value_name = "NAME=JSON")]
    variables: Vec<String>,

    /// Value to emit for an item that yields nothing
    #[arg(long, value_name = "JSON")]
    default_on_empty: Option<String>,

    /// Value to emit for an item that fails before yielding anything
    #[arg(long, value_name = "JSON")]
    default_on_error: Option<String>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every value the path yields
    Value(RunArgs),

    /// Print true or false per input item
    Exists(RunArgs),

    /// Print the input items the path matches
    Query(RunArgs),

    /// Only validate syntax, don't execute
    Check {
        /// The path statement to validate
        path: String,
    },
}

fn install_tracing_subscriber() {
    let filter = EnvFilter::try_from_env("SQLPATH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

fn main() {
    install_tracing_subscriber();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Value(args) => run(args, Operation::Value),
        Commands::Exists(args) => run(args, Operation::Exists),
        Commands::Query(args) => run(args, Operation::Query),
        Commands::Check { path } => cli::execute_check(&path).map(|mode| {
            println!("Syntax is valid ({mode} mode)");
            true
        }),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Runs the statement and prints one JSON value per line; `Ok(false)` when
/// any item failed.
fn run(args: RunArgs, operation: Operation) -> Result<bool, CliError> {
    let input = match args.input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = RunOptions {
        path: args.path,
        input,
        lines: args.lines,
        variables: args.variables,
        default_on_empty: args.default_on_empty,
        default_on_error: args.default_on_error,
        operation,
    };

    let mut ok = true;
    for output in cli::execute(&options)? {
        match output {
            RunOutput::Value(value) => {
                let json = if args.pretty {
                    serde_json::to_string_pretty(&value)
                } else {
                    serde_json::to_string(&value)
                }?;
                println!("{}", json);
            }
            RunOutput::Error(e) => {
                eprintln!("error: {}", e);
                ok = false;
            }
        }
    }
    Ok(ok)
}
