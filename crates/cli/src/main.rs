//! Dossier CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Run the research agent on one instruction or interactively
//! - `tools`    — List the registered tools
//! - `preview`  — Run a single tool directly, without the model
//! - `config`   — Show the default configuration or validate the current one

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "dossier",
    about = "Dossier — a research assistant agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent
    Run {
        /// Run a single instruction instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override the iteration budget
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Suppress the step-by-step progress trace
        #[arg(short, long)]
        quiet: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered tools
    Tools,

    /// Run one tool directly
    Preview {
        #[arg(value_enum)]
        tool: commands::preview::PreviewTool,

        /// Tool input (company name or document text)
        input: String,
    },

    /// Show or validate configuration
    Config {
        /// Load and validate the current configuration instead of printing defaults
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Run {
            message,
            max_iterations,
            quiet,
            json,
        } => commands::run::run(message, max_iterations, quiet, json).await?,
        Commands::Tools => commands::tools::run()?,
        Commands::Preview { tool, input } => commands::preview::run(tool, &input).await?,
        Commands::Config { validate } => {
            if validate {
                commands::config_cmd::validate()?
            } else {
                commands::config_cmd::show_default()
            }
        }
    }

    Ok(())
}
