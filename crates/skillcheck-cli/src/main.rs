//! skillcheck CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "skillcheck", version, about = "Timed coding and quiz assessments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported languages and their judge ids
    Languages,

    /// Validate assessment catalog TOML files
    Validate {
        /// Path to a catalog file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Grade a source file against a coding question's test cases
    Grade {
        /// Catalog file containing the question
        #[arg(long)]
        catalog: PathBuf,

        /// Question id
        #[arg(long)]
        question: u32,

        /// Source file to submit
        #[arg(long)]
        source: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a source file once against custom input, without grading
    Run {
        /// Language name (e.g. "python")
        #[arg(long)]
        language: String,

        /// Source file to run
        #[arg(long)]
        source: PathBuf,

        /// Text passed on stdin
        #[arg(long, default_value = "")]
        stdin: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take an assessment with answers read from a TOML answer sheet
    Take {
        /// Catalog file of the assessment
        #[arg(long)]
        catalog: PathBuf,

        /// Answer sheet (`[answers]` table keyed by question id)
        #[arg(long)]
        answers: PathBuf,

        /// Override the time budget, in seconds
        #[arg(long)]
        time_limit: Option<u64>,

        /// Write the result JSON here
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example catalog
    Init,
}

#[tokio::main]
async fn main() {
    let filter = match "skillcheck=info".parse() {
        Ok(directive) => tracing_subscriber::EnvFilter::from_default_env().add_directive(directive),
        Err(_) => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Languages => commands::languages::execute(),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Grade {
            catalog,
            question,
            source,
            config,
        } => commands::grade::execute(catalog, question, source, config).await,
        Commands::Run {
            language,
            source,
            stdin,
            config,
        } => commands::run::execute(language, source, stdin, config).await,
        Commands::Take {
            catalog,
            answers,
            time_limit,
            output,
            config,
        } => commands::take::execute(catalog, answers, time_limit, output, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
