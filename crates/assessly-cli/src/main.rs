//! assessly CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "assessly",
    version,
    about = "Timed multiple-choice assessments in the terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed assessment interactively
    Take {
        /// Subject to be assessed on (e.g. "physics")
        #[arg(long)]
        subject: Option<String>,

        /// Difficulty: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,

        /// Countdown length in seconds (overrides config)
        #[arg(long)]
        duration: Option<u32>,

        /// Output directory for the saved report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Do not save a report
        #[arg(long)]
        no_save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a set of answers without the interactive prompt
    Grade {
        /// Subject to be assessed on
        #[arg(long)]
        subject: Option<String>,

        /// Difficulty: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,

        /// Answers in question order (e.g. "A,B,A" or "1,2,1")
        #[arg(long)]
        answers: String,

        /// Output directory for the saved report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Do not save a report
        #[arg(long)]
        no_save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// List the subjects the configured bank source offers
    ListSubjects {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show recently saved assessments
    History {
        /// Report directory (defaults to the configured output directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Maximum number of reports to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("assessly=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            subject,
            difficulty,
            duration,
            output,
            format,
            no_save,
            config,
        } => {
            commands::take::execute(commands::take::TakeArgs {
                subject,
                difficulty,
                duration,
                save: commands::SaveOptions {
                    output,
                    format,
                    no_save,
                },
                config,
            })
            .await
        }
        Commands::Grade {
            subject,
            difficulty,
            answers,
            output,
            format,
            no_save,
            config,
        } => {
            commands::grade::execute(commands::grade::GradeArgs {
                subject,
                difficulty,
                answers,
                save: commands::SaveOptions {
                    output,
                    format,
                    no_save,
                },
                config,
            })
            .await
        }
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::ListSubjects { config } => commands::list_subjects::execute(config),
        Commands::History { dir, limit, config } => commands::history::execute(dir, limit, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
