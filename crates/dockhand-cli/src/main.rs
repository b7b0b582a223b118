mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dockhand",
    about = "Generate a Dockerfile for any project and build the image"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a project and summarize its files and configuration
    Analyze {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Let the agent explore the project and write a Dockerfile
    Generate {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Upper bound on agent turns (default: agent.max_turns from dockhand.toml)
        #[arg(long)]
        max_turns: Option<u32>,
        /// Include a scanned project summary in the opening prompt
        #[arg(long)]
        prime: bool,
    },
    /// Build the project image, generating a Dockerfile first if needed
    Build {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Image tag
        #[arg(long, short = 't')]
        tag: Option<String>,
        /// Regenerate the Dockerfile even if one exists
        #[arg(long)]
        regenerate: bool,
        /// Upper bound on agent turns when generating
        #[arg(long)]
        max_turns: Option<u32>,
        /// Print only the tag (or image id) on success
        #[arg(long, short = 'q')]
        quiet: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Build { quiet: true, .. } => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze { path } => commands::analyze(&path)?,
        Commands::Generate {
            path,
            max_turns,
            prime,
        } => commands::generate(&path, max_turns, prime).await?,
        Commands::Build {
            path,
            tag,
            regenerate,
            max_turns,
            quiet,
        } => commands::build(&path, tag.as_deref(), regenerate, max_turns, quiet).await?,
    }

    Ok(())
}
