use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod report;

#[derive(Parser)]
#[command(
    name = "pulse",
    about = "pulse — endpoint health checks for a REST API",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every endpoint in the catalog and report a health score.
    ///
    /// Endpoints are probed in concurrent batches. Ctrl-C cancels at the
    /// next batch boundary and still prints the partial report. Exits with
    /// status 1 if any endpoint failed.
    Run {
        /// Config file (default: ./pulse.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Base URL of the API, overriding the config file
        #[arg(short, long)]
        base_url: Option<String>,
        /// Requests issued concurrently per batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// JSON frontend connectivity survey ({"total", "connected", "partial", "disconnected"})
        #[arg(long)]
        frontend_check: Option<PathBuf>,
        /// JSON backend registration survey ({"registered", "unregistered"})
        #[arg(long)]
        backend_check: Option<PathBuf>,
    },
    /// List the endpoints that would be probed
    Catalog {
        #[arg(short, long)]
        config: Option<String>,
        /// Output format: text or json
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Generate a pulse.toml scaffold
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulse=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            base_url,
            batch_size,
            format,
            frontend_check,
            backend_check,
        } => {
            let healthy = commands::run::run(commands::run::RunOptions {
                config,
                base_url,
                batch_size,
                format,
                frontend_check,
                backend_check,
            })
            .await?;
            Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Catalog { config, format } => {
            commands::catalog::list(config.as_deref(), format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { path } => {
            commands::init::init(&path)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
