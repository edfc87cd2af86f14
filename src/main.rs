use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use herald_gateway::api::{self, ApiState};
use herald_gateway::pipeline::ExecOutcome;
use herald_gateway::{Config, VoicePipeline};

/// Herald - voice command gateway for local assistants
#[derive(Parser)]
#[command(name = "herald", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "HERALD_PORT", default_value = "18790")]
    port: u16,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a command phrase locally without the HTTP server
    Exec {
        /// Command text, e.g. "open calculator"
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,herald_gateway=info",
        1 => "info,herald_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    if let Some(Command::Exec { text }) = cli.command {
        return exec_command(&config, &text);
    }

    tracing::info!(
        port = cli.port,
        gateway = %config.gateway.url,
        primary_engine = config.stt.primary.is_some(),
        "starting herald gateway"
    );

    let pipeline = VoicePipeline::new(&config)?;
    let state = Arc::new(ApiState { pipeline });

    api::serve(state, cli.port).await?;
    Ok(())
}

/// Run a single command phrase and print the outcome
fn exec_command(config: &Config, text: &str) -> anyhow::Result<()> {
    let pipeline = VoicePipeline::new(config)?;

    match pipeline.execute(text) {
        ExecOutcome::Launched { message } => {
            println!("{message}");
            Ok(())
        }
        ExecOutcome::Failed { message } => anyhow::bail!(message),
        ExecOutcome::Unrecognized { text } => {
            println!("Command '{text}' not recognized as an app or website command");
            Ok(())
        }
    }
}
