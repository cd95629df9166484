//! Peg Guardian - command line entry point

use peg_guardian::*;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::{error, info};
use peg_guardian::{
    advisory::{AdvisoryService, OpenAiAdvisor, RuleBasedAdvisor},
    agent::{AgentSettings, GuardianAgent},
    execution::TradeExecutor,
    feed::{OnchainVenueFeed, SimulatedVenueFeed, VenueFeed},
    storage::Journal,
};

#[derive(Debug, Parser)]
#[command(name = "peg-guardian", version, about = "Divergence guardian for pegged-asset pools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the evaluation loop
    Run {
        /// Stop after this many cycles (runs until Ctrl+C when omitted)
        #[arg(short = 'n', long)]
        iterations: Option<u64>,
        /// Override EXECUTION_MODE
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Check whether an action reference is confirmed
    Verify {
        reference: String,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Simulation,
    Live,
}

impl From<ModeArg> for ExecutionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Simulation => ExecutionMode::Simulation,
            ModeArg::Live => ExecutionMode::Live,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = CONFIG.clone();

    let _logging_guard = utils::setup_logging(&config.output_dir)?;
    utils::setup_output_directories(&config.output_dir)?;

    match cli.command {
        Command::Run { iterations, mode } => {
            if let Some(mode) = mode {
                config.execution_mode = mode.into();
            }
            run(config, iterations).await
        }
        Command::Verify { reference, mode } => {
            if let Some(mode) = mode {
                config.execution_mode = mode.into();
            }
            verify(config, &reference).await
        }
    }
}

async fn run(config: Config, iterations: Option<u64>) -> Result<()> {
    info!("🛡️  Peg Guardian v{}", env!("CARGO_PKG_VERSION"));
    utils::print_configuration(&config);

    if let Err(e) = config.validate() {
        error!("❌ {}", e);
        return Err(e.into());
    }

    let feed: Box<dyn VenueFeed> = if config.venue_pools.is_empty() {
        Box::new(SimulatedVenueFeed::new(config.simulated_fee_gwei))
    } else {
        Box::new(OnchainVenueFeed::connect(&config)?)
    };

    let advisor: Box<dyn AdvisoryService> = match &config.openai_api_key {
        Some(key) => Box::new(OpenAiAdvisor::new(
            key.clone(),
            config.advisory_model.clone(),
            config.advisory_timeout(),
        )?),
        None => Box::new(RuleBasedAdvisor),
    };

    let executor = TradeExecutor::from_config(&config).await?;

    let mut agent = GuardianAgent::new(&config, feed, executor)?
        .with_advisor(advisor)
        .with_journal(Journal::new(&config.output_dir))
        .with_settings(AgentSettings::from_config(&config, iterations));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("\n📛 Received shutdown signal (Ctrl+C), finishing current cycle...");
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = agent.run(shutdown_rx).await?;
    utils::print_run_summary(&summary);
    Ok(())
}

async fn verify(config: Config, reference: &str) -> Result<()> {
    config.validate()?;
    let executor = TradeExecutor::from_config(&config).await?;
    let confirmed = executor.verify(reference).await?;

    if confirmed {
        info!("✅ {} is confirmed", reference);
    } else {
        info!("❌ {} is not confirmed", reference);
    }
    Ok(())
}
