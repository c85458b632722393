use anyhow::Context;
use clap::{Parser, Subcommand};
use decider_rs::decider::config::Config;
use decider_rs::decider::metric;
use decider_rs::decider::policy::state::VariableBag;
use decider_rs::decider::policy::Inferrer;
use decider_rs::decider::server::{self, ApiError, AppState, InferResponse};
use dotenv::dotenv;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the policy inference API
    Serve {
        /// Port to listen on (overrides DECIDER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Evaluate a policy file against a JSON input
    Infer {
        /// Path to the DOT policy file
        #[arg(short, long)]
        policy: PathBuf,

        /// Input variables as a JSON object
        #[arg(short, long, default_value = "{}")]
        input: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::from_env()?;

    match args.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            metric::init(&config);

            let listener = tokio::net::TcpListener::bind(config.listen_addr()?)
                .await
                .with_context(|| format!("binding {}:{}", config.host, config.port))?;
            server::serve(listener, AppState::default()).await?;
        }
        Commands::Infer { policy, input } => {
            let source = std::fs::read_to_string(&policy)
                .with_context(|| format!("reading policy {}", policy.display()))?;
            let input: VariableBag = serde_json::from_str(&input)
                .context("input must be a JSON object of booleans, numbers and strings")?;
            if input.is_empty() {
                log::info!("No input variables given");
            }

            match Inferrer::default().infer(&source, &input) {
                Ok(output) => {
                    let response = InferResponse { output };
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Err(e) => {
                    log::error!("Inference failed: {}", e);
                    println!("{}", serde_json::to_string_pretty(&ApiError::from(&e))?);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
