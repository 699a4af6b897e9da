//! Authenticator command line entry point

use anyhow::Context;
use authenticator::{auth, diagnostics, logging, AuthFlow, Config, TestStatus};
use authenticator_connector::{CardType, HttpTransport};
use authenticator_jws::FlowType;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "authenticator",
    version,
    about = "Card based IDP authentication through a gematik connector"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check SMC-B readability and IDP reachability
    Diagnose {
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show handle, PIN status and certificate of the inserted card
    Card {
        #[arg(long, value_parser = parse_card_type)]
        card_type: CardType,
    },
    /// Sign an IDP challenge and print the compact JWS
    Sign {
        #[arg(long, value_parser = parse_card_type)]
        card_type: CardType,
        #[arg(long, value_parser = parse_flow)]
        flow: FlowType,
        #[arg(long)]
        challenge: String,
    },
}

fn parse_card_type(value: &str) -> Result<CardType, String> {
    value.parse().map_err(|e: authenticator_connector::Error| e.to_string())
}

fn parse_flow(value: &str) -> Result<FlowType, String> {
    value.parse().map_err(|e: authenticator_jws::JwsError| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        connector = %config.connector.hostname,
        "Starting authenticator"
    );

    match cli.command {
        Command::Diagnose { json } => {
            let transport = Arc::new(HttpTransport::new(config.connector.request_timeout()));
            let results = diagnostics::run_all(&config, transport).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    let mark = match result.status {
                        TestStatus::Success => "OK  ",
                        TestStatus::Failure => "FAIL",
                    };
                    println!("[{mark}] {}: {}", result.name, result.details);
                }
            }
            let failed = results.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                anyhow::bail!("{failed} diagnostic check(s) failed");
            }
        }
        Command::Card { card_type } => {
            let session = auth::connect(&config)
                .await
                .context("Failed to set up connector session")?;
            let mut flow = AuthFlow::new(session, card_type);
            let card = flow
                .inspect_card(card_type)
                .await
                .map_err(|e| anyhow::anyhow!("{e} [{}]", e.support_code()))?;

            println!("Card type:   {}", card.card_type);
            println!("Card handle: {}", card.card_handle);
            println!("Terminal:    {}", card.ct_id);
            println!("Slot:        {}", card.slot_nr);
            println!("ICCSN:       {}", card.iccsn);
            println!(
                "PIN status:  {}",
                card.pin_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
            println!(
                "Certificate: {} base64 characters",
                card.certificate.map(|c| c.len()).unwrap_or(0)
            );
        }
        Command::Sign {
            card_type,
            flow,
            challenge,
        } => {
            let session = auth::connect(&config)
                .await
                .context("Failed to set up connector session")?;
            let mut auth_flow = AuthFlow::new(session, card_type);
            let assertion = auth_flow
                .sign_challenge(card_type, flow, &challenge)
                .await
                .map_err(|e| anyhow::anyhow!("{e} [{}]", e.support_code()))?;
            println!("{}", assertion.to_compact());
            auth_flow.logout();
        }
    }

    Ok(())
}
