use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use raven_client::diagnostics::TracingSink;
use raven_client::events::{capture_stack, Event, Extra};
use raven_client::exporters::{auth_header, decode_payload, encode_event};
use raven_client::{ClientDefaults, ConfigLoader, Dsn, RavenClient};

use crate::commands::{Cli, Command, SendArgs};
use crate::logging::setup_logging;
use crate::utils::extra_from_pairs;

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_dir.as_deref())?;

    // Use the --config flag, if provided, when loading the configuration
    let config = ConfigLoader::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Dsn { dsn } => print_dsn(&dsn),
        Command::Send(args) => tokio::runtime::Runtime::new()?.block_on(send(args, config)),
        Command::AuthHeader { dsn } => {
            let dsn = Dsn::parse(&resolve_dsn(dsn, &config)?)?;
            println!("{}", auth_header(&dsn, &config, Utc::now()));
            Ok(())
        }
        Command::Encode { message } => {
            let stack = capture_stack();
            let event = Event::from_panic(
                "",
                &config.platform,
                "raven test",
                &message,
                &stack,
                Extra::new(),
            );
            let payload = encode_event(&event).context("Failed to encode event")?;
            println!("{}", String::from_utf8_lossy(&payload));
            Ok(())
        }
        Command::Decode { payload } => {
            let event =
                decode_payload(payload.trim().as_bytes()).context("Failed to decode payload")?;
            println!("{}", serde_json::to_string_pretty(&event)?);
            Ok(())
        }
    }
}

fn print_dsn(dsn: &str) -> Result<()> {
    let dsn = Dsn::parse(dsn)?;
    let secret = if dsn.secret_key.is_empty() {
        "<none>"
    } else {
        "***"
    };

    println!("Public key: {}", dsn.public_key);
    println!("Secret key: {}", secret);
    println!("Project:    {}", dsn.project_id);
    println!("Endpoint:   {}", dsn.store_url());
    Ok(())
}

/// The command line wins over `RAVEN_DSN` and the config file.
fn resolve_dsn(dsn: Option<String>, config: &ClientDefaults) -> Result<String> {
    dsn.or_else(|| config.dsn.clone())
        .context("No DSN given: pass --dsn or set RAVEN_DSN")
}

async fn send(args: SendArgs, config: ClientDefaults) -> Result<()> {
    let dsn = resolve_dsn(args.dsn, &config)?;
    let client = RavenClient::new(&dsn, config, Arc::new(TracingSink))?;

    let extra = extra_from_pairs(&args.extra);
    let delivery = client
        .report(args.panic_value, &args.message, extra)
        .await
        .context("Failed to report event")?;

    println!("Status: {}", delivery.status);
    if !delivery.body.is_empty() {
        println!("Response: {}", delivery.body);
    }

    if args.fail_on_status && !delivery.is_success() {
        anyhow::bail!("Server rejected the event with status {}", delivery.status);
    }
    Ok(())
}
