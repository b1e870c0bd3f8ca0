use clap::{Args, Parser, Subcommand};
use raven_client::constants::CLIENT_VERSION;

use crate::utils::parse_key_val;

fn about_message() -> String {
    format!(
        "Report errors to a Sentry-compatible service\nVersion: {}",
        CLIENT_VERSION
    )
}

#[derive(Parser, Clone)]
#[clap(name = "raven", about = about_message(), version = CLIENT_VERSION)]
pub struct Cli {
    /// Optional config file (toml); `RAVEN_*` environment variables override it
    #[clap(long, global = true)]
    pub config: Option<String>,

    /// Write logs to `raven.log` in this directory instead of stderr
    #[clap(long, global = true)]
    pub log_dir: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Parse a DSN and show its parts
    Dsn {
        dsn: String,
    },

    /// Build and send a single error event
    Send(SendArgs),

    /// Print the X-Sentry-Auth header that would be sent right now
    AuthHeader {
        #[clap(long)]
        dsn: Option<String>,
    },

    /// Print the encoded body of a synthetic event
    Encode {
        #[clap(long, short, default_value = "raven test event")]
        message: String,
    },

    /// Decode an encoded body back to JSON
    Decode {
        payload: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Falls back to `RAVEN_DSN` or the config file
    #[clap(long)]
    pub dsn: Option<String>,

    #[clap(long, short, default_value = "raven test event")]
    pub message: String,

    /// Text reported as the exception type
    #[clap(long, default_value = "raven test")]
    pub panic_value: String,

    /// Extra data as key=value; values that parse as JSON are sent as JSON
    #[clap(long = "extra", value_parser = parse_key_val)]
    pub extra: Vec<(String, String)>,

    /// Exit with an error when the server answers with a non-2xx status
    #[clap(long)]
    pub fail_on_status: bool,
}
