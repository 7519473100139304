use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use wecom_notify::observability::metrics::get_metrics;
use wecom_notify::utils::config_loader;
use wecom_notify::utils::logging::{self, LogLevel};
use wecom_notify::{MediaType, MessageOptions, MessageReceiver, Notifier, UploadMedia};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "wecom-notify.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print Prometheus metrics to stderr after the command.
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send an application message
    Send(SendArgs),
    /// Upload a temporary media file and print its media_id
    Upload {
        #[arg(long = "type", value_enum)]
        media_type: MediaType,
        path: PathBuf,
    },
    /// Fetch (or reuse) the access token and print its expiry
    Token,
}

#[derive(ClapArgs)]
struct SendArgs {
    /// User ids separated by '|', or @all
    #[arg(long)]
    to_user: Option<String>,
    /// Department ids separated by '|'
    #[arg(long)]
    to_party: Option<String>,
    /// Tag ids separated by '|'
    #[arg(long)]
    to_tag: Option<String>,
    #[arg(long, default_value = "text")]
    msgtype: String,
    /// Shortcut for text and markdown messages
    #[arg(long, conflicts_with = "payload")]
    content: Option<String>,
    /// Full JSON payload of the message
    #[arg(long)]
    payload: Option<String>,
    #[arg(long)]
    safe: bool,
    #[arg(long)]
    id_trans: bool,
    #[arg(long)]
    duplicate_check: bool,
    /// Seconds, only used together with --duplicate-check
    #[arg(long, requires = "duplicate_check")]
    duplicate_interval: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let config = config_loader::run(&args.config).await?;
    logging::run(&config, args.log_level);

    // -------------------------------
    // 2. Build client (reads the token cache when enabled)
    // -------------------------------

    let notifier = Notifier::from_config(&config).await?;
    info!("notifier ready for agent {}", notifier.agent_id());

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command {
        Command::Send(send) => run_send(&notifier, send).await?,
        Command::Upload { media_type, path } => {
            let result = notifier.upload(&UploadMedia::new(media_type, path)).await?;
            if !result.is_ok() {
                bail!("upload rejected: {} {}", result.errcode, result.errmsg);
            }
            println!("{}", result.media_id);
        }
        Command::Token => {
            let token = notifier.get_token().await?;
            println!("token valid until {}", token.expires_at);
        }
    }

    if args.metrics {
        eprintln!("{}", get_metrics().await.encode_text()?);
    }
    Ok(())
}

async fn run_send(notifier: &Notifier, send: SendArgs) -> Result<()> {
    let receiver = MessageReceiver {
        to_user: send.to_user.unwrap_or_default(),
        to_party: send.to_party.unwrap_or_default(),
        to_tag: send.to_tag.unwrap_or_default(),
    };

    let payload: Value = match (send.content, send.payload) {
        (Some(content), _) => serde_json::json!({ "content": content }),
        (None, Some(raw)) => serde_json::from_str(&raw).context("parse --payload as JSON")?,
        (None, None) => Value::Null,
    };

    let mut options = MessageOptions {
        safe: send.safe,
        enable_id_trans: send.id_trans,
        ..MessageOptions::default()
    };
    if send.duplicate_check {
        options = options.duplicate_check(send.duplicate_interval);
    }

    let result = notifier.send_value(&receiver, &send.msgtype, payload, Some(&options)).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.is_ok() {
        bail!("message rejected: {} {}", result.errcode, result.errmsg);
    }
    Ok(())
}
