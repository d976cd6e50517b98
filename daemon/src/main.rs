//! driplet daemon entry point.
//!
//! Runs the faucet node against the HTTP payment gateway and sign-in
//! service, with a line-based console transport on stdin for driving the
//! flows. A chat-bot transport plugs into the same event channels.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use driplet_faucet::RewardController;
use driplet_ledger::{HttpGateway, HttpSignIn};
use driplet_node::{
    init_logging, FaucetNode, InboundEvent, LogFormat, NodeConfig, OutboundReply, Shutdown,
    ShutdownHandle,
};
use driplet_store::MemoryStore;
use driplet_types::{LedgerAddress, SystemClock, UserId};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "driplet-daemon", about = "driplet faucet daemon")]
struct Cli {
    /// Base URL of the payment gateway.
    #[arg(long, env = "DRIPLET_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Source account all payouts come from.
    #[arg(long, env = "DRIPLET_SOURCE_ADDRESS")]
    source_address: Option<String>,

    /// Base URL of the hosted sign-in service.
    #[arg(long, env = "DRIPLET_SIGNIN_API_URL")]
    signin_api_url: Option<String>,

    /// Sign-in service credentials.
    #[arg(long, env = "DRIPLET_SIGNIN_API_KEY")]
    signin_api_key: Option<String>,
    #[arg(long, env = "DRIPLET_SIGNIN_API_SECRET")]
    signin_api_secret: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DRIPLET_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "DRIPLET_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the faucet node.
    Run,
}

fn build_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(&path.display().to_string())
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };

    if let Some(url) = &cli.gateway_url {
        config.gateway_url = url.clone();
    }
    if let Some(raw) = &cli.source_address {
        config.source_address = LedgerAddress::parse(raw).context("parsing --source-address")?;
    }
    if let Some(url) = &cli.signin_api_url {
        config.signin_api_url = url.clone();
    }
    if let Some(key) = &cli.signin_api_key {
        config.signin_api_key = key.clone();
    }
    if let Some(secret) = &cli.signin_api_secret {
        config.signin_api_secret = secret.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    init_logging(LogFormat::from_config(&config.log_format), &config.log_level);

    match cli.command {
        Command::Run => run(config).await,
    }
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    tracing::info!(
        gateway = %config.gateway_url,
        source = %config.source_address,
        "starting driplet faucet"
    );

    let controller = RewardController::new(
        MemoryStore::new(),
        HttpGateway::new(&config.gateway_url),
        config.source_address.clone(),
        config.faucet.clone(),
        SystemClock,
    )
    .context("invalid faucet parameters")?;
    let signin = HttpSignIn::new(
        &config.signin_api_url,
        &config.signin_api_key,
        &config.signin_api_secret,
    );

    let (event_tx, event_rx) = mpsc::channel(64);
    let (reply_tx, reply_rx) = mpsc::channel(64);
    let node = Arc::new(FaucetNode::new(controller, signin, &config, reply_tx));
    let shutdown = Shutdown::new();

    let node_task = tokio::spawn(node.run(event_rx, shutdown.handle()));
    tokio::spawn(print_replies(reply_rx));
    tokio::spawn(read_console(event_tx, shutdown.handle()));

    shutdown.on_signal().await;
    node_task.await.context("node task panicked")?;
    tracing::info!("driplet daemon exited cleanly");
    Ok(())
}

async fn print_replies(mut replies: mpsc::Receiver<OutboundReply>) {
    while let Some(reply) = replies.recv().await {
        println!("{}", render(&reply));
    }
}

fn render(reply: &OutboundReply) -> String {
    match reply {
        OutboundReply::Welcome { user } => format!("[{user}] welcome to the faucet"),
        OutboundReply::ChallengePresented { user, prompt }
        | OutboundReply::ChallengeRetry { user, prompt } => {
            format!("[{user}] {}  options: {:?}", prompt.question, prompt.options)
        }
        OutboundReply::Cooldown { user, remaining_secs, stats } => {
            format!(
                "[{user}] on cooldown, {remaining_secs}s remaining \
                 ({} claims, {} earned, {} from referrals)",
                stats.claims, stats.total_profit, stats.referral_profit
            )
        }
        OutboundReply::Paid { user, amount, tx_id, new_user_bonus } => match new_user_bonus {
            Some(bonus) => format!("[{user}] paid {amount} (tx {tx_id}), welcome bonus {bonus}"),
            None => format!("[{user}] paid {amount} (tx {tx_id})"),
        },
        OutboundReply::PaymentFailed { user, .. } => {
            format!("[{user}] payment failed, please try again later")
        }
        OutboundReply::NoActiveChallenge { user } => {
            format!("[{user}] no active challenge, start over")
        }
        OutboundReply::NotAuthorized { user } => format!("[{user}] sign in first"),
        OutboundReply::NotSubscribed { user } => format!("[{user}] channel subscription required"),
        OutboundReply::SubscriptionRecorded { user } => format!("[{user}] subscription confirmed"),
        OutboundReply::LoginUrl { user, url } => format!("[{user}] sign in at {url}"),
        OutboundReply::LoginCompleted { user, address } => {
            format!("[{user}] signed in as {address}")
        }
        OutboundReply::LoginTimedOut { user } => format!("[{user}] sign-in timed out"),
        OutboundReply::WalletInactive { user, address } => {
            format!("[{user}] wallet {address} is not activated on the ledger")
        }
        OutboundReply::ReferralInfo { user, referral_count, referral_profit } => {
            format!("[{user}] {referral_count} referrals, {referral_profit} earned")
        }
        OutboundReply::Error { user } => format!("[{user}] something went wrong, try again"),
    }
}

/// Line-based console transport. One command per line:
///
///   start <id> [referrer]   claim <id>        lottery <id>
///   answer <id> <n>         login <id>        subscribe <id>
///   referrals <id>
async fn read_console(events: mpsc::Sender<InboundEvent>, mut shutdown: ShutdownHandle) {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.triggered() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                _ => break,
            },
        };
        match parse_command(&line) {
            Some(event) => {
                if events.send(event).await.is_err() {
                    break;
                }
            }
            None => {
                if !line.trim().is_empty() {
                    eprintln!("unrecognized command: {line}");
                }
            }
        }
    }
}

fn parse_command(line: &str) -> Option<InboundEvent> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let user = UserId::new(parts.next()?.parse().ok()?);

    let event = match verb {
        "start" => InboundEvent::Started {
            user,
            referrer: parts.next().and_then(|s| s.parse().ok()).map(UserId::new),
        },
        "claim" => InboundEvent::ClaimRequested { user },
        "lottery" => InboundEvent::LotteryRequested { user },
        "answer" => InboundEvent::ChallengeAnswered {
            user,
            answer: parts.next()?.parse().ok()?,
        },
        "login" => InboundEvent::LoginRequested { user },
        "subscribe" => InboundEvent::SubscriptionConfirmed { user },
        "referrals" => InboundEvent::ReferralInfoRequested { user },
        _ => return None,
    };
    Some(event)
}
