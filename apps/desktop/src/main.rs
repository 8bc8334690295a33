use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    signer_keys::generate_signer, ComposeSession, HttpLedgerClient, LedgerClient,
    MissingLedgerClient, Notifier, StaticWallet, SubmissionCoordinator,
};
use shared::protocol::{Notice, NoticeLevel};
use storage::Storage;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod view;

use config::{load_settings, normalize_database_url, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "memochain", about = "Send memos to the ledger and browse what you sent")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    gateway_url: Option<String>,
    /// Address of the connected wallet.
    #[arg(long)]
    wallet: Option<String>,
    #[arg(long)]
    cluster: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the landing view, or the connected view when a wallet is set.
    Status,
    /// Send a memo.
    Send {
        #[arg(long)]
        memo: String,
        /// Extra co-signer as `<ADDRESS>:<comma-separated secret key bytes>`.
        #[arg(long = "signer", value_parser = parse_signer_arg)]
        signers: Vec<(String, String)>,
        /// Attach this many freshly generated co-signers.
        #[arg(long, default_value_t = 0)]
        generate_signers: usize,
    },
    /// Generate a co-signer keypair and print it.
    NewSigner,
    /// List the memos sent from this profile.
    History,
    /// Forget the local memo history.
    ClearHistory,
}

fn parse_signer_arg(raw: &str) -> std::result::Result<(String, String), String> {
    let (address, secret) = raw
        .split_once(':')
        .ok_or_else(|| "expected <ADDRESS>:<BYTES>".to_string())?;
    let address = address.trim();
    if address.is_empty() {
        return Err("signer address must not be empty".into());
    }
    Ok((address.to_string(), secret.to_string()))
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✔ {}", notice.message),
            NoticeLevel::Info => println!("ℹ {}", notice.message),
            NoticeLevel::Error => eprintln!("✖ {}", notice.message),
        }
    }
}

async fn check_profile(storage: &Storage) -> Result<()> {
    storage.health_check().await.map_err(|error| {
        error!(%error, "profile database failed its health check");
        error.context("profile database is unavailable")
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(v) = args.database_url {
        settings.database_url = v;
    }
    if args.gateway_url.is_some() {
        settings.gateway_url = args.gateway_url;
    }
    if args.wallet.is_some() {
        settings.wallet_address = args.wallet;
    }
    if let Some(v) = args.cluster {
        settings.cluster = v;
    }

    if let Some(Command::NewSigner) = args.command {
        print!("{}", view::render_new_signer(&generate_signer()));
        return Ok(ExitCode::SUCCESS);
    }

    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let ledger: Arc<dyn LedgerClient> = match settings.gateway_url.as_deref() {
        Some(url) => Arc::new(HttpLedgerClient::new(url)?),
        None => Arc::new(MissingLedgerClient),
    };
    let wallet = match settings.wallet_address.clone() {
        Some(address) => StaticWallet::connected(address),
        None => StaticWallet::disconnected(),
    };
    let coordinator = SubmissionCoordinator::open(
        ledger,
        Arc::new(wallet),
        Arc::new(ConsoleNotifier),
        Arc::new(storage.clone()),
    )
    .await;
    info!(%database_url, cluster = %settings.cluster, "profile opened");

    match args.command.unwrap_or(Command::Status) {
        Command::Status => {
            if let Err(error) = check_profile(&storage).await {
                eprintln!("✖ {error:#}");
                return Ok(ExitCode::FAILURE);
            }
            match coordinator.wallet_address() {
                Some(wallet) => print!(
                    "{}",
                    view::render_connected(&wallet, &coordinator.history().await, &settings.cluster)
                ),
                None => print!("{}", view::render_landing()),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Send {
            memo,
            signers,
            generate_signers,
        } => {
            let mut session = ComposeSession::new();
            session.set_text(memo);
            for (address, secret) in signers {
                session.import_signer(address, secret);
            }
            for _ in 0..generate_signers {
                session.add_signer();
            }
            println!("{}", view::char_counter(session.text()));

            match coordinator.submit_session(&mut session).await {
                Ok(record) => {
                    println!(
                        "{}",
                        view::explorer_url(&record.signature, &settings.cluster)
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(_) => Ok(ExitCode::FAILURE),
            }
        }
        Command::History => {
            print!(
                "{}",
                view::render_history(&coordinator.history().await, &settings.cluster)
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::ClearHistory => {
            if coordinator.history().await.is_empty() {
                println!("{}", view::EMPTY_HISTORY);
                return Ok(ExitCode::SUCCESS);
            }
            coordinator
                .clear_history()
                .await
                .context("failed to clear memo history")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::NewSigner => Ok(ExitCode::SUCCESS),
    }
}
