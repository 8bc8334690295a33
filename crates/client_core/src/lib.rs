use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::protocol::{Notice, NoticeLevel};
use tracing::{error, info};

pub mod compose;
mod coordinator;
pub mod gateway;
pub mod signer_keys;

pub use compose::ComposeSession;
pub use coordinator::{CoordinatorState, SubmissionCoordinator, SubmissionError};
pub use gateway::HttpLedgerClient;
pub use signer_keys::ParsedSigner;

/// The single memo instruction handed to the ledger.
#[derive(Debug)]
pub struct SendMemoInstruction<'a> {
    pub memo: &'a str,
    /// Fee payer and primary signer.
    pub payer: &'a str,
    /// Extra read-only signer accounts, in the order the user listed them.
    pub co_signers: &'a [ParsedSigner],
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits the instruction and returns the transaction signature.
    async fn send_memo(&self, instruction: SendMemoInstruction<'_>) -> Result<String>;
}

pub struct MissingLedgerClient;

#[async_trait]
impl LedgerClient for MissingLedgerClient {
    async fn send_memo(&self, _instruction: SendMemoInstruction<'_>) -> Result<String> {
        Err(anyhow!("ledger client is unavailable"))
    }
}

pub trait WalletIdentity: Send + Sync {
    fn connected_address(&self) -> Option<String>;

    fn can_sign_transactions(&self) -> bool {
        true
    }
}

/// Wallet whose address is fixed for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct StaticWallet {
    address: Option<String>,
}

impl StaticWallet {
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }
}

impl WalletIdentity for StaticWallet {
    fn connected_address(&self) -> Option<String> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => error!(message = %notice.message, "notice"),
            NoticeLevel::Success | NoticeLevel::Info => info!(message = %notice.message, "notice"),
        }
    }
}
