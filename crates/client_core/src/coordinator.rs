use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use chrono::Utc;
use shared::{
    domain::{AdditionalSigner, MemoRecord, MAX_MEMO_CHARS},
    error::PreconditionFailure,
    protocol::Notice,
};
use storage::{KeyValueStore, MemoLedgerCache};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    signer_keys::{parse_signers, ParsedSigner},
    ComposeSession, LedgerClient, Notifier, SendMemoInstruction, WalletIdentity,
};

const SENT_MESSAGE: &str = "Memo sent successfully!";
const CLEARED_MESSAGE: &str = "Memo history cleared";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Submitting,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("A memo submission is already in progress")]
    Busy,
    #[error(transparent)]
    Precondition(#[from] PreconditionFailure),
    #[error("Failed to send memo: {0}")]
    Remote(String),
}

/// Clears the in-flight flag however the submission ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Prepared {
    payer: String,
    memo: String,
    co_signers: Vec<ParsedSigner>,
}

/// Sends memos one at a time and records each success in the history.
pub struct SubmissionCoordinator {
    ledger: Arc<dyn LedgerClient>,
    wallet: Arc<dyn WalletIdentity>,
    notifier: Arc<dyn Notifier>,
    cache: Mutex<MemoLedgerCache>,
    in_flight: AtomicBool,
}

impl SubmissionCoordinator {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        wallet: Arc<dyn WalletIdentity>,
        notifier: Arc<dyn Notifier>,
        cache: MemoLedgerCache,
    ) -> Self {
        Self {
            ledger,
            wallet,
            notifier,
            cache: Mutex::new(cache),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Builds a coordinator over `store` and loads the saved history.
    pub async fn open(
        ledger: Arc<dyn LedgerClient>,
        wallet: Arc<dyn WalletIdentity>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let mut cache = MemoLedgerCache::new(store);
        cache.load().await;
        Self::new(ledger, wallet, notifier, cache)
    }

    pub fn state(&self) -> CoordinatorState {
        if self.in_flight.load(Ordering::Acquire) {
            CoordinatorState::Submitting
        } else {
            CoordinatorState::Idle
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state() == CoordinatorState::Submitting
    }

    pub fn wallet_address(&self) -> Option<String> {
        self.wallet.connected_address()
    }

    /// Sends `text` with the given co-signers.
    ///
    /// Every failure is reported through the notifier before it is returned.
    /// The history only changes after the ledger confirmed the memo.
    pub async fn submit(
        &self,
        text: &str,
        signers: &[AdditionalSigner],
    ) -> Result<MemoRecord, SubmissionError> {
        if self.is_submitting() {
            return Err(self.reject_busy());
        }

        let prepared = match self.check_preconditions(text, signers) {
            Ok(prepared) => prepared,
            Err(failure) => {
                warn!(%failure, "memo rejected before submission");
                self.notifier.notify(Notice::error(failure.to_string()));
                return Err(failure.into());
            }
        };

        let Some(_flight) = InFlight::acquire(&self.in_flight) else {
            return Err(self.reject_busy());
        };

        let instruction = SendMemoInstruction {
            memo: &prepared.memo,
            payer: &prepared.payer,
            co_signers: &prepared.co_signers,
        };
        let signature = match self.ledger.send_memo(instruction).await {
            Ok(signature) => signature,
            Err(remote) => {
                let err = SubmissionError::Remote(remote.to_string());
                error!(error = %format!("{remote:#}"), "memo submission failed");
                self.notifier.notify(Notice::error(err.to_string()));
                return Err(err);
            }
        };

        let mut signer_addresses = Vec::with_capacity(prepared.co_signers.len() + 1);
        signer_addresses.push(prepared.payer);
        signer_addresses.extend(prepared.co_signers.iter().map(|s| s.address().to_string()));
        let record = MemoRecord {
            signature,
            text: prepared.memo,
            created_at: Utc::now().timestamp_millis(),
            signer_addresses,
        };

        if let Err(persist) = self.cache.lock().await.append(record.clone()).await {
            error!(
                signature = %record.signature,
                error = %format!("{persist:#}"),
                "memo sent but history could not be saved"
            );
        }

        info!(
            signature = %record.signature,
            signers = record.signer_addresses.len(),
            "memo sent"
        );
        self.notifier.notify(Notice::success(SENT_MESSAGE));
        Ok(record)
    }

    /// Submits the session's contents, clearing it only when the memo was sent.
    pub async fn submit_session(
        &self,
        session: &mut ComposeSession,
    ) -> Result<MemoRecord, SubmissionError> {
        let record = self.submit(session.text(), session.signers()).await?;
        session.reset();
        Ok(record)
    }

    pub async fn history(&self) -> Vec<MemoRecord> {
        self.cache.lock().await.records().to_vec()
    }

    pub async fn reload_history(&self) -> Vec<MemoRecord> {
        self.cache.lock().await.load().await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.cache.lock().await.clear().await?;
        info!("memo history cleared");
        self.notifier.notify(Notice::info(CLEARED_MESSAGE));
        Ok(())
    }

    fn check_preconditions(
        &self,
        text: &str,
        signers: &[AdditionalSigner],
    ) -> Result<Prepared, PreconditionFailure> {
        let payer = self
            .wallet
            .connected_address()
            .filter(|_| self.wallet.can_sign_transactions())
            .ok_or(PreconditionFailure::WalletNotConnected)?;

        let memo = text.trim();
        if memo.is_empty() {
            return Err(PreconditionFailure::EmptyMemo);
        }
        let chars = memo.chars().count();
        if chars > MAX_MEMO_CHARS {
            return Err(PreconditionFailure::MemoTooLong { chars });
        }

        let co_signers = parse_signers(signers)?;
        Ok(Prepared {
            payer,
            memo: memo.to_string(),
            co_signers,
        })
    }

    fn reject_busy(&self) -> SubmissionError {
        let err = SubmissionError::Busy;
        warn!("memo submission rejected; another one is in flight");
        self.notifier.notify(Notice::error(err.to_string()));
        err
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
