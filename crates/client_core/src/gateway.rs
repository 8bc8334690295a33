use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{ANCHOR_MEMO_PROGRAM_ID, SPL_MEMO_PROGRAM_ID},
    error::ApiError,
    protocol::{AccountMetaPayload, CoSignature, SendMemoRequest, SendMemoResponse},
};
use tracing::debug;
use url::Url;

use crate::{LedgerClient, SendMemoInstruction};

/// Ledger client that hands the instruction to a memo gateway over HTTP.
///
/// The gateway builds the transaction, collects the wallet's signature and
/// submits it. Co-signers sign only the raw memo bytes, not the transaction
/// message, so the gateway must treat those signatures as proof of key
/// possession and cannot attach them to the transaction as they are. Secret
/// keys never leave this process.
pub struct HttpLedgerClient {
    http: Client,
    base_url: Url,
    program_id: String,
    memo_program_id: String,
}

impl HttpLedgerClient {
    pub fn new(gateway_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(gateway_url)
            .with_context(|| format!("invalid memo gateway url '{gateway_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            program_id: ANCHOR_MEMO_PROGRAM_ID.to_string(),
            memo_program_id: SPL_MEMO_PROGRAM_ID.to_string(),
        })
    }

    pub fn with_program_ids(
        mut self,
        program_id: impl Into<String>,
        memo_program_id: impl Into<String>,
    ) -> Self {
        self.program_id = program_id.into();
        self.memo_program_id = memo_program_id.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_request(&self, instruction: &SendMemoInstruction<'_>) -> SendMemoRequest {
        let memo_bytes = instruction.memo.as_bytes();
        SendMemoRequest {
            program_id: self.program_id.clone(),
            memo_program_id: self.memo_program_id.clone(),
            payer: instruction.payer.to_string(),
            memo: instruction.memo.to_string(),
            remaining_accounts: instruction
                .co_signers
                .iter()
                .map(|signer| AccountMetaPayload::readonly_signer(signer.address()))
                .collect(),
            co_signatures: instruction
                .co_signers
                .iter()
                .map(|signer| CoSignature {
                    pubkey: signer.address().to_string(),
                    signature_b58: bs58::encode(signer.sign(memo_bytes).to_bytes()).into_string(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn send_memo(&self, instruction: SendMemoInstruction<'_>) -> Result<String> {
        let endpoint = self.base_url.join("memos")?;
        let payload = self.build_request(&instruction);
        debug!(%endpoint, co_signers = payload.co_signatures.len(), "posting memo to gateway");

        let res = self.http.post(endpoint).json(&payload).send().await?;
        let status = res.status();
        if status.is_success() {
            let body: SendMemoResponse = res.json().await?;
            return Ok(body.signature);
        }

        let raw = res.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiError>(&raw) {
            Ok(api_error) => Err(anyhow!(api_error.message)),
            Err(_) if raw.trim().is_empty() => Err(anyhow!("memo gateway returned {status}")),
            Err(_) => Err(anyhow!("memo gateway returned {status}: {}", raw.trim())),
        }
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
