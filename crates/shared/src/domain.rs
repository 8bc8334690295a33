use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest memo the on-chain program accepts, counted in characters.
pub const MAX_MEMO_CHARS: usize = 566;
/// Length of an ed25519 keypair as the ledger SDK serializes it: 32 seed bytes
/// followed by the 32 public key bytes.
pub const SECRET_KEY_LEN: usize = 64;
/// Local storage key holding the whole memo history as one JSON array.
pub const HISTORY_STORAGE_KEY: &str = "solana-memos";

pub const ANCHOR_MEMO_PROGRAM_ID: &str = "2p1eq5RNKv4MrESEPtA9za96diQnRHxLd48gz33Yq7r4";
pub const SPL_MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// One sent memo as remembered by the local history.
///
/// Field names on the wire match the browser client so an exported
/// `solana-memos` value loads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoRecord {
    pub signature: String,
    #[serde(rename = "memo")]
    pub text: String,
    #[serde(rename = "timestamp")]
    pub created_at: i64,
    #[serde(rename = "signers")]
    pub signer_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignerId(pub String);

impl SignerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A co-signer attached to the memo currently being composed. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AdditionalSigner {
    pub local_id: SignerId,
    pub public_address: String,
    pub secret_material: String,
}

impl AdditionalSigner {
    pub fn new(public_address: impl Into<String>, secret_material: impl Into<String>) -> Self {
        Self {
            local_id: SignerId::generate(),
            public_address: public_address.into(),
            secret_material: secret_material.into(),
        }
    }
}

impl fmt::Debug for AdditionalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdditionalSigner")
            .field("local_id", &self.local_id)
            .field("public_address", &self.public_address)
            .field("secret_material", &"<redacted>")
            .finish()
    }
}
