use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MAX_MEMO_CHARS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Rejected,
    /// Any code this client does not know, including a missing one.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Error body returned by the memo gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("token {index} ({token:?}) is not a byte value between 0 and 255")]
    InvalidByte { index: usize, token: String },
    #[error("Invalid private key for signer {signer}")]
    InvalidKeyEncoding { signer: String, reason: String },
}

impl KeyParseError {
    pub fn invalid_key(signer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKeyEncoding {
            signer: signer.into(),
            reason: reason.into(),
        }
    }
}

/// Local checks that run before the ledger is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionFailure {
    #[error("Please connect your wallet first")]
    WalletNotConnected,
    #[error("Please enter a memo message")]
    EmptyMemo,
    #[error("Memo message is too long (max {} characters)", MAX_MEMO_CHARS)]
    MemoTooLong { chars: usize },
    #[error(transparent)]
    InvalidSignerKey(#[from] KeyParseError),
}
