use serde::{Deserialize, Serialize};

/// Account entry appended after the instruction's fixed accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetaPayload {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMetaPayload {
    pub fn readonly_signer(pubkey: impl Into<String>) -> Self {
        Self {
            pubkey: pubkey.into(),
            is_signer: true,
            is_writable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoSignature {
    pub pubkey: String,
    pub signature_b58: String,
}

/// Body of `POST /memos` on the memo gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMemoRequest {
    pub program_id: String,
    pub memo_program_id: String,
    pub payer: String,
    pub memo: String,
    #[serde(default)]
    pub remaining_accounts: Vec<AccountMetaPayload>,
    #[serde(default)]
    pub co_signatures: Vec<CoSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMemoResponse {
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}
