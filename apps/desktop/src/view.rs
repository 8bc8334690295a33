//! Plain-text rendering of the landing view, the connected view and the
//! memo history.

use std::fmt::Write as _;

use chrono::{Local, TimeZone};
use shared::domain::{AdditionalSigner, MemoRecord, MAX_MEMO_CHARS};

pub const BRAND: &str = "MemoChain";
pub const EMPTY_HISTORY: &str = "No memos sent yet. Send your first memo above!";

pub fn render_landing() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BRAND}");
    let _ = writeln!(out);
    let _ = writeln!(out, "BLOCKCHAIN SIMPLIFIED");
    let _ = writeln!(out, "Store Messages On-Chain Forever");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Memo dApp lets you store important messages, notes, and data directly on the \
         blockchain. Immutable, secure, and accessible from anywhere in the world."
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Connect a wallet with --wallet <ADDRESS> or MEMOCHAIN_WALLET to get started."
    );
    out
}

pub fn render_connected(wallet: &str, history: &[MemoRecord], cluster: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BRAND}  [{}]", truncate_address(wallet));
    let _ = writeln!(out, "Store messages permanently on the Solana blockchain");
    let _ = writeln!(out);
    let _ = writeln!(out, "Send Memo");
    let _ = writeln!(
        out,
        "  memochain send --memo <TEXT> [--signer <ADDRESS>:<BYTES>] [--generate-signers <N>]"
    );
    let _ = writeln!(out);
    out.push_str(&render_history(history, cluster));
    out
}

pub fn render_history(history: &[MemoRecord], cluster: &str) -> String {
    let mut out = String::new();
    if history.is_empty() {
        let _ = writeln!(out, "Memo History");
        let _ = writeln!(out, "  {EMPTY_HISTORY}");
        return out;
    }

    let _ = writeln!(out, "Memo History  (clear with `memochain clear-history`)");
    let total = history.len();
    for (index, memo) in history.iter().enumerate() {
        let _ = writeln!(out, "Memo #{}: {}", total - index, memo.text);
        let _ = writeln!(
            out,
            "  Transaction: {}  {}",
            truncate_signature(&memo.signature),
            explorer_url(&memo.signature, cluster)
        );
        let signers: Vec<_> = memo
            .signer_addresses
            .iter()
            .map(|s| truncate_address(s))
            .collect();
        let _ = writeln!(
            out,
            "  Signers ({}): {}",
            memo.signer_addresses.len(),
            signers.join(", ")
        );
        let _ = writeln!(out, "  {}", format_timestamp(memo.created_at));
    }
    out
}

pub fn render_new_signer(signer: &AdditionalSigner) -> String {
    format!(
        "Public Key: {}\nPrivate Key: {}\n",
        signer.public_address, signer.secret_material
    )
}

pub fn char_counter(text: &str) -> String {
    format!("{}/{MAX_MEMO_CHARS} characters", text.chars().count())
}

pub fn explorer_url(signature: &str, cluster: &str) -> String {
    format!("https://explorer.solana.com/tx/{signature}?cluster={cluster}")
}

pub fn truncate_signature(signature: &str) -> String {
    truncate_middle(signature, 8)
}

pub fn truncate_address(address: &str) -> String {
    truncate_middle(address, 6)
}

fn truncate_middle(value: &str, keep: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= keep * 2 {
        return value.to_string();
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{head}...{tail}")
}

pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}
