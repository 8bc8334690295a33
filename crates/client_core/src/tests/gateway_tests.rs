use super::*;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use shared::error::ErrorCode;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use crate::signer_keys::{generate_signer, parse_signer};

#[derive(Clone)]
struct GatewayState {
    tx: Arc<Mutex<Option<oneshot::Sender<SendMemoRequest>>>>,
}

async fn accept_memo(
    State(state): State<GatewayState>,
    Json(payload): Json<SendMemoRequest>,
) -> Json<SendMemoResponse> {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(payload);
    }
    Json(SendMemoResponse {
        signature: "5gatewaySig".to_string(),
    })
}

async fn reject_memo() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(
            ErrorCode::Rejected,
            "User rejected the request.",
        )),
    )
}

async fn missing_program() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "code": "not_found",
            "message": "Program account not found",
        })),
    )
}

async fn fail_without_code() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "message": "Transaction simulation failed" })),
    )
}

async fn fail_plain() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "upstream rpc down")
}

async fn spawn_gateway(app: Router) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_accepting_gateway() -> Result<(String, oneshot::Receiver<SendMemoRequest>)> {
    let (tx, rx) = oneshot::channel();
    let state = GatewayState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/memos", post(accept_memo))
        .with_state(state);
    Ok((spawn_gateway(app).await?, rx))
}

#[test]
fn base_url_gains_trailing_slash_so_join_keeps_prefix() {
    let client = HttpLedgerClient::new("https://gateway.example/api/v1").expect("client");
    assert_eq!(client.base_url().as_str(), "https://gateway.example/api/v1/");
    assert_eq!(
        client.base_url().join("memos").expect("join").as_str(),
        "https://gateway.example/api/v1/memos"
    );
}

#[test]
fn rejects_unparseable_gateway_url() {
    assert!(HttpLedgerClient::new("not a url").is_err());
}

#[tokio::test]
async fn posts_instruction_with_readonly_co_signers() {
    let (gateway_url, payload_rx) = spawn_accepting_gateway().await.expect("spawn gateway");
    let client = HttpLedgerClient::new(&gateway_url).expect("client");

    let first = parse_signer(&generate_signer()).expect("first");
    let second = parse_signer(&generate_signer()).expect("second");
    let co_signers = vec![first, second];

    let signature = client
        .send_memo(SendMemoInstruction {
            memo: "gm from the gateway",
            payer: "PayerAddr",
            co_signers: &co_signers,
        })
        .await
        .expect("send");
    assert_eq!(signature, "5gatewaySig");

    let payload = payload_rx.await.expect("payload");
    assert_eq!(payload.memo, "gm from the gateway");
    assert_eq!(payload.payer, "PayerAddr");
    assert_eq!(payload.program_id, ANCHOR_MEMO_PROGRAM_ID);
    assert_eq!(payload.memo_program_id, SPL_MEMO_PROGRAM_ID);
    assert_eq!(
        payload.remaining_accounts,
        vec![
            AccountMetaPayload::readonly_signer(co_signers[0].address()),
            AccountMetaPayload::readonly_signer(co_signers[1].address()),
        ]
    );

    for (co_signature, signer) in payload.co_signatures.iter().zip(&co_signers) {
        assert_eq!(co_signature.pubkey, signer.address());
        let key_bytes: [u8; 32] = bs58::decode(&co_signature.pubkey)
            .into_vec()
            .expect("pubkey b58")
            .try_into()
            .expect("32 bytes");
        let sig_bytes = bs58::decode(&co_signature.signature_b58)
            .into_vec()
            .expect("signature b58");
        let verifying_key = VerifyingKey::from_bytes(&key_bytes).expect("verifying key");
        let signature = Signature::from_slice(&sig_bytes).expect("signature");
        verifying_key
            .verify(b"gm from the gateway", &signature)
            .expect("co-signature verifies");
    }
}

#[tokio::test]
async fn custom_program_ids_are_forwarded() {
    let (gateway_url, payload_rx) = spawn_accepting_gateway().await.expect("spawn gateway");
    let client = HttpLedgerClient::new(&gateway_url)
        .expect("client")
        .with_program_ids("ProgramX", "MemoY");

    client
        .send_memo(SendMemoInstruction {
            memo: "hi",
            payer: "PayerAddr",
            co_signers: &[],
        })
        .await
        .expect("send");

    let payload = payload_rx.await.expect("payload");
    assert_eq!(payload.program_id, "ProgramX");
    assert_eq!(payload.memo_program_id, "MemoY");
    assert!(payload.co_signatures.is_empty());
}

#[tokio::test]
async fn gateway_error_message_is_returned_verbatim() {
    let app = Router::new().route("/memos", post(reject_memo));
    let gateway_url = spawn_gateway(app).await.expect("spawn gateway");
    let client = HttpLedgerClient::new(&gateway_url).expect("client");

    let err = client
        .send_memo(SendMemoInstruction {
            memo: "hi",
            payer: "PayerAddr",
            co_signers: &[],
        })
        .await
        .expect_err("rejected");
    assert_eq!(err.to_string(), "User rejected the request.");
}

#[tokio::test]
async fn gateway_message_with_unrecognized_code_is_returned_verbatim() {
    let app = Router::new().route("/memos", post(missing_program));
    let gateway_url = spawn_gateway(app).await.expect("spawn gateway");
    let client = HttpLedgerClient::new(&gateway_url).expect("client");

    let err = client
        .send_memo(SendMemoInstruction {
            memo: "hi",
            payer: "PayerAddr",
            co_signers: &[],
        })
        .await
        .expect_err("not found");
    assert_eq!(err.to_string(), "Program account not found");
}

#[tokio::test]
async fn gateway_message_without_code_is_returned_verbatim() {
    let app = Router::new().route("/memos", post(fail_without_code));
    let gateway_url = spawn_gateway(app).await.expect("spawn gateway");
    let client = HttpLedgerClient::new(&gateway_url).expect("client");

    let err = client
        .send_memo(SendMemoInstruction {
            memo: "hi",
            payer: "PayerAddr",
            co_signers: &[],
        })
        .await
        .expect_err("simulation failed");
    assert_eq!(err.to_string(), "Transaction simulation failed");
}

#[tokio::test]
async fn non_json_error_body_includes_status() {
    let app = Router::new().route("/memos", post(fail_plain));
    let gateway_url = spawn_gateway(app).await.expect("spawn gateway");
    let client = HttpLedgerClient::new(&gateway_url).expect("client");

    let err = client
        .send_memo(SendMemoInstruction {
            memo: "hi",
            payer: "PayerAddr",
            co_signers: &[],
        })
        .await
        .expect_err("bad gateway");
    let message = err.to_string();
    assert!(message.contains("502"), "{message}");
    assert!(message.contains("upstream rpc down"), "{message}");
}
