use std::sync::Arc;

use shared::domain::MemoRecord;
use storage::{MemoLedgerCache, Storage};

fn sqlite_url(path: &std::path::Path) -> String {
    format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"))
}

#[tokio::test]
async fn history_survives_reopening_the_profile_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let database_url = sqlite_url(&dir.path().join("profile").join("memochain.db"));

    {
        let storage = Storage::new(&database_url).await.expect("open");
        let mut cache = MemoLedgerCache::new(Arc::new(storage.clone()));
        cache.load().await;
        for (signature, text) in [("SIG-A", "first"), ("SIG-B", "second")] {
            cache
                .append(MemoRecord {
                    signature: signature.to_string(),
                    text: text.to_string(),
                    created_at: 1_712_000_000_000,
                    signer_addresses: vec!["Wallet111".to_string()],
                })
                .await
                .expect("append");
        }
        storage.pool().close().await;
    }

    let storage = Storage::new(&database_url).await.expect("reopen");
    let mut cache = MemoLedgerCache::new(Arc::new(storage.clone()));
    let records = cache.load().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].signature, "SIG-B");
    assert_eq!(records[1].text, "first");

    cache.clear().await.expect("clear");
    drop(cache);

    let mut after_clear = MemoLedgerCache::new(Arc::new(storage));
    assert!(after_clear.load().await.is_empty());
}
