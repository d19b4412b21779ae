//! History store behaviour against an on-disk database.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chatlog::history::{HistoryError, HistoryStore};
use common::{append_all, file_store};
use tempfile::TempDir;

#[tokio::test]
async fn test_fresh_location_reads_empty() {
    let (_temp, path, store) = file_store().await;
    assert!(path.exists());
    assert!(store.is_healthy().await);
    assert!(store.recent_history(42, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reverse_insertion_order() {
    let (_temp, _path, store) = file_store().await;
    let texts: Vec<String> = (0..25).map(|i| format!("message {i}")).collect();
    for text in &texts {
        store.append(1, text).await.unwrap();
    }

    let history = store.recent_history(1, texts.len() as i64).await.unwrap();
    let expected: Vec<String> = texts.iter().rev().cloned().collect();
    assert_eq!(history, expected);
}

#[tokio::test]
async fn test_smaller_limits_are_prefixes() {
    let (_temp, _path, store) = file_store().await;
    append_all(&store, 2, &["a", "b", "c", "d", "e", "f"]).await;

    let full = store.recent_history(2, 100).await.unwrap();
    assert_eq!(full, vec!["f", "e", "d", "c", "b", "a"]);

    for k in 1..=6 {
        let partial = store.recent_history(2, k).await.unwrap();
        assert_eq!(partial.len(), k as usize);
        assert_eq!(partial[..], full[..k as usize]);
    }
}

#[tokio::test]
async fn test_purge_then_read_is_empty() {
    let (_temp, _path, store) = file_store().await;
    append_all(&store, 3, &["one", "two"]).await;

    assert_eq!(store.purge(3).await.unwrap(), 2);
    assert!(store.recent_history(3, 1).await.unwrap().is_empty());
    assert!(store.recent_history(3, 1000).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_purge_leaves_other_users_alone() {
    let (_temp, _path, store) = file_store().await;
    append_all(&store, 10, &["a1", "a2", "a3"]).await;
    append_all(&store, 11, &["b1", "b2"]).await;

    let before = store.recent_history(11, 10).await.unwrap();
    assert_eq!(store.purge(10).await.unwrap(), 3);
    assert_eq!(store.recent_history(11, 10).await.unwrap(), before);
    assert_eq!(store.count(11).await.unwrap(), 2);
}

#[tokio::test]
async fn test_purge_unknown_user_reports_zero() {
    let (_temp, _path, store) = file_store().await;
    assert_eq!(store.purge(999).await.unwrap(), 0);
    assert_eq!(store.purge(999).await.unwrap(), 0);
}

#[tokio::test]
async fn test_scenario_user_seven() {
    let (_temp, _path, store) = file_store().await;
    store.append(7, "hello").await.unwrap();
    store.append(7, "hi there").await.unwrap();

    assert_eq!(store.recent_history(7, 1).await.unwrap(), vec!["hi there"]);
    assert_eq!(
        store.recent_history(7, 5).await.unwrap(),
        vec!["hi there", "hello"]
    );
}

#[tokio::test]
async fn test_text_stored_verbatim() {
    let (_temp, _path, store) = file_store().await;
    let long = "x".repeat(100_000);
    let odd = "  line one\nline two\t'quoted' \"double\" 🦀  ";
    append_all(&store, 5, &[long.as_str(), odd, ""]).await;

    let history = store.recent_history(5, 3).await.unwrap();
    assert_eq!(history, vec!["".to_string(), odd.to_string(), long]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_are_not_lost() {
    let (_temp, _path, store) = file_store().await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.append(77, &format!("parallel {i}")).await.unwrap()
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }
    assert_eq!(ids.len(), 50);

    assert_eq!(store.count(77).await.unwrap(), 50);
    let history: HashSet<String> = store
        .recent_history(77, 100)
        .await
        .unwrap()
        .into_iter()
        .collect();
    let expected: HashSet<String> = (0..50).map(|i| format!("parallel {i}")).collect();
    assert_eq!(history, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_see_whole_records() {
    let (_temp, _path, store) = file_store().await;
    let payload = "y".repeat(4096);

    let writer = {
        let store = Arc::clone(&store);
        let payload = payload.clone();
        tokio::spawn(async move {
            for _ in 0..30 {
                store.append(8, &payload).await.unwrap();
            }
        })
    };

    for _ in 0..30 {
        for text in store.recent_history(8, 5).await.unwrap() {
            assert_eq!(text, payload);
        }
    }
    writer.await.unwrap();
    assert_eq!(store.count(8).await.unwrap(), 30);
}

#[tokio::test]
async fn test_history_survives_restart() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data").join("history.db");

    let store = HistoryStore::open(&path).await.unwrap();
    append_all(&store, 1, &["before restart"]).await;
    store.shutdown().await;
    assert!(matches!(
        store.recent_history(1, 10).await,
        Err(HistoryError::NotInitialized)
    ));

    let reopened = HistoryStore::open(&path).await.unwrap();
    assert_eq!(
        reopened.recent_history(1, 10).await.unwrap(),
        vec!["before restart"]
    );
    reopened.shutdown().await;
}

#[tokio::test]
async fn test_recent_records_match_history() {
    let (_temp, _path, store) = file_store().await;
    let first = store.append(4, "first").await.unwrap();
    let second = store.append(4, "second").await.unwrap();

    let records = store.recent_records(4, 10).await.unwrap();
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert!(records.iter().all(|r| r.user_id == 4));
    assert!(records[0].created_at >= records[1].created_at);
}
