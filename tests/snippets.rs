//! File-backed snippet history: ordering, per-owner isolation, anonymous callers.

use std::path::PathBuf;

use javarun::error::ExecError;
use javarun::snippets::{Identity, LocalSnippetStore, SnippetId, SnippetStore};

fn temp_store(test_name: &str) -> (LocalSnippetStore, PathBuf) {
    let dir = std::env::temp_dir().join(format!(
        "javarun-test-snippets-{test_name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    (LocalSnippetStore::new(dir.clone()), dir)
}

fn alice() -> Identity {
    Identity::Principal("aaaaa-aa".to_string())
}

fn bob() -> Identity {
    Identity::Principal("bbbbb-bb".to_string())
}

#[tokio::test]
async fn submit_then_list_in_submission_order() {
    let (store, dir) = temp_store("order");

    let first = store.submit(&alice(), "class A {}").await.unwrap();
    let second = store.submit(&alice(), "class B {}").await.unwrap();
    let third = store.submit(&alice(), "class C {}").await.unwrap();
    assert!(first < second && second < third, "ids must strictly increase");

    let listed = store.list(&alice()).await.unwrap();
    let codes: Vec<&str> = listed.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, ["class A {}", "class B {}", "class C {}"]);
    assert_eq!(listed[0].id, first);
    assert_eq!(listed[0].submitted_at, first.0);
    assert!(listed.iter().all(|s| s.output.is_none()));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn owners_are_isolated() {
    let (store, dir) = temp_store("isolation");

    let alice_id = store.submit(&alice(), "alice code").await.unwrap();
    store.submit(&bob(), "bob code").await.unwrap();

    let bobs = store.list(&bob()).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].code, "bob code");

    assert_eq!(store.get(&bob(), alice_id).await.unwrap(), None);
    assert!(!store.delete(&bob(), alice_id).await.unwrap());
    assert_eq!(store.list(&alice()).await.unwrap().len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn anonymous_reads_are_empty_and_submit_is_rejected() {
    let (store, dir) = temp_store("anonymous");
    store.submit(&alice(), "class A {}").await.unwrap();

    assert!(store.list(&Identity::Anonymous).await.unwrap().is_empty());
    assert!(store.search(&Identity::Anonymous, "class").await.unwrap().is_empty());
    assert_eq!(store.get(&Identity::Anonymous, SnippetId(1)).await.unwrap(), None);
    assert!(!store.delete(&Identity::Anonymous, SnippetId(1)).await.unwrap());
    store.clear(&Identity::Anonymous).await.unwrap();

    let err = store.submit(&Identity::Anonymous, "x").await.unwrap_err();
    assert!(matches!(err, ExecError::Unauthenticated));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn get_and_delete_by_id() {
    let (store, dir) = temp_store("delete");

    let keep = store.submit(&alice(), "keep me").await.unwrap();
    let drop = store.submit(&alice(), "drop me").await.unwrap();

    let fetched = store.get(&alice(), drop).await.unwrap().unwrap();
    assert_eq!(fetched.code, "drop me");

    assert!(store.delete(&alice(), drop).await.unwrap());
    assert!(!store.delete(&alice(), drop).await.unwrap(), "second delete finds nothing");

    let remaining = store.list(&alice()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn search_is_case_insensitive_and_blank_matches_all() {
    let (store, dir) = temp_store("search");

    store
        .submit(&alice(), "import java.util.Scanner;\nclass Main {}")
        .await
        .unwrap();
    store.submit(&alice(), "class Other {}").await.unwrap();

    let hits = store.search(&alice(), "scanner").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].code.contains("Scanner"));

    assert_eq!(store.search(&alice(), "   ").await.unwrap().len(), 2);
    assert!(store.search(&alice(), "nothing like this").await.unwrap().is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn clear_removes_only_the_callers_history() {
    let (store, dir) = temp_store("clear");

    store.submit(&alice(), "a1").await.unwrap();
    store.submit(&alice(), "a2").await.unwrap();
    store.submit(&bob(), "b1").await.unwrap();

    store.clear(&alice()).await.unwrap();
    assert!(store.list(&alice()).await.unwrap().is_empty());
    assert_eq!(store.list(&bob()).await.unwrap().len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn history_survives_a_new_store_instance() {
    let (store, dir) = temp_store("reopen");
    let first = store.submit(&alice(), "before restart").await.unwrap();
    drop(store);

    let reopened = LocalSnippetStore::new(dir.clone());
    let second = reopened.submit(&alice(), "after restart").await.unwrap();
    assert!(second > first);

    let codes: Vec<String> = reopened
        .list(&alice())
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.code)
        .collect();
    assert_eq!(codes, ["before restart", "after restart"]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn corrupt_lines_are_skipped() {
    let (store, dir) = temp_store("corrupt");
    store.submit(&alice(), "good").await.unwrap();

    let file = std::fs::read_dir(&dir)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let mut text = std::fs::read_to_string(&file).unwrap();
    text.push_str("{not json\n");
    std::fs::write(&file, text).unwrap();

    let listed = store.list(&alice()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].code, "good");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn concurrent_submits_all_land() {
    let (store, dir) = temp_store("concurrent");
    let store = std::sync::Arc::new(store);

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.submit(&alice(), &format!("snippet {i}")).await.unwrap()
        }));
    }
    let mut ids = Vec::new();
    for h in handles {
        ids.push(h.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8, "every submission gets a unique id");
    assert_eq!(store.list(&alice()).await.unwrap().len(), 8);

    let _ = std::fs::remove_dir_all(&dir);
}
