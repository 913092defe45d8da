use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use medialib_core::MediaKind;
use medialib_db::IndexStore;

fn count_albums(store: &IndexStore) -> i64 {
    store
        .lock()
        .query_row("SELECT COUNT(*) FROM albums", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn commit_persists() {
    let store = IndexStore::open_memory().unwrap();
    let tx = store.transaction().unwrap();
    medialib_db::insert_album(&tx, "A", "Pictures/A/", 1).unwrap();
    tx.commit().unwrap();
    assert_eq!(count_albums(&store), 1);
}

#[test]
fn drop_without_commit_rolls_back() {
    let store = IndexStore::open_memory().unwrap();
    {
        let tx = store.transaction().unwrap();
        medialib_db::insert_album(&tx, "A", "Pictures/A/", 1).unwrap();
    }
    assert_eq!(count_albums(&store), 0);
}

#[test]
fn double_rollback_is_a_no_op() {
    let store = IndexStore::open_memory().unwrap();
    let mut tx = store.transaction().unwrap();
    medialib_db::insert_album(&tx, "A", "Pictures/A/", 1).unwrap();
    tx.rollback().unwrap();
    assert!(!tx.is_active());
    tx.rollback().unwrap();
    drop(tx);
    assert_eq!(count_albums(&store), 0);
}

#[test]
fn concurrent_unique_numbers_are_distinct() {
    let store = Arc::new(IndexStore::open_memory().unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..25)
                    .map(|_| store.next_unique_number(MediaKind::Audio).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for n in handle.join().unwrap() {
            assert!(seen.insert(n), "number {n} issued twice");
        }
    }
    assert_eq!(seen.len(), 200);
    assert_eq!(seen.iter().max(), Some(&200));
}

#[test]
fn unique_numbers_distinct_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.db");
    let a = Arc::new(IndexStore::open(&path).unwrap());
    let b = Arc::new(IndexStore::open(&path).unwrap());

    let handles: Vec<_> = [a, b]
        .into_iter()
        .map(|store| {
            thread::spawn(move || {
                (0..50)
                    .map(|_| store.next_unique_number(MediaKind::Image).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for n in handle.join().unwrap() {
            assert!(seen.insert(n), "number {n} issued twice");
        }
    }
    assert_eq!(seen.len(), 100);
}
