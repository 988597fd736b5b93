//! SQLite backend specifics: idempotent open, durability across reopen,
//! identity blob round-trips, purge cutoff boundary.

mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use fixtures::{link_code, player_id, stage_request, username};
use playerlink::{LinkedPlayer, PlayerLinkStore, SqliteLinkStore, UnixTime};
use tempfile::TempDir;

#[tokio::test]
async fn reopen_is_idempotent_and_durable() {
    let dir = TempDir::new().expect("temp dir");
    let secondary = player_id(1);
    let primary = player_id(2);

    {
        let store = SqliteLinkStore::open(dir.path()).expect("first open");
        store
            .upsert_link(&LinkedPlayer {
                primary_id: primary,
                primary_name: username("Alice"),
                secondary_id: secondary,
            })
            .await
            .expect("upsert");
    }

    // Second open re-runs table creation against existing tables.
    let store = SqliteLinkStore::open(dir.path()).expect("second open");
    let link = store
        .get_link(secondary)
        .await
        .expect("get_link")
        .expect("link survived reopen");
    assert_eq!(link.primary_id, primary);
    assert_eq!(link.primary_name, username("Alice"));
}

#[tokio::test]
async fn identity_blobs_roundtrip_through_rows() {
    let dir = TempDir::new().expect("temp dir");
    let store: Arc<dyn PlayerLinkStore> =
        Arc::new(SqliteLinkStore::open(dir.path()).expect("open"));

    let primary = player_id(u64::MAX);
    let staged = stage_request(
        &store,
        "Edge",
        primary,
        "ZZZ999",
        "EdgeBE",
        UnixTime(1_726_000_000),
    )
    .await;

    let loaded = store
        .get_request(&username("Edge"))
        .await
        .expect("get_request")
        .expect("staged row");
    assert_eq!(loaded, staged);
    assert_eq!(loaded.primary_id.halves(), primary.halves());
    assert_eq!(loaded.code, link_code("ZZZ999"));
}

#[tokio::test]
async fn purge_keeps_rows_at_the_cutoff() {
    let dir = TempDir::new().expect("temp dir");
    let store: Arc<dyn PlayerLinkStore> =
        Arc::new(SqliteLinkStore::open(dir.path()).expect("open"));

    let timeout = Duration::from_secs(300);
    let now = UnixTime(10_000);
    let cutoff = now.saturating_sub(timeout);

    stage_request(&store, "AtCutoff", player_id(3), "AAA111", "AtBE", cutoff).await;
    stage_request(
        &store,
        "Below",
        player_id(4),
        "BBB222",
        "BelowBE",
        UnixTime(cutoff.0 - 1),
    )
    .await;

    let removed = store.purge_expired(now, timeout).await.expect("purge");
    assert_eq!(removed, 1);
    assert!(
        store
            .get_request(&username("AtCutoff"))
            .await
            .unwrap()
            .is_some()
    );
    assert!(store.get_request(&username("Below")).await.unwrap().is_none());
}

#[tokio::test]
async fn repeated_upsert_leaves_a_single_row() {
    let dir = TempDir::new().expect("temp dir");
    let store = SqliteLinkStore::open(dir.path()).expect("open");
    let secondary = player_id(5);

    for _ in 0..2 {
        store
            .upsert_link(&LinkedPlayer {
                primary_id: player_id(6),
                primary_name: username("Alice"),
                secondary_id: secondary,
            })
            .await
            .expect("upsert");
    }

    let conn =
        rusqlite::Connection::open(dir.path().join("playerlink.sqlite")).expect("raw open");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM linked_players", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn remove_request_on_absent_row_is_noop() {
    let dir = TempDir::new().expect("temp dir");
    let store = SqliteLinkStore::open(dir.path()).expect("open");
    store
        .remove_request(&username("Nobody"))
        .await
        .expect("remove absent");
}
