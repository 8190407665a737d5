//! Integration tests for the startup repair sweep.

mod helpers;

use std::sync::Arc;

use serde_json::json;

use doctree_database::DatabasePool;
use doctree_worker::MigrationSweeper;

use helpers::TestStore;

/// Insert a row the way a legacy import left it: no slug, jrn, or path.
async fn insert_legacy(
    store: &TestStore,
    doc_type: &str,
    parent_id: Option<i64>,
    sort_order: f64,
    title: &str,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO docs (doc_type, space_id, parent_id, sort_order, content_metadata) \
         VALUES ($1::doc_type, $2, $3, $4, $5) RETURNING id",
    )
    .bind(doc_type)
    .bind(store.space_id)
    .bind(parent_id)
    .bind(sort_order)
    .bind(json!({ "title": title }))
    .fetch_one(&store.db_pool)
    .await
    .expect("Failed to insert legacy row")
}

#[tokio::test]
async fn test_sweep_repairs_legacy_rows() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let root_id = insert_legacy(&store, "folder", None, 1.0, "Legacy Root").await;
    let first = insert_legacy(&store, "document", Some(root_id), 1.0, "First").await;
    let second = insert_legacy(&store, "document", Some(root_id), 1.0, "Second").await;
    let third = insert_legacy(&store, "document", Some(root_id), 0.5, "Third").await;

    let sweeper = MigrationSweeper::new(Arc::clone(&store.node_repo), &store.config);
    let report = sweeper.run().await;
    assert!(report.is_clean(), "failed passes: {:?}", report.failed);
    assert!(report.repaired_by("backfill_slugs").unwrap_or(0) >= 4);
    assert!(report.repaired_by("backfill_jrns").unwrap_or(0) >= 4);

    let root = store.reload(root_id).await;
    assert!(root.slug.starts_with("legacy-root-"));
    assert_eq!(root.jrn, format!("jrn:docs:folder/{}", root.slug));
    assert_eq!(root.path, format!("/{}", root.slug));

    let first = store.reload(first).await;
    assert!(first.slug.starts_with("first-"));
    assert_eq!(first.jrn, format!("jrn:docs:document/{}", first.slug));
    assert_eq!(first.path, format!("{}/{}", root.path, first.slug));

    // Third sorted first; the tied pair keeps id order.
    assert_eq!(store.child_ids(Some(root_id)).await, vec![third, first.id, second]);
    let orders: Vec<f64> = store
        .docs
        .list_children(Some(store.space_id), Some(root_id))
        .await
        .unwrap()
        .iter()
        .map(|n| n.sort_order)
        .collect();
    assert_eq!(orders, vec![1.0, 2.0, 3.0]);

    // A second sweep leaves repaired rows alone.
    sweeper.run().await;
    assert_eq!(store.reload(root_id).await, root);
    assert_eq!(store.reload(first.id).await, first);
}

#[tokio::test]
async fn test_startup_health_check() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let db = DatabasePool::from_pool(store.db_pool.clone());
    assert!(db.health_check().await.unwrap());
}
