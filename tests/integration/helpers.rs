//! Shared test helpers for integration tests.
//!
//! Tests run against the PostgreSQL database named by
//! `DOCTREE_TEST_DATABASE_URL` and are skipped when it is unset. Each test
//! gets its own random `space_id`, so tests can share one database.

#![allow(dead_code)]

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use doctree_core::config::{DatabaseConfig, TreeConfig};
use doctree_database::{DatabasePool, NodeRepository};
use doctree_entity::node::{NewNode, Node, Placement};
use doctree_service::{DocumentService, TreeService};

/// Environment variable naming the test database.
pub const DATABASE_URL_VAR: &str = "DOCTREE_TEST_DATABASE_URL";

/// Test store context
pub struct TestStore {
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Node repository
    pub node_repo: Arc<NodeRepository>,
    /// Tree mutations
    pub tree: TreeService,
    /// Reads and versioned writes
    pub docs: DocumentService,
    /// Tree settings used by the services
    pub config: TreeConfig,
    /// Space owned by this test
    pub space_id: i64,
}

impl TestStore {
    /// Connect and migrate, or `None` when no test database is configured.
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
            eprintln!("{DATABASE_URL_VAR} not set, skipping");
            return None;
        };

        let db = DatabasePool::connect(&DatabaseConfig {
            max_connections: 5,
            min_connections: 1,
            ..DatabaseConfig::with_url(url)
        })
        .await
        .expect("Failed to connect to test database");

        doctree_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let db_pool = db.pool().clone();
        let config = TreeConfig::default();
        let node_repo = Arc::new(NodeRepository::new(db_pool.clone()));

        Some(Self {
            tree: TreeService::new(Arc::clone(&node_repo), config.clone()),
            docs: DocumentService::new(Arc::clone(&node_repo), config.clone()),
            db_pool,
            node_repo,
            config,
            space_id: random_space_id(),
        })
    }

    /// Create a root-level folder in this test's space.
    pub async fn folder(&self, title: &str) -> Node {
        self.create(NewNode::folder(title)).await
    }

    /// Create a folder under `parent_id`.
    pub async fn folder_in(&self, parent_id: i64, title: &str) -> Node {
        self.create(NewNode::folder(title).under(parent_id)).await
    }

    /// Create a document under `parent_id`.
    pub async fn document_in(&self, parent_id: i64, title: &str) -> Node {
        self.create(NewNode::document(title, format!("# {title}")).under(parent_id))
            .await
    }

    /// Create a node in this test's space.
    pub async fn create(&self, new: NewNode) -> Node {
        self.tree
            .create(new.in_space(self.space_id))
            .await
            .expect("Failed to create node")
    }

    /// Reload a node, failing the test if it is gone.
    pub async fn reload(&self, id: i64) -> Node {
        self.docs
            .read_by_id(id)
            .await
            .expect("Failed to read node")
            .expect("Node disappeared")
    }

    /// Ids of the active children of `parent_id` in sibling order.
    pub async fn child_ids(&self, parent_id: Option<i64>) -> Vec<i64> {
        self.docs
            .list_children(Some(self.space_id), parent_id)
            .await
            .expect("Failed to list children")
            .iter()
            .map(|n| n.id)
            .collect()
    }

    /// Move a node and return the refreshed row.
    pub async fn move_to(&self, id: i64, parent_id: Option<i64>, placement: Placement) -> Node {
        self.tree
            .move_node(id, parent_id, placement)
            .await
            .expect("Failed to move node")
    }
}

/// A space id no other test run will pick.
pub fn random_space_id() -> i64 {
    ((Uuid::new_v4().as_u128() as i64) & i64::MAX).max(1)
}

/// A string unique to this test run.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}
