//! Slug and jrn backfill for rows imported without identifiers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing;

use doctree_core::error::ErrorKind;
use doctree_database::repositories::NodeRepository;
use doctree_service::tree::slug::{derive_jrn, derive_slug};

use super::{PassError, RepairPass};

/// Gives every slug-less node a slug derived from its title.
#[derive(Debug)]
pub struct SlugBackfillPass {
    /// Node repository
    node_repo: Arc<NodeRepository>,
    /// Length of the random slug suffix
    suffix_len: usize,
}

impl SlugBackfillPass {
    /// Create a new slug backfill pass
    pub fn new(node_repo: Arc<NodeRepository>, suffix_len: usize) -> Self {
        Self {
            node_repo,
            suffix_len,
        }
    }
}

#[async_trait]
impl RepairPass for SlugBackfillPass {
    fn name(&self) -> &str {
        "backfill_slugs"
    }

    async fn run(&self) -> Result<u64, PassError> {
        let nodes = self
            .node_repo
            .find_missing_slugs()
            .await
            .map_err(PassError::Scan)?;

        let mut fixed = 0;
        for node in &nodes {
            let slug = derive_slug(node.title(), self.suffix_len);
            if self.node_repo.set_slug(node.id, &slug).await? {
                tracing::debug!(node_id = node.id, slug = %slug, "Slug backfilled");
                fixed += 1;
            }
        }
        Ok(fixed)
    }
}

/// Gives every jrn-less node the jrn derived from its kind and slug.
#[derive(Debug)]
pub struct JrnBackfillPass {
    /// Node repository
    node_repo: Arc<NodeRepository>,
}

impl JrnBackfillPass {
    /// Create a new jrn backfill pass
    pub fn new(node_repo: Arc<NodeRepository>) -> Self {
        Self { node_repo }
    }
}

#[async_trait]
impl RepairPass for JrnBackfillPass {
    fn name(&self) -> &str {
        "backfill_jrns"
    }

    async fn run(&self) -> Result<u64, PassError> {
        let nodes = self
            .node_repo
            .find_missing_jrns()
            .await
            .map_err(PassError::Scan)?;

        let mut fixed = 0;
        for node in &nodes {
            let jrn = derive_jrn(node.doc_type, &node.slug);
            match self.node_repo.set_jrn(node.id, &jrn).await {
                Ok(true) => fixed += 1,
                Ok(false) => {}
                // Legacy rows can share a slug; leave the later one for manual review.
                Err(e) if e.is(ErrorKind::Conflict) => {
                    tracing::warn!(node_id = node.id, jrn = %jrn, "Derived jrn already taken, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(fixed)
    }
}
