//! Read access shared by every keyed store.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::pagination::{PageRequest, PageResponse};

/// Keyed reads over a table.
///
/// Only reads live here. Writes need transaction handles and
/// entity-specific invariants, so they stay on the concrete repository.
#[async_trait]
pub trait Repository<Entity, Id>: Send + Sync
where
    Entity: Send + 'static,
    Id: Send + Sync,
{
    /// Load one row, deleted or not.
    async fn find_by_id(&self, id: &Id) -> AppResult<Option<Entity>>;

    /// Load every row whose key is in `ids`. Unknown keys are skipped.
    async fn find_many(&self, ids: &[Id]) -> AppResult<Vec<Entity>>;

    /// Page through the live rows.
    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Entity>>;

    /// Number of live rows.
    async fn count(&self) -> AppResult<u64>;
}
