use crate::domain::{
    filter::entity::Filter,
    pagination::{descriptor::QueryDescriptor, errors::PaginateError},
};
use async_trait::async_trait;

/// A stored record, always a JSON object.
pub type Record = serde_json::Value;

/// Storage backing a paginated model.
///
/// Both operations are independent reads and may run concurrently. Nothing ties
/// them to one snapshot, so a write landing between them can make the count and
/// the page disagree.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records matching `descriptor`, honouring skip, limit, order and fields.
    async fn fetch_page(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>, PaginateError>;

    /// Size of the whole population matching `filter`.
    async fn count_matching(&self, filter: &Filter) -> Result<u64, PaginateError>;

    /// Appends one record.
    async fn insert(&self, record: Record) -> Result<(), PaginateError>;
}
