use super::dto::PaginateArgs;
use crate::domain::{
    filter::entity::Filter,
    model::entity::ModelDefinition,
    pagination::{envelope::PaginationEnvelope, errors::PaginateError, resolver::PaginationResolver},
    record::repository::RecordStore,
};
use tracing::{debug, instrument, warn};

/// Paginates one model: normalize, then fetch and count concurrently, then assemble.
pub struct PaginateUseCase {
    resolver: PaginationResolver,
    store: Box<dyn RecordStore>,
}

impl PaginateUseCase {
    pub fn new(resolver: PaginationResolver, store: Box<dyn RecordStore>) -> Self {
        Self { resolver, store }
    }

    pub fn model(&self) -> &ModelDefinition {
        self.resolver.model()
    }

    pub async fn execute(
        &self,
        args: impl Into<PaginateArgs>,
    ) -> Result<PaginationEnvelope, PaginateError> {
        self.run(args.into()).await
    }

    /// Callback flavour of [`execute`](Self::execute). `callback` runs exactly
    /// once with the outcome.
    pub async fn execute_with_callback<F>(&self, args: impl Into<PaginateArgs>, callback: F)
    where
        F: FnOnce(Result<PaginationEnvelope, PaginateError>),
    {
        callback(self.run(args.into()).await);
    }

    #[instrument(skip(self, args), fields(model = %self.resolver.model().name))]
    async fn run(&self, args: PaginateArgs) -> Result<PaginationEnvelope, PaginateError> {
        let descriptor = self.resolver.normalize(&args.query, &args.options)?;

        // The count sees the filter only, never the page window.
        let count_filter = descriptor.filter.clone().unwrap_or_else(Filter::empty);

        let (items, total) = tokio::try_join!(
            self.store.fetch_page(&descriptor),
            self.store.count_matching(&count_filter),
        )
        .inspect_err(|e| warn!(error = %e, "Record store call failed"))?;

        let envelope = self.resolver.assemble(items, total, &descriptor);
        debug!(counters = ?envelope.counters, "Assembled pagination envelope");
        Ok(envelope)
    }
}
