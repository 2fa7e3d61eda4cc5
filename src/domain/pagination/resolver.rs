//! Turns a loosely specified pagination request into one consistent query.
//!
//! Resolution order, later steps winning over earlier ones:
//!
//! 1. limit: request, then model default, then [`FALLBACK_LIMIT`]; a per-call
//!    override replaces it; `max_limit` clamps whatever came out.
//! 2. skip: a non-zero `skip`, else `(page - 1) * limit`, else 0.
//! 3. filter: non-empty `searchTerms` are expanded and replace `where` outright.
//!    Callers rely on this precedence, so `where` is dropped rather than merged.
//! 4. order: `sortOrder` is rendered as `"<predicate> ASC|DESC"` and takes
//!    priority over a raw `order`.
//! 5. `fields` and `include` pass through untouched.
//!
//! `normalize` never mutates the request and holds no state besides the
//! configuration it was built with, so identical inputs give identical output.

use super::{
    descriptor::QueryDescriptor,
    envelope::{PaginationEnvelope, assemble},
    errors::PaginateError,
    request::{PaginateOptions, RequestDescriptor},
    search::expand_search_terms,
};
use crate::domain::{
    filter::entity::Filter, model::entity::ModelDefinition, record::repository::Record,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Page size used when neither the request nor the model configures one.
pub const FALLBACK_LIMIT: i64 = 10;

/// Per-model pagination settings, bound once at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Default page size.
    pub limit: Option<i64>,
    /// Hard ceiling applied after every other limit source.
    pub max_limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PaginationResolver {
    model: ModelDefinition,
    config: ResolverConfig,
}

impl PaginationResolver {
    pub fn new(model: ModelDefinition, config: ResolverConfig) -> Self {
        debug!(model = %model.name, ?config, "Binding pagination resolver");
        Self { model, config }
    }

    pub fn model(&self) -> &ModelDefinition {
        &self.model
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn normalize(
        &self,
        request: &RequestDescriptor,
        options: &PaginateOptions,
    ) -> Result<QueryDescriptor, PaginateError> {
        let limit = self.resolve_limit(request, options)?;
        let skip = resolve_skip(request, limit)?;
        let filter = self.resolve_filter(request);
        let order = resolve_order(request);

        let descriptor = QueryDescriptor {
            skip,
            limit,
            filter,
            order,
            fields: request.fields.clone(),
            include: request.include.clone(),
        };
        debug!(model = %self.model.name, ?descriptor, "Resolved query descriptor");
        Ok(descriptor)
    }

    pub fn assemble(
        &self,
        items: Vec<Record>,
        total: u64,
        descriptor: &QueryDescriptor,
    ) -> PaginationEnvelope {
        assemble(items, total, descriptor)
    }

    fn resolve_limit(
        &self,
        request: &RequestDescriptor,
        options: &PaginateOptions,
    ) -> Result<u64, PaginateError> {
        let (mut limit, mut source) = match (request.limit, self.config.limit) {
            (Some(limit), _) => (limit, "request"),
            (None, Some(limit)) => (limit, "model default"),
            (None, None) => (FALLBACK_LIMIT, "fallback"),
        };

        if let Some(overridden) = options.limit {
            limit = overridden;
            source = "per-call override";
        }

        if let Some(max_limit) = self.config.max_limit {
            if limit > max_limit {
                debug!(limit, max_limit, source, "Clamping limit to maxLimit");
                limit = max_limit;
                source = "maxLimit";
            }
        }

        if limit <= 0 {
            return Err(PaginateError::InvalidArgument(format!(
                "limit must be a positive number, got {} from {}",
                limit, source
            )));
        }

        debug!(limit, source, "Resolved limit");
        Ok(limit as u64)
    }

    fn resolve_filter(&self, request: &RequestDescriptor) -> Option<Filter> {
        match request.search_terms.as_ref().filter(|terms| !terms.is_empty()) {
            Some(terms) => {
                if request.filter.is_some() {
                    debug!(model = %self.model.name, "searchTerms supersede the explicit where filter");
                }
                Some(expand_search_terms(terms, &self.model))
            }
            None => request.filter.clone(),
        }
    }
}

fn resolve_skip(request: &RequestDescriptor, limit: u64) -> Result<u64, PaginateError> {
    match (request.skip, request.page) {
        (Some(skip), _) if skip < 0 => Err(PaginateError::InvalidArgument(format!(
            "skip must not be negative, got {}",
            skip
        ))),
        (Some(skip), _) if skip != 0 => {
            debug!(skip, "Using explicit skip");
            Ok(skip as u64)
        }
        (_, Some(page)) if page <= 0 => Err(PaginateError::InvalidArgument(format!(
            "page must be a positive number, got {}",
            page
        ))),
        (_, Some(page)) => {
            let skip = (page as u64 - 1).checked_mul(limit).ok_or_else(|| {
                PaginateError::InvalidArgument(format!(
                    "page {} with limit {} overflows the skip offset",
                    page, limit
                ))
            })?;
            debug!(page, skip, "Derived skip from page");
            Ok(skip)
        }
        _ => Ok(0),
    }
}

fn resolve_order(request: &RequestDescriptor) -> Option<String> {
    match request
        .sort_order
        .as_ref()
        .filter(|sort| !sort.predicate.trim().is_empty())
    {
        Some(sort) => {
            let direction = if sort.reverse { "DESC" } else { "ASC" };
            if request.order.is_some() {
                debug!("sortOrder takes priority over order");
            }
            Some(format!("{} {}", sort.predicate.trim(), direction))
        }
        None => request.order.clone(),
    }
}
