use crate::domain::pagination::request::{PaginateOptions, RequestDescriptor};

/// Arguments of one `paginate` call.
///
/// Every accepted call shape converts into this once, at the boundary:
/// `()`, a query, an override alone, or a query with an override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginateArgs {
    pub query: RequestDescriptor,
    pub options: PaginateOptions,
}

impl From<()> for PaginateArgs {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<RequestDescriptor> for PaginateArgs {
    fn from(query: RequestDescriptor) -> Self {
        Self {
            query,
            options: PaginateOptions::default(),
        }
    }
}

impl From<PaginateOptions> for PaginateArgs {
    fn from(options: PaginateOptions) -> Self {
        Self {
            query: RequestDescriptor::default(),
            options,
        }
    }
}

impl From<(RequestDescriptor, PaginateOptions)> for PaginateArgs {
    fn from((query, options): (RequestDescriptor, PaginateOptions)) -> Self {
        Self { query, options }
    }
}
