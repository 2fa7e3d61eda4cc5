pub mod filter;
pub mod model;
pub mod pagination;
pub mod record;
