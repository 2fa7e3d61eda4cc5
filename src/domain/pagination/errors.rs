use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaginateError {
    /// Rejected before any record store call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The record store failed to fetch or count.
    #[error("Collaborator failure: {0}")]
    CollaboratorFailure(String),
}
