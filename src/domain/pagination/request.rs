use crate::domain::filter::entity::Filter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use ts_rs::TS;

/// Key of a search term that applies to every property of the model.
pub const WILDCARD: &str = "*";

/// Pagination request as sent by a caller. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RequestDescriptor {
    /// 1-based page number, translated into `skip` when no skip is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    #[serde(
        default,
        rename = "where",
        alias = "filter",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "Record<string, unknown> | null")]
    pub filter: Option<Filter>,

    /// Raw sort clause, e.g. `"name DESC, status"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,

    /// Field name (or `*`) to text pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_terms: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,

    /// Relation expansion directive, handed to the record store untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SortOrder {
    pub predicate: String,
    #[serde(default)]
    pub reverse: bool,
}

/// Per-call override, the second argument of `paginate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaginateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl PaginateOptions {
    pub fn with_limit(limit: i64) -> Self {
        Self { limit: Some(limit) }
    }
}
