use super::errors::PaginateError;
use crate::domain::filter::entity::Filter;
use serde::Serialize;
use serde_json::Value;

/// Fully resolved query handed to the record store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub skip: u64,
    pub limit: u64,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub descending: bool,
}

impl QueryDescriptor {
    /// Parses `order` into sort keys. `"name DESC, status"` yields two keys,
    /// the second ascending.
    pub fn order_keys(&self) -> Result<Vec<OrderKey>, PaginateError> {
        let Some(order) = self.order.as_deref() else {
            return Ok(Vec::new());
        };

        order
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .map(parse_order_clause)
            .collect()
    }
}

fn parse_order_clause(clause: &str) -> Result<OrderKey, PaginateError> {
    let mut parts = clause.split_whitespace();
    let field = parts.next().unwrap_or_default().to_string();
    let descending = match parts.next() {
        None => false,
        Some(direction) if direction.eq_ignore_ascii_case("asc") => false,
        Some(direction) if direction.eq_ignore_ascii_case("desc") => true,
        Some(direction) => {
            return Err(PaginateError::CollaboratorFailure(format!(
                "Unknown sort direction `{}` in order clause `{}`",
                direction, clause
            )));
        }
    };

    if parts.next().is_some() {
        return Err(PaginateError::CollaboratorFailure(format!(
            "Malformed order clause `{}`",
            clause
        )));
    }

    Ok(OrderKey { field, descending })
}
