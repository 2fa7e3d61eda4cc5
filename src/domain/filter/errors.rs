use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Filter must be a JSON object, got {0}")]
    NotAnObject(String),
    #[error("Operator `{operator}` expects {expected}")]
    InvalidOperand {
        operator: &'static str,
        expected: &'static str,
    },
    #[error("Unknown operator `{operator}` on field `{field}`")]
    UnknownOperator { field: String, operator: String },
    #[error("Field `{0}` has no condition")]
    EmptyCondition(String),
}
