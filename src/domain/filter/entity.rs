//! Predicate tree accepted as the `where` clause of a pagination request.
//!
//! The JSON dialect is the one model filters have always used:
//!
//! ```json
//! { "status": "active", "or": [{ "name": { "like": "Item1" } }, { "rank": { "gte": 3 } }] }
//! ```
//!
//! Every key of an object is one AND-ed term. `and` / `or` take arrays of nested
//! filters, a scalar field value means equality, and an object field value holds
//! operators (`eq`, `neq`, `gt`, `gte`, `lt`, `lte`, `inq`, `nin`, `between`,
//! `like`, `nlike`, `exists`). A sibling `options: "i"` makes `like`/`nlike`
//! case-insensitive.

use super::errors::FilterError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Field { field: String, condition: Condition },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    Neq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Inq(Vec<Value>),
    Nin(Vec<Value>),
    Between(Value, Value),
    Like {
        pattern: String,
        case_insensitive: bool,
    },
    NotLike {
        pattern: String,
        case_insensitive: bool,
    },
    Exists(bool),
}

impl Filter {
    /// The filter that matches every record.
    pub fn empty() -> Self {
        Filter::And(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Filter::And(terms) if terms.is_empty())
    }

    pub fn field(field: impl Into<String>, condition: Condition) -> Self {
        Filter::Field {
            field: field.into(),
            condition,
        }
    }

    /// Case-insensitive `like` on one field, the building block of search terms.
    pub fn like_ci(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::field(
            field,
            Condition::Like {
                pattern: pattern.into(),
                case_insensitive: true,
            },
        )
    }
}

impl TryFrom<Value> for Filter {
    type Error = FilterError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let object = match value {
            Value::Object(object) => object,
            other => return Err(FilterError::NotAnObject(kind_of(&other).to_string())),
        };

        let mut terms = Vec::with_capacity(object.len());
        for (key, value) in object {
            match key.as_str() {
                "and" => terms.push(Filter::And(parse_list("and", value)?)),
                "or" => terms.push(Filter::Or(parse_list("or", value)?)),
                _ => terms.extend(parse_field(key, value)?),
            }
        }

        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(Filter::And(terms))
        }
    }
}

fn parse_list(operator: &'static str, value: Value) -> Result<Vec<Filter>, FilterError> {
    match value {
        Value::Array(items) => items.into_iter().map(Filter::try_from).collect(),
        _ => Err(FilterError::InvalidOperand {
            operator,
            expected: "an array of filters",
        }),
    }
}

fn parse_field(field: String, value: Value) -> Result<Vec<Filter>, FilterError> {
    let mut operators = match value {
        Value::Object(operators) => operators,
        scalar => return Ok(vec![Filter::field(field, Condition::Eq(scalar))]),
    };

    let case_insensitive = match operators.remove("options") {
        None => false,
        Some(Value::String(flags)) => flags.contains('i'),
        Some(_) => {
            return Err(FilterError::InvalidOperand {
                operator: "options",
                expected: "a string of regex flags",
            });
        }
    };

    if operators.is_empty() {
        return Err(FilterError::EmptyCondition(field));
    }

    let mut filters = Vec::with_capacity(operators.len());
    for (operator, operand) in operators {
        let condition = match operator.as_str() {
            "eq" => Condition::Eq(operand),
            "neq" => Condition::Neq(operand),
            "gt" => Condition::Gt(operand),
            "gte" => Condition::Gte(operand),
            "lt" => Condition::Lt(operand),
            "lte" => Condition::Lte(operand),
            "inq" => Condition::Inq(expect_array("inq", operand)?),
            "nin" => Condition::Nin(expect_array("nin", operand)?),
            "between" => {
                let mut bounds = expect_array("between", operand)?;
                if bounds.len() != 2 {
                    return Err(FilterError::InvalidOperand {
                        operator: "between",
                        expected: "exactly two bounds",
                    });
                }
                let upper = bounds.remove(1);
                Condition::Between(bounds.remove(0), upper)
            }
            "like" => Condition::Like {
                pattern: expect_string("like", operand)?,
                case_insensitive,
            },
            "nlike" => Condition::NotLike {
                pattern: expect_string("nlike", operand)?,
                case_insensitive,
            },
            "exists" => match operand {
                Value::Bool(flag) => Condition::Exists(flag),
                _ => {
                    return Err(FilterError::InvalidOperand {
                        operator: "exists",
                        expected: "a boolean",
                    });
                }
            },
            _ => {
                return Err(FilterError::UnknownOperator {
                    field,
                    operator: operator.clone(),
                });
            }
        };
        filters.push(Filter::field(field.clone(), condition));
    }

    Ok(filters)
}

fn expect_array(operator: &'static str, value: Value) -> Result<Vec<Value>, FilterError> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(FilterError::InvalidOperand {
            operator,
            expected: "an array",
        }),
    }
}

fn expect_string(operator: &'static str, value: Value) -> Result<String, FilterError> {
    match value {
        Value::String(pattern) => Ok(pattern),
        _ => Err(FilterError::InvalidOperand {
            operator,
            expected: "a string pattern",
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<Filter> for Value {
    fn from(filter: Filter) -> Self {
        let group = |key: &str, terms: Vec<Filter>| {
            let mut object = Map::new();
            object.insert(
                key.to_string(),
                Value::Array(terms.into_iter().map(Value::from).collect()),
            );
            Value::Object(object)
        };

        match filter {
            Filter::And(terms) => group("and", terms),
            Filter::Or(terms) => group("or", terms),
            Filter::Field { field, condition } => {
                let mut object = Map::new();
                object.insert(field, condition.into());
                Value::Object(object)
            }
        }
    }
}

impl From<Condition> for Value {
    fn from(condition: Condition) -> Self {
        let like = |operator: &str, pattern: String, case_insensitive: bool| {
            let mut object = Map::new();
            object.insert(operator.to_string(), Value::String(pattern));
            if case_insensitive {
                object.insert("options".to_string(), Value::String("i".to_string()));
            }
            Value::Object(object)
        };

        match condition {
            Condition::Eq(value) => value,
            Condition::Neq(value) => json!({ "neq": value }),
            Condition::Gt(value) => json!({ "gt": value }),
            Condition::Gte(value) => json!({ "gte": value }),
            Condition::Lt(value) => json!({ "lt": value }),
            Condition::Lte(value) => json!({ "lte": value }),
            Condition::Inq(values) => json!({ "inq": values }),
            Condition::Nin(values) => json!({ "nin": values }),
            Condition::Between(lower, upper) => json!({ "between": [lower, upper] }),
            Condition::Like {
                pattern,
                case_insensitive,
            } => like("like", pattern, case_insensitive),
            Condition::NotLike {
                pattern,
                case_insensitive,
            } => like("nlike", pattern, case_insensitive),
            Condition::Exists(flag) => json!({ "exists": flag }),
        }
    }
}
