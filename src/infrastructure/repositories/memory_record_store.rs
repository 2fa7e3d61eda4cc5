use crate::domain::{
    filter::entity::{Condition, Filter},
    pagination::{descriptor::QueryDescriptor, errors::PaginateError},
    record::{
        projection::project,
        repository::{Record, RecordStore},
    },
};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Record store kept in process memory, in insertion order.
///
/// Used for tests and for deployments without a database.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl InMemoryRecordStore {
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    #[instrument(skip(self, descriptor), fields(skip = descriptor.skip, limit = descriptor.limit))]
    async fn fetch_page(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>, PaginateError> {
        let matcher = descriptor
            .filter
            .as_ref()
            .map(Matcher::compile)
            .transpose()?;
        let order = descriptor.order_keys()?;

        if descriptor.include.is_some() {
            debug!("In-memory store has no relations, ignoring include");
        }

        let records = self.records.read().await;
        let mut matching: Vec<&Record> = records
            .iter()
            .filter(|record| matcher.as_ref().is_none_or(|m| m.matches(record)))
            .collect();

        if !order.is_empty() {
            matching.sort_by(|a, b| {
                order
                    .iter()
                    .map(|key| {
                        let ordering = compare_for_sort(a.get(&key.field), b.get(&key.field));
                        if key.descending { ordering.reverse() } else { ordering }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        let fields = descriptor.fields.as_deref().unwrap_or_default();
        let page = matching
            .into_iter()
            .skip(usize::try_from(descriptor.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(descriptor.limit).unwrap_or(usize::MAX))
            .map(|record| project(record.clone(), fields))
            .collect::<Vec<_>>();

        debug!(returned = page.len(), "Fetched in-memory page");
        Ok(page)
    }

    #[instrument(skip(self, filter))]
    async fn count_matching(&self, filter: &Filter) -> Result<u64, PaginateError> {
        let matcher = Matcher::compile(filter)?;
        let records = self.records.read().await;
        Ok(records.iter().filter(|record| matcher.matches(record)).count() as u64)
    }

    async fn insert(&self, record: Record) -> Result<(), PaginateError> {
        self.records.write().await.push(record);
        Ok(())
    }
}

/// A [`Filter`] with its like patterns compiled, evaluated once per record.
enum Matcher {
    All(Vec<Matcher>),
    Any(Vec<Matcher>),
    Field { field: String, test: FieldTest },
}

enum FieldTest {
    Condition(Condition),
    Like { regex: Regex, negated: bool },
}

impl Matcher {
    fn compile(filter: &Filter) -> Result<Self, PaginateError> {
        Ok(match filter {
            Filter::And(terms) => Matcher::All(terms.iter().map(Matcher::compile).collect::<Result<_, _>>()?),
            Filter::Or(terms) => Matcher::Any(terms.iter().map(Matcher::compile).collect::<Result<_, _>>()?),
            Filter::Field { field, condition } => {
                let test = match condition {
                    Condition::Like {
                        pattern,
                        case_insensitive,
                    } => FieldTest::Like {
                        regex: like_regex(pattern, *case_insensitive)?,
                        negated: false,
                    },
                    Condition::NotLike {
                        pattern,
                        case_insensitive,
                    } => FieldTest::Like {
                        regex: like_regex(pattern, *case_insensitive)?,
                        negated: true,
                    },
                    other => FieldTest::Condition(other.clone()),
                };
                Matcher::Field {
                    field: field.clone(),
                    test,
                }
            }
        })
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            Matcher::All(terms) => terms.iter().all(|m| m.matches(record)),
            Matcher::Any(terms) => terms.iter().any(|m| m.matches(record)),
            Matcher::Field { field, test } => {
                let value = record.get(field.as_str()).filter(|v| !v.is_null());
                match test {
                    FieldTest::Like { regex, negated } => {
                        let hit = value
                            .and_then(text_of)
                            .is_some_and(|text| regex.is_match(&text));
                        hit != *negated
                    }
                    FieldTest::Condition(condition) => test_condition(condition, value),
                }
            }
        }
    }
}

fn test_condition(condition: &Condition, value: Option<&Value>) -> bool {
    let cmp = |operand: &Value| value.and_then(|v| compare(v, operand));
    match condition {
        Condition::Eq(operand) => equals(value, operand),
        Condition::Neq(operand) => !equals(value, operand),
        Condition::Gt(operand) => cmp(operand) == Some(Ordering::Greater),
        Condition::Gte(operand) => cmp(operand).is_some_and(Ordering::is_ge),
        Condition::Lt(operand) => cmp(operand) == Some(Ordering::Less),
        Condition::Lte(operand) => cmp(operand).is_some_and(Ordering::is_le),
        Condition::Inq(operands) => operands.iter().any(|o| equals(value, o)),
        Condition::Nin(operands) => !operands.iter().any(|o| equals(value, o)),
        Condition::Between(lower, upper) => {
            cmp(lower).is_some_and(Ordering::is_ge) && cmp(upper).is_some_and(Ordering::is_le)
        }
        Condition::Exists(expected) => value.is_some() == *expected,
        // Compiled into FieldTest::Like.
        Condition::Like { .. } | Condition::NotLike { .. } => false,
    }
}

fn equals(value: Option<&Value>, operand: &Value) -> bool {
    match value {
        None => operand.is_null(),
        Some(value) => value == operand || compare(value, operand) == Some(Ordering::Equal),
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Integers compare exactly; only fractional values go through `f64`.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (a.as_i64(), b.as_i64(), a.as_u64(), b.as_u64()) {
        (Some(a), Some(b), _, _) => Some(a.cmp(&b)),
        (_, _, Some(a), Some(b)) => Some(a.cmp(&b)),
        // Negative against a value above i64::MAX.
        (Some(_), None, _, Some(_)) => Some(Ordering::Less),
        (None, Some(_), Some(_), _) => Some(Ordering::Greater),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Total order for sorting: missing and null first, then booleans, numbers, strings.
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(x), Some(y)) => compare(x, y).unwrap_or_else(|| rank(a).cmp(&rank(b))),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Translates a SQL-style like pattern into an unanchored regex: `%` is any run
/// (newlines included), `_` a single character, `\` escapes the next character and
/// everything else is literal. A trailing lone `\` is literal.
fn like_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, PaginateError> {
    fn literal(ch: char, source: &mut String) {
        source.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4])));
    }

    let mut source = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            '\\' => literal(chars.next().unwrap_or('\\'), &mut source),
            other => literal(other, &mut source),
        }
    }

    RegexBuilder::new(&source)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| PaginateError::CollaboratorFailure(format!("Invalid like pattern `{}`: {}", pattern, e)))
}
