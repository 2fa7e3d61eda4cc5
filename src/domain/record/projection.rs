use super::repository::Record;
use serde_json::Value;

/// Keeps only `fields` on an object record. An empty field list keeps everything.
pub fn project(record: Record, fields: &[String]) -> Record {
    match record {
        Value::Object(object) if !fields.is_empty() => Value::Object(
            object
                .into_iter()
                .filter(|(key, _)| fields.iter().any(|field| field == key))
                .collect(),
        ),
        other => other,
    }
}
