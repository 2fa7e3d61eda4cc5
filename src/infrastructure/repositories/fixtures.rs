use crate::domain::{
    filter::entity::Filter,
    pagination::errors::PaginateError,
    record::repository::{Record, RecordStore},
};
use anyhow::Context;
use std::path::Path;
use tracing::info;

/// Reads seed records from a JSON file holding an array of objects.
pub fn load_fixtures(path: impl AsRef<Path>) -> anyhow::Result<Vec<Record>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixtures from {}", path.display()))?;
    parse_fixtures(&raw).with_context(|| format!("Invalid fixtures in {}", path.display()))
}

fn parse_fixtures(raw: &str) -> anyhow::Result<Vec<Record>> {
    let records: Vec<Record> = serde_json::from_str(raw)?;
    if let Some(position) = records.iter().position(|record| !record.is_object()) {
        anyhow::bail!("Fixture #{} is not a JSON object", position);
    }
    Ok(records)
}

/// Inserts `records` into `store` only when it holds nothing yet, so restarts
/// never duplicate seed data. Returns how many records were inserted.
pub async fn seed_if_empty(
    store: &dyn RecordStore,
    records: Vec<Record>,
) -> Result<usize, PaginateError> {
    let existing = store.count_matching(&Filter::empty()).await?;
    if existing > 0 {
        info!(existing, "Store already populated, skipping fixtures");
        return Ok(0);
    }

    let seeded = records.len();
    for record in records {
        store.insert(record).await?;
    }
    Ok(seeded)
}
