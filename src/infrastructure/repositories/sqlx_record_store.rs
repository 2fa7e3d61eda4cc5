use crate::domain::{
    filter::entity::{Condition, Filter},
    pagination::{descriptor::QueryDescriptor, errors::PaginateError},
    record::{
        projection::project,
        repository::{Record, RecordStore},
    },
};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info, instrument, warn};

lazy_static! {
    static ref TABLE_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Postgres-backed record store.
///
/// Each model lives in its own table holding the record as `data JSONB`, with a
/// `BIGSERIAL id` giving the default order. Field names and values are always
/// bound as parameters; only the validated table name is spliced into the SQL.
pub struct SqlxRecordStore {
    pub pool: PgPool,
    table: String,
}

impl SqlxRecordStore {
    pub fn new(pool: PgPool, table: &str) -> anyhow::Result<Self> {
        if !TABLE_NAME_REGEX.is_match(table) {
            anyhow::bail!("Invalid table name `{}`", table);
        }
        info!("Initializing SqlxRecordStore for table {}", table);
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Creates the backing table when it does not exist yet.
    pub async fn ensure_table(&self) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id BIGSERIAL PRIMARY KEY, data JSONB NOT NULL)",
            self.table
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn build_page_query(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<QueryBuilder<'static, Postgres>, PaginateError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT data FROM {}", self.table));
        if let Some(filter) = &descriptor.filter {
            qb.push(" WHERE ");
            push_filter(&mut qb, filter);
        }

        qb.push(" ORDER BY ");
        for key in descriptor.order_keys()? {
            qb.push("data->")
                .push_bind(key.field)
                .push(if key.descending { " DESC, " } else { " ASC, " });
        }
        qb.push("id ASC");

        qb.push(" LIMIT ")
            .push_bind(to_sql_int(descriptor.limit, "limit")?)
            .push(" OFFSET ")
            .push_bind(to_sql_int(descriptor.skip, "skip")?);
        Ok(qb)
    }

    fn build_count_query(&self, filter: &Filter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*)::bigint FROM {}", self.table));
        if !filter.is_empty() {
            qb.push(" WHERE ");
            push_filter(&mut qb, filter);
        }
        qb
    }
}

#[async_trait]
impl RecordStore for SqlxRecordStore {
    #[instrument(skip(self, descriptor), fields(table = %self.table, skip = descriptor.skip, limit = descriptor.limit))]
    async fn fetch_page(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>, PaginateError> {
        if descriptor.include.is_some() {
            warn!("Relation include is not supported by the Postgres store, ignoring");
        }

        let mut qb = self.build_page_query(descriptor)?;
        debug!(sql = qb.sql(), "Fetching page");

        let rows: Vec<(Value,)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        let fields = descriptor.fields.as_deref().unwrap_or_default();
        Ok(rows.into_iter().map(|(data,)| project(data, fields)).collect())
    }

    #[instrument(skip(self, filter), fields(table = %self.table))]
    async fn count_matching(&self, filter: &Filter) -> Result<u64, PaginateError> {
        let mut qb = self.build_count_query(filter);
        debug!(sql = qb.sql(), "Counting matching records");

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(total.max(0) as u64)
    }

    async fn insert(&self, record: Record) -> Result<(), PaginateError> {
        sqlx::query(&format!("INSERT INTO {} (data) VALUES ($1)", self.table))
            .bind(record)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

fn store_error(err: sqlx::Error) -> PaginateError {
    error!(database_error = %err, "Record store query failed");
    PaginateError::CollaboratorFailure(format!("Database error: {}", err))
}

fn to_sql_int(value: u64, what: &str) -> Result<i64, PaginateError> {
    i64::try_from(value).map_err(|_| {
        PaginateError::CollaboratorFailure(format!("{} {} exceeds the database range", what, value))
    })
}

/// Appends `filter` as a boolean SQL expression over the `data` column.
fn push_filter(qb: &mut QueryBuilder<'static, Postgres>, filter: &Filter) {
    match filter {
        Filter::And(terms) => push_group(qb, terms, " AND ", "TRUE"),
        Filter::Or(terms) => push_group(qb, terms, " OR ", "FALSE"),
        Filter::Field { field, condition } => push_condition(qb, field, condition),
    }
}

fn push_group(
    qb: &mut QueryBuilder<'static, Postgres>,
    terms: &[Filter],
    separator: &str,
    identity: &str,
) {
    if terms.is_empty() {
        qb.push(identity);
        return;
    }

    qb.push("(");
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_filter(qb, term);
    }
    qb.push(")");
}

fn push_condition(qb: &mut QueryBuilder<'static, Postgres>, field: &str, condition: &Condition) {
    let json_path = |qb: &mut QueryBuilder<'static, Postgres>| {
        qb.push("(data->").push_bind(field.to_string()).push(")");
    };
    let text_path = |qb: &mut QueryBuilder<'static, Postgres>| {
        qb.push("(data->>").push_bind(field.to_string()).push(")");
    };

    match condition {
        Condition::Eq(Value::Null) => {
            qb.push("COALESCE(data->")
                .push_bind(field.to_string())
                .push(", 'null'::jsonb) = 'null'::jsonb");
        }
        Condition::Eq(operand) => push_comparison(qb, &json_path, " = ", operand),
        Condition::Neq(operand) => push_comparison(qb, &json_path, " IS DISTINCT FROM ", operand),
        Condition::Gt(operand) => push_comparison(qb, &json_path, " > ", operand),
        Condition::Gte(operand) => push_comparison(qb, &json_path, " >= ", operand),
        Condition::Lt(operand) => push_comparison(qb, &json_path, " < ", operand),
        Condition::Lte(operand) => push_comparison(qb, &json_path, " <= ", operand),
        Condition::Inq(operands) | Condition::Nin(operands) if operands.is_empty() => {
            qb.push(if matches!(condition, Condition::Inq(_)) { "FALSE" } else { "TRUE" });
        }
        Condition::Inq(operands) | Condition::Nin(operands) => {
            let negated = matches!(condition, Condition::Nin(_));
            if negated {
                qb.push("NOT COALESCE(");
            }
            json_path(qb);
            qb.push(" IN (");
            let mut list = qb.separated(", ");
            for operand in operands {
                list.push_bind(operand.clone());
            }
            qb.push(")");
            if negated {
                qb.push(", FALSE)");
            }
        }
        Condition::Between(lower, upper) => {
            json_path(qb);
            qb.push(" BETWEEN ")
                .push_bind(lower.clone())
                .push(" AND ")
                .push_bind(upper.clone());
        }
        Condition::Like {
            pattern,
            case_insensitive,
        } => {
            text_path(qb);
            qb.push(if *case_insensitive { " ILIKE " } else { " LIKE " });
            push_contains_pattern(qb, pattern);
        }
        Condition::NotLike {
            pattern,
            case_insensitive,
        } => {
            qb.push("COALESCE(");
            text_path(qb);
            qb.push(", '')");
            qb.push(if *case_insensitive { " NOT ILIKE " } else { " NOT LIKE " });
            push_contains_pattern(qb, pattern);
        }
        Condition::Exists(expected) => {
            qb.push("COALESCE(jsonb_typeof(data->")
                .push_bind(field.to_string())
                .push(if *expected { "), 'null') <> 'null'" } else { "), 'null') = 'null'" });
        }
    }
}

fn push_comparison(
    qb: &mut QueryBuilder<'static, Postgres>,
    json_path: &dyn Fn(&mut QueryBuilder<'static, Postgres>),
    operator: &str,
    operand: &Value,
) {
    json_path(qb);
    qb.push(operator).push_bind(operand.clone());
}

/// Like patterns match anywhere in the value, as the in-memory store does.
fn push_contains_pattern(qb: &mut QueryBuilder<'static, Postgres>, pattern: &str) {
    qb.push("('%' || ").push_bind(close_dangling_escape(pattern)).push(" || '%')");
}

/// Doubles a trailing lone `\` so it stays literal instead of escaping the
/// appended `%`.
fn close_dangling_escape(pattern: &str) -> String {
    let trailing = pattern.chars().rev().take_while(|&ch| ch == '\\').count();
    if trailing % 2 == 1 {
        format!("{}\\", pattern)
    } else {
        pattern.to_string()
    }
}
