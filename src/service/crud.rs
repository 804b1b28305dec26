//! The data-access interpreter: runs a spec's five query templates against
//! the pool. Identifiers taken from request bodies are quoted; values always
//! bind as parameters. The table name inside each template was fixed at
//! generation time and is executed verbatim.

use crate::artifact::DataAccessSpec;
use crate::error::AppError;
use serde_json::{Map, Value};
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgRow, PgTypeInfo, Postgres};
use sqlx::{Database, PgPool};

pub struct QueryInterpreter;

impl QueryInterpreter {
    pub async fn list(pool: &PgPool, spec: &DataAccessSpec) -> Result<Vec<Value>, AppError> {
        let sql = &spec.queries.list;
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query(sql).fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    pub async fn get_by_id(
        pool: &PgPool,
        spec: &DataAccessSpec,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let sql = &spec.queries.get_by_id;
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query(sql).bind(id).fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    /// Insert one row and return the new id from the template's RETURNING
    /// clause.
    pub async fn insert(
        pool: &PgPool,
        spec: &DataAccessSpec,
        body: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let (sql, params) = expand_insert(&spec.queries.insert, body)?;
        tracing::debug!(sql = %sql, "query");
        let mut query = sqlx::query(&sql);
        for p in &params {
            query = query.bind(BindValue::from_json(p));
        }
        let row = query.fetch_one(pool).await?;
        Ok(cell_to_value(&row, "id"))
    }

    pub async fn update(
        pool: &PgPool,
        spec: &DataAccessSpec,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<(), AppError> {
        let (sql, params) = expand_update(&spec.queries.update, body)?;
        tracing::debug!(sql = %sql, id, "query");
        let mut query = sqlx::query(&sql);
        for p in &params {
            query = query.bind(BindValue::from_json(p));
        }
        query.bind(id).execute(pool).await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, spec: &DataAccessSpec, id: i64) -> Result<(), AppError> {
        let sql = &spec.queries.delete;
        tracing::debug!(sql = %sql, id, "query");
        sqlx::query(sql).bind(id).execute(pool).await?;
        Ok(())
    }
}

/// Quote an identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Expand `{columns}`/`{values}` in an insert template from the body.
/// Column names are quoted; values become `$1..$n` in body order.
fn expand_insert(
    template: &str,
    body: &Map<String, Value>,
) -> Result<(String, Vec<Value>), AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("body must contain at least one column".into()));
    }
    let mut columns = Vec::with_capacity(body.len());
    let mut placeholders = Vec::with_capacity(body.len());
    let mut params = Vec::with_capacity(body.len());
    for (i, (name, value)) in body.iter().enumerate() {
        columns.push(quoted(name));
        placeholders.push(format!("${}", i + 1));
        params.push(value.clone());
    }
    let sql = template
        .replace("{columns}", &columns.join(", "))
        .replace("{values}", &placeholders.join(", "));
    Ok((sql, params))
}

/// Expand `{assignments}`/`{id}` in an update template. The id placeholder
/// lands after the body parameters; the caller binds the id value last.
fn expand_update(
    template: &str,
    body: &Map<String, Value>,
) -> Result<(String, Vec<Value>), AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("body must contain at least one column".into()));
    }
    let mut assignments = Vec::with_capacity(body.len());
    let mut params = Vec::with_capacity(body.len());
    for (i, (name, value)) in body.iter().enumerate() {
        assignments.push(format!("{} = ${}", quoted(name), i + 1));
        params.push(value.clone());
    }
    let sql = template
        .replace("{assignments}", &assignments.join(", "))
        .replace("{id}", &format!("${}", body.len() + 1));
    Ok((sql, params))
}

/// A request-body value bound to a PostgreSQL parameter.
#[derive(Clone, Debug)]
enum BindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Json(Value),
}

impl BindValue {
    fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => BindValue::Null,
            Value::Bool(b) => BindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    BindValue::I64(i)
                } else {
                    BindValue::F64(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => BindValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => BindValue::Json(v.clone()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            BindValue::Null => <Option<i32> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            BindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            BindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            BindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            BindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            BindValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }
}

impl sqlx::Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
