//! Table introspection: column metadata from information_schema, plus the
//! schema derivations the generator and the API document share.

use crate::error::GenError;
use serde_json::{json, Map, Value};
use sqlx::{PgPool, Row};

#[derive(Clone, Debug)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
}

#[derive(Clone, Debug)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    /// Columns a client must supply: NOT NULL and not the id column.
    pub fn required_fields(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.nullable && c.name != "id")
            .map(|c| c.name.clone())
            .collect()
    }

    /// JSON-schema property map: integer for any int-ish SQL type, string
    /// for everything else.
    pub fn properties(&self) -> Map<String, Value> {
        self.columns
            .iter()
            .map(|c| {
                let ty = if c.sql_type.contains("int") { "integer" } else { "string" };
                (c.name.clone(), json!({ "type": ty }))
            })
            .collect()
    }
}

const COLUMNS_SQL: &str = r#"
SELECT c.column_name,
       c.data_type,
       c.is_nullable = 'YES' AS nullable,
       EXISTS (
           SELECT 1
           FROM information_schema.table_constraints tc
           JOIN information_schema.key_column_usage kcu
             ON kcu.constraint_name = tc.constraint_name
            AND kcu.table_schema = tc.table_schema
           WHERE tc.constraint_type = 'PRIMARY KEY'
             AND tc.table_schema = c.table_schema
             AND tc.table_name = c.table_name
             AND kcu.column_name = c.column_name
       ) AS is_primary_key
FROM information_schema.columns c
WHERE c.table_schema = 'public'
  AND c.table_name = $1
ORDER BY c.ordinal_position
"#;

/// Describe `table` in the public schema, in column order. An unknown table
/// comes back with zero columns; the create command treats that as an error
/// so a resource is never generated against an empty schema.
pub async fn introspect_table(pool: &PgPool, table: &str) -> Result<TableSchema, GenError> {
    tracing::debug!(table, "introspecting");
    let rows = sqlx::query(COLUMNS_SQL).bind(table).fetch_all(pool).await?;
    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        columns.push(ColumnDescriptor {
            name: row.try_get("column_name")?,
            sql_type: row.try_get("data_type")?,
            nullable: row.try_get("nullable")?,
            is_primary_key: row.try_get("is_primary_key")?,
        });
    }
    Ok(TableSchema {
        table: table.to_string(),
        columns,
    })
}
