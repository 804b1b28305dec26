//! Resource synthesis: one table becomes a route descriptor, a data-access
//! spec, and a handler spec.

use crate::artifact::types::{
    ArtifactPaths, CrudOp, DataAccessSpec, HandlerBinding, HandlerSet, HandlerSpec, QuerySet,
    RouteEntry,
};
use crate::error::GenError;
use crate::introspect::TableSchema;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct GenerateOptions {
    pub auth: bool,
    pub summary: String,
}

/// Generate the three artifacts for `name`. Refuses before any write when a
/// route descriptor for the name is already present; existence is judged on
/// the descriptor alone. The three writes are sequential, so an I/O failure
/// mid-way leaves whatever subset was already written.
pub fn create_resource(
    paths: &ArtifactPaths,
    name: &str,
    schema: &TableSchema,
    opts: &GenerateOptions,
) -> Result<(), GenError> {
    let route_path = paths.route(name);
    if route_path.exists() {
        return Err(GenError::AlreadyExists(name.to_string()));
    }

    write_json(&route_path, &route_descriptor(name, opts.auth))?;
    tracing::info!(route = %route_path.display(), "route descriptor written");

    let model_path = paths.model(name);
    write_json(&model_path, &data_access_spec(&schema.table))?;
    tracing::info!(model = %model_path.display(), "data-access spec written");

    let controller_path = paths.controller(name);
    write_json(&controller_path, &handler_spec(name))?;
    tracing::info!(controller = %controller_path.display(), "handler spec written");

    Ok(())
}

/// The five endpoint entries, all sharing one auth flag.
pub fn route_descriptor(name: &str, auth: bool) -> Vec<RouteEntry> {
    let collection = format!("/{name}");
    let item = format!("/{name}/:id");
    let entry = |path: &str, method: &str, handler: &str| RouteEntry {
        path: path.to_string(),
        method: method.to_string(),
        auth,
        handler: format!("{name}.{handler}"),
    };
    vec![
        entry(&collection, "get", "list"),
        entry(&item, "get", "get_by_id"),
        entry(&collection, "post", "insert"),
        entry(&item, "put", "update"),
        entry(&item, "delete", "delete"),
    ]
}

/// Query templates with the literal table name baked in. The name arrives
/// from the operator unescaped; only request values are parameter-bound.
pub fn data_access_spec(table: &str) -> DataAccessSpec {
    DataAccessSpec {
        table: table.to_string(),
        queries: QuerySet {
            list: format!("SELECT * FROM {table}"),
            get_by_id: format!("SELECT * FROM {table} WHERE id = $1"),
            insert: format!("INSERT INTO {table} ({{columns}}) VALUES ({{values}}) RETURNING id"),
            update: format!("UPDATE {table} SET {{assignments}} WHERE id = {{id}}"),
            delete: format!("DELETE FROM {table} WHERE id = $1"),
        },
    }
}

/// Handler bindings. Only the list handler routes its payload through the
/// symmetric cipher; the other four return plaintext JSON.
pub fn handler_spec(name: &str) -> HandlerSpec {
    let plain = |op: CrudOp| HandlerBinding {
        op,
        encrypt_response: false,
    };
    HandlerSpec {
        resource: name.to_string(),
        handlers: HandlerSet {
            list: HandlerBinding {
                op: CrudOp::List,
                encrypt_response: true,
            },
            get_by_id: plain(CrudOp::GetById),
            insert: plain(CrudOp::Insert),
            update: plain(CrudOp::Update),
            delete: plain(CrudOp::Delete),
        },
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), GenError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{ColumnDescriptor, TableSchema};
    use std::collections::HashSet;

    fn widgets_schema() -> TableSchema {
        TableSchema {
            table: "widgets".into(),
            columns: vec![ColumnDescriptor {
                name: "id".into(),
                sql_type: "integer".into(),
                nullable: false,
                is_primary_key: true,
            }],
        }
    }

    fn opts() -> GenerateOptions {
        GenerateOptions {
            auth: true,
            summary: "All widgets".into(),
        }
    }

    #[test]
    fn descriptor_has_five_entries_with_uniform_auth() {
        let entries = route_descriptor("widgets", true);
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(|e| e.auth));

        let methods: Vec<&str> = entries.iter().map(|e| e.method.as_str()).collect();
        assert_eq!(methods, vec!["get", "get", "post", "put", "delete"]);

        let handlers: HashSet<&str> = entries.iter().map(|e| e.handler.as_str()).collect();
        assert_eq!(handlers.len(), 5);
        assert!(handlers.contains("widgets.delete"));

        assert_eq!(entries[0].path, "/widgets");
        assert_eq!(entries[1].path, "/widgets/:id");
    }

    #[test]
    fn templates_embed_table_name_literally() {
        let spec = data_access_spec("products");
        assert_eq!(spec.queries.list, "SELECT * FROM products");
        assert_eq!(spec.queries.get_by_id, "SELECT * FROM products WHERE id = $1");
        assert!(spec.queries.insert.starts_with("INSERT INTO products ("));
        assert!(spec.queries.update.starts_with("UPDATE products SET "));
        assert_eq!(spec.queries.delete, "DELETE FROM products WHERE id = $1");
    }

    #[test]
    fn only_list_encrypts() {
        let spec = handler_spec("widgets");
        assert!(spec.handlers.list.encrypt_response);
        assert!(!spec.handlers.get_by_id.encrypt_response);
        assert!(!spec.handlers.insert.encrypt_response);
        assert!(!spec.handlers.update.encrypt_response);
        assert!(!spec.handlers.delete.encrypt_response);
    }

    #[test]
    fn second_create_fails_and_leaves_artifacts_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let schema = widgets_schema();

        create_resource(&paths, "widgets", &schema, &opts()).unwrap();
        let route = std::fs::read(paths.route("widgets")).unwrap();
        let model = std::fs::read(paths.model("widgets")).unwrap();
        let controller = std::fs::read(paths.controller("widgets")).unwrap();

        let err = create_resource(&paths, "widgets", &schema, &opts()).unwrap_err();
        assert!(matches!(err, GenError::AlreadyExists(ref n) if n == "widgets"));

        assert_eq!(std::fs::read(paths.route("widgets")).unwrap(), route);
        assert_eq!(std::fs::read(paths.model("widgets")).unwrap(), model);
        assert_eq!(std::fs::read(paths.controller("widgets")).unwrap(), controller);
    }

    #[test]
    fn existence_hinges_on_the_route_descriptor_only() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let schema = widgets_schema();

        create_resource(&paths, "widgets", &schema, &opts()).unwrap();
        // A partial resource (descriptor gone, specs left behind) does not
        // block a fresh create.
        std::fs::remove_file(paths.route("widgets")).unwrap();
        create_resource(&paths, "widgets", &schema, &opts()).unwrap();
    }
}
