//! API-document maintenance: non-destructive merge and removal of one
//! resource's two path entries.
//!
//! The document is edited as a JSON tree so every unrelated key survives a
//! rewrite untouched (key order may change, values never do). Persistence is
//! a full-document rewrite with no temp-file-and-rename step; a crash
//! mid-write can corrupt the file.

use crate::error::GenError;
use crate::introspect::TableSchema;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Insert (or overwrite) the `/{name}` and `/{name}/{id}` path entries.
/// An absent document is skipped; an unreadable or malformed one reports
/// `DocSync` and is left untouched.
pub fn merge_resource(
    docs_path: &Path,
    name: &str,
    summary: &str,
    schema: &TableSchema,
) -> Result<(), GenError> {
    if !docs_path.exists() {
        tracing::debug!(path = %docs_path.display(), "no API document, skipping merge");
        return Ok(());
    }
    let mut doc = load(docs_path)?;
    let root = doc
        .as_object_mut()
        .ok_or_else(|| GenError::DocSync("document root is not an object".into()))?;
    let paths = root
        .entry("paths")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| GenError::DocSync("'paths' is not an object".into()))?;

    paths.insert(format!("/{name}"), collection_entry(name, summary, schema));
    paths.insert(format!("/{name}/{{id}}"), item_entry(name, schema));

    save(docs_path, &doc)?;
    tracing::info!(path = %docs_path.display(), resource = name, "API document updated");
    Ok(())
}

/// Strip the resource's two path entries. Absent document is a no-op;
/// malformed JSON reports `DocSync` and leaves the file untouched.
pub fn remove_resource(docs_path: &Path, name: &str) -> Result<(), GenError> {
    if !docs_path.exists() {
        return Ok(());
    }
    let mut doc = load(docs_path)?;
    if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
        paths.remove(&format!("/{name}"));
        paths.remove(&format!("/{name}/{{id}}"));
    }
    save(docs_path, &doc)?;
    tracing::info!(path = %docs_path.display(), resource = name, "API document entries removed");
    Ok(())
}

fn load(path: &Path) -> Result<Value, GenError> {
    let text = fs::read_to_string(path).map_err(|e| GenError::DocSync(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| GenError::DocSync(e.to_string()))
}

fn save(path: &Path, doc: &Value) -> Result<(), GenError> {
    let text = serde_json::to_string_pretty(doc).map_err(|e| GenError::DocSync(e.to_string()))?;
    fs::write(path, text).map_err(|e| GenError::DocSync(e.to_string()))
}

fn id_parameter() -> Value {
    json!({ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } })
}

fn collection_entry(name: &str, summary: &str, schema: &TableSchema) -> Value {
    json!({
        "get": {
            "summary": summary,
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "encrypted": {
                                        "type": "string",
                                        "description": "AES-256 encrypted JSON data"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
        "post": {
            "summary": format!("Insert new {name}"),
            "requestBody": {
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": schema.properties(),
                            "required": schema.required_fields()
                        }
                    }
                }
            },
            "responses": { "200": { "description": "Created" } }
        }
    })
}

fn item_entry(name: &str, schema: &TableSchema) -> Value {
    json!({
        "get": {
            "summary": format!("Get {name} by ID"),
            "parameters": [id_parameter()],
            "responses": { "200": { "description": "OK" } }
        },
        "put": {
            "summary": format!("Update {name} by ID"),
            "parameters": [id_parameter()],
            "requestBody": {
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": schema.properties(),
                            "required": schema.required_fields()
                        }
                    }
                }
            },
            "responses": { "200": { "description": "Updated" } }
        },
        "delete": {
            "summary": format!("Delete {name} by ID"),
            "parameters": [id_parameter()],
            "responses": { "200": { "description": "Deleted" } }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{ColumnDescriptor, TableSchema};
    use std::fs;

    fn products() -> TableSchema {
        TableSchema {
            table: "products".into(),
            columns: vec![
                ColumnDescriptor {
                    name: "id".into(),
                    sql_type: "integer".into(),
                    nullable: false,
                    is_primary_key: true,
                },
                ColumnDescriptor {
                    name: "name".into(),
                    sql_type: "character varying".into(),
                    nullable: false,
                    is_primary_key: false,
                },
            ],
        }
    }

    fn baseline() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": { "title": "demo", "version": "1.0.0" },
            "paths": {
                "/health": { "get": { "responses": { "200": { "description": "OK" } } } }
            }
        })
    }

    #[test]
    fn merge_adds_two_keys_and_preserves_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.json");
        fs::write(&path, serde_json::to_string_pretty(&baseline()).unwrap()).unwrap();

        merge_resource(&path, "products", "All products", &products()).unwrap();

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/products"));
        assert!(paths.contains_key("/products/{id}"));
        assert_eq!(paths["/health"], baseline()["paths"]["/health"]);
        assert_eq!(doc["info"], baseline()["info"]);

        assert_eq!(paths["/products"]["get"]["summary"], "All products");
        assert_eq!(
            paths["/products"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]
                ["properties"]["encrypted"]["type"],
            "string"
        );
        let post_schema =
            &paths["/products"]["post"]["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(post_schema["required"], json!(["name"]));
        assert_eq!(post_schema["properties"]["id"]["type"], "integer");
        assert_eq!(
            paths["/products/{id}"]["put"]["parameters"][0]["schema"]["type"],
            "integer"
        );
    }

    #[test]
    fn merge_then_remove_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.json");
        fs::write(&path, serde_json::to_string_pretty(&baseline()).unwrap()).unwrap();

        merge_resource(&path, "products", "All products", &products()).unwrap();
        remove_resource(&path, "products").unwrap();

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc, baseline());
    }

    #[test]
    fn malformed_document_is_reported_and_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.json");
        fs::write(&path, "{ not json").unwrap();

        let err = merge_resource(&path, "products", "s", &products()).unwrap_err();
        assert!(matches!(err, GenError::DocSync(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");

        let err = remove_resource(&path, "products").unwrap_err();
        assert!(matches!(err, GenError::DocSync(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn absent_document_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.json");
        merge_resource(&path, "products", "s", &products()).unwrap();
        assert!(!path.exists());
    }
}
