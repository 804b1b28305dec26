//! Startup discovery: read every route descriptor under `routes/` and feed
//! validated entries into the registry. Failures are isolated per artifact
//! and per entry; loading never aborts startup.

use crate::artifact::{ArtifactPaths, DataAccessSpec, HandlerSpec, RouteDescriptor, RouteEntry};
use crate::registry::registry::{parse_pattern, HttpMethod, RouteBinding, RouteRegistry};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Per-resource specs resolved while loading. `None` is cached for a
/// resource whose model or controller spec could not be read, so the
/// diagnostic fires once per resource rather than once per entry.
#[derive(Default)]
struct SpecCache {
    resolved: HashMap<String, Option<(HandlerSpec, DataAccessSpec)>>,
}

impl SpecCache {
    fn get<'a>(
        &'a mut self,
        paths: &ArtifactPaths,
        resource: &str,
    ) -> Option<&'a (HandlerSpec, DataAccessSpec)> {
        self.resolved
            .entry(resource.to_string())
            .or_insert_with(|| load_specs(paths, resource))
            .as_ref()
    }
}

fn load_specs(paths: &ArtifactPaths, resource: &str) -> Option<(HandlerSpec, DataAccessSpec)> {
    let controller_path = paths.controller(resource);
    let handler_spec: HandlerSpec = match read_json(&controller_path) {
        Ok(spec) => spec,
        Err(e) => {
            tracing::error!(file = %controller_path.display(), error = %e, "cannot load handler spec");
            return None;
        }
    };
    let model_path = paths.model(&handler_spec.resource);
    let model: DataAccessSpec = match read_json(&model_path) {
        Ok(spec) => spec,
        Err(e) => {
            tracing::error!(file = %model_path.display(), error = %e, "cannot load data-access spec");
            return None;
        }
    };
    Some((handler_spec, model))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Scan the artifact tree and build the dispatch table. Registration order
/// is the filesystem's enumeration order, which is not sorted; the registry
/// is key-addressed so no ordering contract exists.
pub fn load_registry(paths: &ArtifactPaths) -> RouteRegistry {
    let mut registry = RouteRegistry::default();
    let mut cache = SpecCache::default();
    let routes_dir = paths.routes_dir();
    let entries = match fs::read_dir(&routes_dir) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::warn!(dir = %routes_dir.display(), error = %e, "no route artifacts to load");
            return registry;
        }
    };

    for dirent in entries {
        let Ok(dirent) = dirent else { continue };
        let file = dirent.path();
        if file.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let descriptor: RouteDescriptor = match read_json(&file) {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(file = %file.display(), error = %e, "skipping route descriptor");
                continue;
            }
        };
        for entry in descriptor.into_entries() {
            register_entry(paths, &mut registry, &mut cache, &file, entry);
        }
    }
    registry
}

fn register_entry(
    paths: &ArtifactPaths,
    registry: &mut RouteRegistry,
    cache: &mut SpecCache,
    file: &Path,
    entry: RouteEntry,
) {
    let method: HttpMethod = match entry.method.parse() {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(file = %file.display(), path = %entry.path, "{e}, skipping entry");
            return;
        }
    };
    let Some((segment, kind)) = parse_pattern(&entry.path) else {
        tracing::error!(file = %file.display(), path = %entry.path, "unrecognized route path, skipping entry");
        return;
    };
    let Some((resource, op_name)) = entry.handler.split_once('.') else {
        tracing::error!(file = %file.display(), handler = %entry.handler, "malformed handler ref, skipping entry");
        return;
    };

    let Some((handler_spec, model)) = cache.get(paths, resource) else {
        tracing::error!(file = %file.display(), handler = %entry.handler, "missing specs, skipping entry");
        return;
    };
    let Some(binding) = handler_spec.handlers.get(op_name) else {
        tracing::error!(file = %file.display(), handler = %entry.handler, "unknown handler operation, skipping entry");
        return;
    };

    let model_name = handler_spec.resource.clone();
    registry.insert_model(model_name.clone(), model.clone());
    registry.register(
        method,
        segment,
        kind,
        RouteBinding {
            auth: entry.auth,
            resource: model_name,
            op: binding.op,
            encrypt_response: binding.encrypt_response,
        },
    );
    tracing::info!(%method, path = %entry.path, auth = entry.auth, "route registered");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::synth::{create_resource, GenerateOptions};
    use crate::introspect::{ColumnDescriptor, TableSchema};
    use crate::registry::registry::PathKind;
    use std::fs;

    fn schema(table: &str) -> TableSchema {
        TableSchema {
            table: table.into(),
            columns: vec![ColumnDescriptor {
                name: "id".into(),
                sql_type: "integer".into(),
                nullable: false,
                is_primary_key: true,
            }],
        }
    }

    fn generate(paths: &ArtifactPaths, name: &str, auth: bool) {
        let opts = GenerateOptions {
            auth,
            summary: format!("Auto-generated {name} route"),
        };
        create_resource(paths, name, &schema(name), &opts).unwrap();
    }

    #[test]
    fn loads_generated_resources() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        generate(&paths, "widgets", true);
        generate(&paths, "orders", false);

        let registry = load_registry(&paths);
        assert_eq!(registry.len(), 10);

        let list = registry
            .lookup(HttpMethod::Get, "widgets", PathKind::Collection)
            .unwrap();
        assert!(list.auth);
        assert!(list.encrypt_response);
        assert_eq!(registry.model("widgets").unwrap().table, "widgets");

        let remove = registry
            .lookup(HttpMethod::Delete, "orders", PathKind::Item)
            .unwrap();
        assert!(!remove.auth);
        assert!(!remove.encrypt_response);
    }

    #[test]
    fn invalid_method_skips_only_that_entry() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        generate(&paths, "widgets", false);

        let route_path = paths.route("widgets");
        let patched = fs::read_to_string(&route_path)
            .unwrap()
            .replacen("\"put\"", "\"patch\"", 1);
        fs::write(&route_path, patched).unwrap();

        let registry = load_registry(&paths);
        assert_eq!(registry.len(), 4);
        assert!(registry
            .lookup(HttpMethod::Put, "widgets", PathKind::Item)
            .is_none());
        assert!(registry
            .lookup(HttpMethod::Get, "widgets", PathKind::Collection)
            .is_some());
    }

    #[test]
    fn malformed_descriptor_does_not_abort_loading() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        generate(&paths, "widgets", false);
        fs::write(paths.routes_dir().join("broken.json"), "{ nope").unwrap();

        let registry = load_registry(&paths);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn single_entry_descriptor_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        generate(&paths, "widgets", false);
        fs::write(
            paths.routes_dir().join("extra.json"),
            r#"{ "path": "/extras", "method": "get", "auth": false, "handler": "widgets.list" }"#,
        )
        .unwrap();

        let registry = load_registry(&paths);
        assert_eq!(registry.len(), 6);
        assert!(registry
            .lookup(HttpMethod::Get, "extras", PathKind::Collection)
            .is_some());
    }

    #[test]
    fn missing_specs_skip_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        generate(&paths, "widgets", false);
        fs::remove_file(paths.controller("widgets")).unwrap();

        let registry = load_registry(&paths);
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_routes_dir_yields_an_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        assert!(load_registry(&paths).is_empty());
    }
}
