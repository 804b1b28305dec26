//! Raw artifact types matching the JSON files on disk. Methods are kept as
//! strings here; validation happens at registration so one bad entry never
//! takes down a whole descriptor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One endpoint entry of a route descriptor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    pub method: String,
    pub auth: bool,
    pub handler: String,
}

/// A descriptor file exports either a single entry or an ordered sequence.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RouteDescriptor {
    One(RouteEntry),
    Many(Vec<RouteEntry>),
}

impl RouteDescriptor {
    pub fn into_entries(self) -> Vec<RouteEntry> {
        match self {
            RouteDescriptor::One(entry) => vec![entry],
            RouteDescriptor::Many(entries) => entries,
        }
    }
}

/// Data-access spec: the five query templates for one table. The table name
/// is baked into each template verbatim at generation time; request values
/// always bind as parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataAccessSpec {
    pub table: String,
    pub queries: QuerySet,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuerySet {
    pub list: String,
    pub get_by_id: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
}

/// The data-access operation a handler binding runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudOp {
    List,
    GetById,
    Insert,
    Update,
    Delete,
}

/// One handler binding: which operation to run and whether the response
/// payload goes through the symmetric cipher before leaving the process.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HandlerBinding {
    pub op: CrudOp,
    #[serde(default)]
    pub encrypt_response: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandlerSet {
    pub list: HandlerBinding,
    pub get_by_id: HandlerBinding,
    pub insert: HandlerBinding,
    pub update: HandlerBinding,
    pub delete: HandlerBinding,
}

impl HandlerSet {
    /// Look a binding up by the suffix of a route entry's handler ref.
    pub fn get(&self, name: &str) -> Option<&HandlerBinding> {
        match name {
            "list" => Some(&self.list),
            "get_by_id" => Some(&self.get_by_id),
            "insert" => Some(&self.insert),
            "update" => Some(&self.update),
            "delete" => Some(&self.delete),
            _ => None,
        }
    }
}

/// Handler spec: binds a resource's five handler refs to operations.
/// `resource` names the data-access spec the handlers execute against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandlerSpec {
    pub resource: String,
    pub handlers: HandlerSet,
}

/// Filesystem layout for the artifact tree.
#[derive(Clone, Debug)]
pub struct ArtifactPaths {
    root: PathBuf,
}

impl ArtifactPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ArtifactPaths { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn routes_dir(&self) -> PathBuf {
        self.root.join("routes")
    }

    pub fn route(&self, name: &str) -> PathBuf {
        self.routes_dir().join(format!("{name}.json"))
    }

    pub fn model(&self, name: &str) -> PathBuf {
        self.root.join("models").join(format!("{name}.json"))
    }

    pub fn controller(&self, name: &str) -> PathBuf {
        self.root.join("controllers").join(format!("{name}.json"))
    }

    pub fn docs(&self) -> PathBuf {
        self.root.join("docs").join("openapi.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_accepts_single_entry_or_sequence() {
        let one: RouteDescriptor = serde_json::from_str(
            r#"{ "path": "/widgets", "method": "get", "auth": false, "handler": "widgets.list" }"#,
        )
        .unwrap();
        assert_eq!(one.into_entries().len(), 1);

        let many: RouteDescriptor = serde_json::from_str(
            r#"[
                { "path": "/widgets", "method": "get", "auth": true, "handler": "widgets.list" },
                { "path": "/widgets/:id", "method": "delete", "auth": true, "handler": "widgets.delete" }
            ]"#,
        )
        .unwrap();
        let entries = many.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].handler, "widgets.delete");
    }

    #[test]
    fn handler_set_rejects_unknown_refs() {
        let spec: HandlerSpec = serde_json::from_str(
            r#"{
                "resource": "widgets",
                "handlers": {
                    "list": { "op": "list", "encrypt_response": true },
                    "get_by_id": { "op": "get_by_id" },
                    "insert": { "op": "insert" },
                    "update": { "op": "update" },
                    "delete": { "op": "delete" }
                }
            }"#,
        )
        .unwrap();
        assert!(spec.handlers.get("list").is_some());
        assert!(spec.handlers.get("list").unwrap().encrypt_response);
        assert!(!spec.handlers.get("insert").unwrap().encrypt_response);
        assert!(spec.handlers.get("purge").is_none());
    }
}
