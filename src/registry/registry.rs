//! The dispatch table: validated route entries keyed for runtime lookup,
//! plus the data-access specs they execute against.

use crate::artifact::{CrudOp, DataAccessSpec};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The supported methods for descriptor entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            _ => Err(format!("unsupported HTTP method: {s}")),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Which of a resource's two path shapes an entry serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathKind {
    Collection,
    Item,
}

/// Parse a descriptor path: `/widgets` is the collection, `/widgets/:id`
/// the item. Anything else is not dispatchable.
pub fn parse_pattern(path: &str) -> Option<(String, PathKind)> {
    let rest = path.strip_prefix('/')?;
    let mut parts = rest.split('/');
    let segment = parts.next().filter(|s| !s.is_empty())?;
    match (parts.next(), parts.next()) {
        (None, _) => Some((segment.to_string(), PathKind::Collection)),
        (Some(":id"), None) => Some((segment.to_string(), PathKind::Item)),
        _ => None,
    }
}

/// One registered dispatch target.
#[derive(Clone, Debug)]
pub struct RouteBinding {
    pub auth: bool,
    pub resource: String,
    pub op: CrudOp,
    pub encrypt_response: bool,
}

#[derive(Clone, Debug, Default)]
pub struct RouteRegistry {
    bindings: HashMap<(HttpMethod, String, PathKind), RouteBinding>,
    models: HashMap<String, DataAccessSpec>,
}

impl RouteRegistry {
    /// Register one validated entry. Entries arrive in filesystem
    /// enumeration order; lookup is key-addressed, so order carries no
    /// routing precedence. A duplicate key keeps the first registration.
    pub fn register(
        &mut self,
        method: HttpMethod,
        segment: String,
        kind: PathKind,
        binding: RouteBinding,
    ) {
        match self.bindings.entry((method, segment, kind)) {
            Entry::Occupied(e) => {
                let (method, segment, _) = e.key();
                tracing::warn!(%method, %segment, "duplicate route entry ignored");
            }
            Entry::Vacant(v) => {
                v.insert(binding);
            }
        }
    }

    pub fn insert_model(&mut self, resource: String, spec: DataAccessSpec) {
        self.models.entry(resource).or_insert(spec);
    }

    pub fn lookup(&self, method: HttpMethod, segment: &str, kind: PathKind) -> Option<&RouteBinding> {
        self.bindings
            .get(&(method, segment.to_string(), kind))
    }

    pub fn model(&self, resource: &str) -> Option<&DataAccessSpec> {
        self.models.get(resource)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
