//! routesmith: schema-driven CRUD scaffolding and serving toolkit.
//!
//! The generator side introspects a PostgreSQL table and emits three
//! declarative artifacts per resource (route descriptor, data-access spec,
//! handler spec) plus an API-document merge. The serving side loads every
//! descriptor into a dispatch registry and runs the generic interpreter
//! handlers over it, with bearer-token enforcement on protected entries.

pub mod artifact;
pub mod auth;
pub mod cli;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod introspect;
pub mod registry;
pub mod routes;
pub mod service;
pub mod settings;
pub mod state;

pub use artifact::{create_resource, remove_resource, ArtifactPaths, GenerateOptions};
pub use auth::{SecretCipher, TokenService};
pub use error::{AppError, GenError};
pub use introspect::{introspect_table, ColumnDescriptor, TableSchema};
pub use registry::{load_registry, RouteRegistry};
pub use routes::{common_routes, resource_routes};
pub use settings::Settings;
pub use state::AppState;
