//! Generated artifacts: wire types, synthesis, and removal.

pub mod remove;
pub mod synth;
pub mod types;

pub use remove::remove_resource;
pub use synth::{create_resource, GenerateOptions};
pub use types::{
    ArtifactPaths, CrudOp, DataAccessSpec, HandlerBinding, HandlerSet, HandlerSpec, QuerySet,
    RouteDescriptor, RouteEntry,
};
