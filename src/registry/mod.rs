//! Route discovery and the runtime dispatch table.

pub mod loader;
pub mod registry;

pub use loader::load_registry;
pub use registry::{parse_pattern, HttpMethod, PathKind, RouteBinding, RouteRegistry};
