//! Shared application state: the pool, the dispatch registry, and the token
//! service. The registry is built once before serving and never mutated.

use crate::auth::TokenService;
use crate::registry::RouteRegistry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<RouteRegistry>,
    pub tokens: TokenService,
}
