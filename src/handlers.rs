//! Generic dispatch handlers. Each request resolves its registry binding by
//! segment and method, passes the bearer check when the entry demands one,
//! and runs the bound data-access operation. The list binding's payload goes
//! through the symmetric cipher; everything else is plaintext JSON.

use crate::artifact::{CrudOp, DataAccessSpec};
use crate::auth::require_bearer;
use crate::error::AppError;
use crate::registry::{HttpMethod, PathKind, RouteBinding};
use crate::service::QueryInterpreter;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Map, Value};

/// Look up the binding, enforce auth, and fetch the data-access spec. The
/// verified claims are traced; the interpreter operations do not consume
/// them.
fn resolve(
    state: &AppState,
    method: HttpMethod,
    segment: &str,
    kind: PathKind,
    headers: &HeaderMap,
) -> Result<(RouteBinding, DataAccessSpec), AppError> {
    let binding = state
        .registry
        .lookup(method, segment, kind)
        .ok_or_else(|| AppError::NotFound(format!("{method} /{segment}")))?;
    if binding.auth {
        let claims = require_bearer(&state.tokens, headers)?;
        tracing::debug!(resource = %binding.resource, ?claims, "authenticated request");
    }
    let model = state
        .registry
        .model(&binding.resource)
        .ok_or_else(|| AppError::NotFound(binding.resource.clone()))?;
    Ok((binding.clone(), model.clone()))
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

async fn run_op(
    state: &AppState,
    binding: &RouteBinding,
    model: &DataAccessSpec,
    id: Option<i64>,
    body: Option<Map<String, Value>>,
) -> Result<Value, AppError> {
    let need_id = || id.ok_or_else(|| AppError::BadRequest("missing id".into()));
    let need_body = || body.ok_or_else(|| AppError::BadRequest("missing body".into()));
    match binding.op {
        CrudOp::List => {
            let rows = QueryInterpreter::list(&state.pool, model).await?;
            Ok(Value::Array(rows))
        }
        CrudOp::GetById => {
            let row = QueryInterpreter::get_by_id(&state.pool, model, need_id()?).await?;
            Ok(row.unwrap_or_else(|| Value::Object(Map::new())))
        }
        CrudOp::Insert => {
            let id = QueryInterpreter::insert(&state.pool, model, &need_body()?).await?;
            Ok(json!({ "id": id }))
        }
        CrudOp::Update => {
            QueryInterpreter::update(&state.pool, model, need_id()?, &need_body()?).await?;
            Ok(json!({ "updated": true }))
        }
        CrudOp::Delete => {
            QueryInterpreter::delete(&state.pool, model, need_id()?).await?;
            Ok(json!({ "deleted": true }))
        }
    }
}

fn finish(state: &AppState, binding: &RouteBinding, payload: Value) -> Json<Value> {
    if binding.encrypt_response {
        let encrypted = state.tokens.cipher().encrypt(&payload.to_string());
        Json(json!({ "encrypted": encrypted }))
    } else {
        Json(payload)
    }
}

pub async fn collection_get(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let (binding, model) =
        resolve(&state, HttpMethod::Get, &segment, PathKind::Collection, &headers)?;
    let payload = run_op(&state, &binding, &model, None, None).await?;
    Ok(finish(&state, &binding, payload))
}

pub async fn collection_post(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let (binding, model) =
        resolve(&state, HttpMethod::Post, &segment, PathKind::Collection, &headers)?;
    let body = body_to_map(body)?;
    let payload = run_op(&state, &binding, &model, None, Some(body)).await?;
    Ok(finish(&state, &binding, payload))
}

pub async fn item_get(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let (binding, model) = resolve(&state, HttpMethod::Get, &segment, PathKind::Item, &headers)?;
    let id = parse_id(&id_str)?;
    let payload = run_op(&state, &binding, &model, Some(id), None).await?;
    Ok(finish(&state, &binding, payload))
}

pub async fn item_put(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let (binding, model) = resolve(&state, HttpMethod::Put, &segment, PathKind::Item, &headers)?;
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    let payload = run_op(&state, &binding, &model, Some(id), Some(body)).await?;
    Ok(finish(&state, &binding, payload))
}

pub async fn item_delete(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let (binding, model) =
        resolve(&state, HttpMethod::Delete, &segment, PathKind::Item, &headers)?;
    let id = parse_id(&id_str)?;
    let payload = run_op(&state, &binding, &model, Some(id), None).await?;
    Ok(finish(&state, &binding, payload))
}
