//! Command-line surface: `route create`, `route remove`, and `serve`.

use crate::artifact::{create_resource, remove_resource, ArtifactPaths, GenerateOptions};
use crate::auth::{TokenService, DEFAULT_TTL_SECS};
use crate::docs;
use crate::error::GenError;
use crate::introspect::introspect_table;
use crate::registry::load_registry;
use crate::routes::{common_routes, resource_routes};
use crate::settings::Settings;
use crate::state::AppState;
use axum::Router;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "routesmith")]
#[command(about = "Schema-driven CRUD scaffolding for PostgreSQL", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage generated CRUD resources
    Route {
        #[command(subcommand)]
        action: RouteAction,
    },
    /// Load every route artifact and serve the dispatch table
    Serve {
        /// Bind address override, e.g. 127.0.0.1:8080 (default HOST:PORT)
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RouteAction {
    /// Introspect a table and generate route, model, and controller artifacts
    Create {
        name: String,

        /// Table to introspect (prompted when flags are incomplete)
        #[arg(long)]
        table: Option<String>,

        /// Require a bearer token on all five endpoints
        #[arg(long)]
        auth: Option<bool>,

        /// Summary for the API document
        #[arg(long)]
        summary: Option<String>,
    },
    /// Delete a resource's artifacts and documentation entries
    Remove { name: String },
}

struct CreateAnswers {
    table: String,
    auth: bool,
    summary: String,
}

fn prompt(message: &str) -> Result<String, GenError> {
    use std::io::Write;
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Flags win when all three are present; otherwise every answer is prompted.
fn resolve_answers(
    name: &str,
    table: Option<String>,
    auth: Option<bool>,
    summary: Option<String>,
) -> Result<CreateAnswers, GenError> {
    if let (Some(table), Some(auth), Some(summary)) = (table.clone(), auth, summary.clone()) {
        return Ok(CreateAnswers { table, auth, summary });
    }
    let table_input = prompt(&format!("Table name (used in SELECT queries) [{name}]: "))?;
    let table = if table_input.is_empty() {
        name.to_string()
    } else {
        table_input
    };
    let auth_input = prompt("Require auth? [Y/n]: ")?;
    let auth = !matches!(auth_input.to_lowercase().as_str(), "n" | "no" | "false");
    let default_summary = format!("Auto-generated {name} route");
    let summary_input = prompt(&format!("Route summary [{default_summary}]: "))?;
    let summary = if summary_input.is_empty() {
        default_summary
    } else {
        summary_input
    };
    Ok(CreateAnswers { table, auth, summary })
}

/// Create a resource: introspect, synthesize the three artifacts, merge the
/// API document. An existing route descriptor short-circuits before any
/// prompt or database work; a doc-sync failure is reported but never rolls
/// the artifacts back.
pub async fn run_create(
    settings: &Settings,
    name: &str,
    table: Option<String>,
    auth: Option<bool>,
    summary: Option<String>,
) -> Result<(), GenError> {
    let paths = ArtifactPaths::new(&settings.root_dir);
    if paths.route(name).exists() {
        println!("route '{name}' already exists");
        return Ok(());
    }
    let answers = resolve_answers(name, table, auth, summary)?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;
    let schema = introspect_table(&pool, &answers.table).await?;
    if schema.columns.is_empty() {
        return Err(GenError::EmptyTable(answers.table));
    }

    let opts = GenerateOptions {
        auth: answers.auth,
        summary: answers.summary,
    };
    create_resource(&paths, name, &schema, &opts)?;
    println!("route '{name}' created at {}", paths.route(name).display());
    println!("model '{name}' created at {}", paths.model(name).display());
    println!(
        "controller '{name}' created at {}",
        paths.controller(name).display()
    );

    if let Err(e) = docs::merge_resource(&paths.docs(), name, &opts.summary, &schema) {
        eprintln!("failed to update API document: {e}");
    }
    Ok(())
}

pub fn run_remove(settings: &Settings, name: &str) -> Result<(), GenError> {
    let paths = ArtifactPaths::new(&settings.root_dir);
    remove_resource(&paths, name)?;
    println!("route '{name}' removed");
    Ok(())
}

/// Build the dispatch table from the artifact tree and serve it.
pub async fn run_serve(settings: &Settings, addr_override: Option<String>) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;
    let paths = ArtifactPaths::new(&settings.root_dir);
    let registry = load_registry(&paths);
    tracing::info!(entries = registry.len(), "dispatch table ready");

    let tokens = TokenService::new(settings.crypto_key, &settings.jwt_secret, DEFAULT_TTL_SECS);
    let state = AppState {
        pool,
        registry: Arc::new(registry),
        tokens,
    };
    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(resource_routes(state));

    let addr = addr_override.unwrap_or_else(|| format!("{}:{}", settings.host, settings.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("routesmith serving on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
