use std::path::PathBuf;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use versioned_api::config::load_config;
use versioned_api::dispatch::{Action, Tier};
use versioned_api::http::Dispatcher;
use versioned_api::version::Version;

#[derive(Parser)]
#[command(name = "dispatch-cli")]
#[command(about = "Inspect versioned handler tables offline", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, default_value = "versioned-api.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered handler
    List,
    /// Show which handler a request would reach
    Resolve {
        /// Endpoint path
        path: String,

        /// HTTP method (GET, POST, ...)
        #[arg(short, long, default_value = "GET", conflicts_with = "action")]
        method: String,

        /// CRUD action (read, create, update, delete)
        #[arg(short, long)]
        action: Option<Action>,

        /// Version for every platform
        #[arg(long)]
        version: Option<String>,

        #[arg(long)]
        ios: Option<String>,

        #[arg(long)]
        android: Option<String>,

        #[arg(long)]
        web: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let dispatcher = Dispatcher::from_config(&config)?;

    let output = match cli.command {
        Commands::List => list(&dispatcher),
        Commands::Resolve {
            path,
            method,
            action,
            version,
            ios,
            android,
            web,
        } => {
            let method = match action {
                Some(action) => action.method(),
                None => Method::from_bytes(method.to_ascii_uppercase().as_bytes())?,
            };
            let request = Version::parse_parts(
                version.as_deref(),
                ios.as_deref(),
                android.as_deref(),
                web.as_deref(),
            )?;
            resolve(&dispatcher, &path, &method, &request)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn list(dispatcher: &Dispatcher) -> Value {
    let mut rows = Vec::new();
    for (path, registry) in dispatcher.endpoints() {
        for method in registry.methods() {
            let Some(table) = registry.table(method) else {
                continue;
            };
            for tier in [Tier::Exact, Tier::Range] {
                for (version, handler) in table.tier(tier) {
                    rows.push(json!({
                        "path": path,
                        "method": method.as_str(),
                        "tier": tier,
                        "version": version.to_string(),
                        "handler": handler.name,
                    }));
                }
            }
        }
    }
    rows.sort_by_key(|row| row.to_string());
    Value::Array(rows)
}

fn resolve(dispatcher: &Dispatcher, path: &str, method: &Method, request: &Version) -> Value {
    let Some(registry) = dispatcher.endpoint(path) else {
        return json!({ "error": format!("no endpoint at {}", path) });
    };

    match registry.resolve(method, request) {
        Ok(hit) => json!({
            "request": request.to_string(),
            "handler": hit.handler.name,
            "handler_version": hit.version.to_string(),
            "tier": hit.tier,
            "status": hit.handler.status.as_u16(),
        }),
        Err(e) => json!({ "request": request.to_string(), "error": e.to_string() }),
    }
}
