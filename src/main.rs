//! Standalone gateway host.
//!
//! Runs a gateway with an in-memory `config:*` store and the admin surface,
//! for exercising policies and inspecting audit data outside an embedding
//! application.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dashmap::DashMap;
use serde_json::Value;

use ipc_gateway::config::{load_config, GatewayConfig};
use ipc_gateway::gateway::{HandlerError, HandlerRegistry};
use ipc_gateway::lifecycle::startup;

#[derive(Parser)]
#[command(name = "ipc-gateway")]
#[command(about = "Secure IPC gateway host", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn key_arg(args: &[Value]) -> Result<String, HandlerError> {
    args.first()
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| HandlerError::new("Key must be a string"))
}

fn config_store_handlers() -> HandlerRegistry {
    let store: Arc<DashMap<String, Value>> = Arc::new(DashMap::new());
    let mut handlers = HandlerRegistry::new();

    let get_store = store.clone();
    handlers.register_fn("config:get", move |args| {
        let store = get_store.clone();
        async move {
            let key = key_arg(&args)?;
            let value = store.get(&key).map(|v| v.value().clone());
            Ok::<_, HandlerError>(value.unwrap_or(Value::Null))
        }
    });

    let set_store = store.clone();
    handlers.register_fn("config:set", move |args| {
        let store = set_store.clone();
        async move {
            let key = key_arg(&args)?;
            let value = args.get(1).cloned().unwrap_or(Value::Null);
            store.insert(key, value);
            Ok::<_, HandlerError>(Value::Bool(true))
        }
    });

    handlers.register_fn("config:delete", move |args| {
        let store = store.clone();
        async move {
            let key = key_arg(&args)?;
            Ok::<_, HandlerError>(Value::Bool(store.remove(&key).is_some()))
        }
    });

    handlers
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    startup::run(config, config_store_handlers()).await?;
    Ok(())
}
