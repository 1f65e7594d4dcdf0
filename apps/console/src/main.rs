//! Nexo operator console.
//!
//! Exercises RUT validation, role capabilities and per-view filter state
//! against the configured storage backend.

#![forbid(unsafe_code)]

mod command;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use nexo_application::{FilterStore, KeyValueStore};
use nexo_core::{AppError, AppResult};
use nexo_domain::{ListView, Role, has_capability, validate_rut};
use nexo_infrastructure::{InMemoryKeyValueStore, JsonFileKeyValueStore, RedisKeyValueStore};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, FilterAction, USAGE, parse_filter_value};
use crate::config::{ConsoleConfig, StorageBackend};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(error) => {
            eprintln!("{error}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> AppResult<()> {
    match command {
        Command::Rut(input) => {
            let validation = validate_rut(input.as_str());
            println!("valid: {}", validation.is_valid());
            println!("formatted: {}", validation.formatted());
            match validation.error_message() {
                Some(message) => Err(AppError::Validation(message)),
                None => Ok(()),
            }
        }
        Command::Capabilities(role) => {
            let role: Role = role.parse()?;
            for capability in role.capabilities() {
                println!("{capability}");
            }
            Ok(())
        }
        Command::Can { role, token } => {
            let allowed = has_capability(role.as_str(), token.as_str());
            println!("{}", if allowed { "allowed" } else { "denied" });
            Ok(())
        }
        Command::Filters { view, action } => {
            let config = ConsoleConfig::load()?;
            let storage = build_storage(&config.storage)?;
            run_filters(config.app_namespace.as_str(), view, action, storage).await
        }
    }
}

async fn run_filters(
    app_namespace: &str,
    view: ListView,
    action: FilterAction,
    storage: Arc<dyn KeyValueStore>,
) -> AppResult<()> {
    let mut store = FilterStore::load(app_namespace, view.schema()?, storage).await?;
    debug!(view = %view, action = ?action, "running filters action");

    match action {
        FilterAction::Show => {
            print_json(store.filters())?;
            println!("active filters: {}", store.count_active());
        }
        FilterAction::Chips => match store.chips() {
            Some(chips) => {
                for chip in chips {
                    println!("[{}] {}", chip.key(), chip.label());
                }
            }
            None => println!("no active filters"),
        },
        FilterAction::Query => print_json(&store.list_query())?,
        FilterAction::Clear => store.clear_all().await,
        FilterAction::Views => {
            for saved_view in store.saved_views() {
                println!(
                    "{}  {}  {}",
                    saved_view.id(),
                    saved_view.created_at().format("%d/%m/%Y %H:%M"),
                    saved_view.name()
                );
            }
        }
        FilterAction::Set { field, values } => {
            let kind = store
                .schema()
                .field(field.as_str())
                .map(|definition| definition.kind())
                .ok_or_else(|| {
                    AppError::Validation(format!("view '{view}' has no filter field '{field}'"))
                })?;
            let value = parse_filter_value(kind, &values)?;
            store.update_field(field.as_str(), value).await?;
            print_json(store.filters())?;
        }
        FilterAction::Unset { field } => store.clear_field(field.as_str()).await?,
        FilterAction::Save { name } => {
            let saved_view = store.save_view(name.as_str(), None).await?;
            println!("{}", saved_view.id());
        }
        FilterAction::Apply(id) => {
            store.apply_view_by_id(id).await?;
            print_json(store.filters())?;
        }
        FilterAction::Delete(id) => {
            if !store.delete_view(id).await {
                return Err(AppError::NotFound(format!("saved view '{id}' does not exist")));
            }
        }
        FilterAction::Rename { id, name } => {
            let saved_view = store.rename_view(id, name.as_str()).await?;
            println!("{}  {}", saved_view.id(), saved_view.name());
        }
    }

    if !store.is_persisted() {
        eprintln!("warning: changes were applied but could not be persisted");
    }

    Ok(())
}

fn build_storage(backend: &StorageBackend) -> AppResult<Arc<dyn KeyValueStore>> {
    match backend {
        StorageBackend::File(path) => {
            info!(path = %path.display(), "using json file storage");
            Ok(Arc::new(JsonFileKeyValueStore::new(path.clone())))
        }
        StorageBackend::Memory => {
            info!("using in-memory storage; state is discarded on exit");
            Ok(Arc::new(InMemoryKeyValueStore::new()))
        }
        StorageBackend::Redis { url, key_prefix } => {
            let client = redis::Client::open(url.as_str()).map_err(|error| {
                AppError::Validation(format!("invalid REDIS_URL '{url}': {error}"))
            })?;
            info!(key_prefix = %key_prefix, "using redis storage");
            Ok(Arc::new(RedisKeyValueStore::new(client, key_prefix.clone())))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    let encoded = serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to encode output: {error}")))?;
    println!("{encoded}");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
