//! Terminal front end for Stask.
//!
//! Reads commands from stdin and prints the list after each one. Storage
//! location and logging are configured through environment variables; see
//! [`stask::config`].

use anyhow::Context;
use stask::config::Config;
use stask::{load_state, shell, TodoEnvironment, TodoReducer, TodoStore};
use stask_core::environment::UuidGenerator;
use stask_runtime::FileStore;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    stask_runtime::metrics::describe_store_metrics();

    let storage = Arc::new(FileStore::new(&config.data_file));
    tracing::info!(path = %storage.path().display(), "Opening todo storage");

    let mut state = load_state(&*storage)
        .await
        .with_context(|| format!("loading todos from {}", config.data_file.display()))?;
    state.show_completed = config.show_completed;

    let env = TodoEnvironment::new(Arc::new(UuidGenerator), storage);
    let store = TodoStore::new(state, TodoReducer::new(), env);

    shell::run(&store, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    tracing::info!("Goodbye");
    Ok(())
}
