use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod content;
mod controller;
mod engine;
mod error;
mod model;
mod store;

use crate::config::load_settings;
use crate::content::ContentLoader;
use crate::engine::QuizEngine;
use crate::error::Result as AppResult;
use crate::store::CategoryStore;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_PKG_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = load_settings()?;
    tracing::info!("Configuration loaded: {:?}", settings.content);

    let loader = ContentLoader::new(settings.content.clone());
    let mut store = CategoryStore::new(loader);

    if let Some(engine_config) = settings.engine {
        let engine = QuizEngine::new(engine_config);
        if engine.test_connection().await {
            tracing::info!("Quiz engine reachable");
        } else {
            tracing::warn!("Quiz engine unreachable, external categories will stay empty");
        }
        store = store.with_engine(engine);
    } else {
        tracing::info!("No quiz engine configured, external categories disabled");
    }

    store.update_categories().await?;
    for category in store.get_categories() {
        tracing::info!(
            category.name = %category.name,
            category.source = ?category.source,
            "Category available"
        );
    }

    Ok(())
}
