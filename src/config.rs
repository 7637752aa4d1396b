use crate::error::{ConfigError, Result as AppResult};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Connection parameters for the remote quiz engine. Fixed at construction
/// time; the engine client holds no other state.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub base_url: String,
    pub port: u16,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSourceType {
    File,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    pub source_type: ContentSourceType,
    pub categories_path: Option<String>,
    pub categories_url: Option<String>,
    pub questions_dir: Option<String>,
    pub questions_base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppSettings {
    pub content: ContentConfig,
    pub engine: Option<EngineConfig>,
}

pub fn load_settings() -> AppResult<AppSettings> {
    let builder = Config::builder()
        .add_source(
            Environment::with_prefix("QUIZDECK")
                .separator("__")
                .try_parsing(true),
        )
        .add_source(File::with_name("config").required(false))
        .set_default("content.source_type", "file")
        .map_err(|e| ConfigError::Load(e.to_string()))?
        .set_default("content.categories_path", "content/categories.json")
        .map_err(|e| ConfigError::Load(e.to_string()))?
        .set_default("content.questions_dir", "content/questions")
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let settings = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()).into())
}
