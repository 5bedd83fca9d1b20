use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Base model for first-pass suggestions.
pub const BASE_MODEL: &str = "gpt-4o-mini";
/// Stronger model for the improve and fix passes.
pub const IMPROVED_MODEL: &str = "gpt-4o";

/// Default number of independent completions per request.
pub const DEFAULT_SAMPLES: u32 = 2;
/// Output-length cap per completion.
pub const MAX_TOKENS: u32 = 256;
/// Moderate sampling temperature: some variety across samples without
/// drifting off the query.
pub const TEMPERATURE: f32 = 0.5;

/// Keys shorter than this are certainly not real credentials.
const MIN_API_KEY_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub use_mock: bool,
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// The optional `~/.askg/config.toml` file is read first; the
    /// `OPENAI_API_KEY` and `ASKG_USE_MOCK` environment variables override
    /// anything it contains.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file().unwrap_or_else(|_| {
            info!("No config file found, using defaults");
            Self::default()
        });

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            config.openai_api_key = Some(api_key);
        }

        if std::env::var("ASKG_USE_MOCK").is_ok() {
            config.use_mock = true;
        }

        Ok(config)
    }

    fn load_from_file() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            info!("Loaded config from: {}", path.display());
            Ok(config)
        } else {
            Err(anyhow!("Config file not found"))
        }
    }

    fn config_path() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".askg").join("config.toml"))
    }

    /// Returns the API key if one is configured and plausible.
    ///
    /// A key shorter than 8 characters is treated the same as a missing
    /// key: a configuration error the caller reports before exiting.
    pub fn api_key(&self) -> Result<&str> {
        match self.openai_api_key.as_deref() {
            Some(key) if key.len() >= MIN_API_KEY_LEN => Ok(key),
            Some(_) => Err(anyhow!(
                "OPENAI_API_KEY seems invalid (too short to be a real key)"
            )),
            None => Err(anyhow!(
                "No OpenAI API key found. Set the OPENAI_API_KEY environment variable \
                 or add openai_api_key to ~/.askg/config.toml"
            )),
        }
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock
    }
}
