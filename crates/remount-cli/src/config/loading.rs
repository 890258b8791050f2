use crate::config::RemountConfig;
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Serialized, Toml},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file picked up next to the target when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "remount.toml";

/// Settings given on the command line. Unset flags leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl RemountConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// `search_dir` is where `remount.toml` is looked up when `config_path`
    /// is `None`; a missing default file is not an error.
    pub fn load(
        config_path: Option<&Path>,
        search_dir: &Path,
        overrides: &CliOverrides,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(config_path, search_dir)? {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Toml::file(path));
        }

        // REMOUNT_PORT, REMOUNT_SETTLE_MS, ...
        figment = figment.merge(Env::prefixed("REMOUNT_"));
        figment = figment.merge(Serialized::defaults(overrides));

        let config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: format!("Check {CONFIG_FILE_NAME} syntax and field types"),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn config_file(config_path: Option<&Path>, search_dir: &Path) -> Result<Option<PathBuf>> {
        match config_path {
            Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ConfigError::NotFound(path.to_path_buf()).into()),
            None => {
                let default_path = search_dir.join(CONFIG_FILE_NAME);
                Ok(default_path.is_file().then_some(default_path))
            }
        }
    }
}
