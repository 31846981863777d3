use std::path::PathBuf;

use anyhow::{Context, Result};
use piq_config::GlobalArgs;
use piq_settings::{CONFIG_FILE_NAME, Settings};

/// Settings after layering CLI flags over the settings file.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolvedConfig {
    pub(crate) settings: Settings,
    pub(crate) pretty: bool,
}

/// Default settings file location: `<config dir>/piq/piq.toml`.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("piq").join(CONFIG_FILE_NAME))
}

pub(crate) fn resolve(global: &GlobalArgs) -> Result<ResolvedConfig> {
    let settings = match &global.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from '{}'", path.display()))?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                log::debug!("Loading settings from {}", path.display());
                Settings::from_file(&path)
                    .with_context(|| format!("Failed to load settings from '{}'", path.display()))?
            }
            None => Settings::default(),
        },
    };

    let pretty = global.pretty || settings.output.pretty;
    Ok(ResolvedConfig { settings, pretty })
}
