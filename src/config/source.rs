use super::{
    ConfigError,
    defaults::{CONFIG_FILE, ORCHESTRATOR_CONFIG_FILE, UNSUPPORTED_CONFIG_FILES},
};
use crate::common::{find_up, path_exists_and};
use anyhow::{Context, bail};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A configuration source
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// The canonical configuration file
    File(PathBuf),
    /// No configuration file was found, the defaults apply
    Default,
}

impl Source {
    /// Find the configuration file in a directory, or one of its ancestors.
    ///
    /// When there is none, but a file looks like it was meant to be one, this fails.
    pub async fn find(dir: &Path) -> anyhow::Result<Source> {
        if let Some(file) = find_up(dir, &[CONFIG_FILE]).await? {
            return Ok(Source::File(file));
        }

        if let Some(file) = find_up(dir, UNSUPPORTED_CONFIG_FILES).await? {
            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(ConfigError::UnsupportedConfigFile {
                name,
                canonical: CONFIG_FILE,
            }
            .into());
        }

        Ok(Source::Default)
    }
}

/// Load the user's configuration from a TOML file.
pub async fn load_from(file: &Path) -> anyhow::Result<Map<String, Value>> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("unable to read configuration file '{}'", file.display()))?;

    let value: Value = toml::from_str(&content)
        .with_context(|| format!("unable to parse configuration file '{}'", file.display()))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("configuration file '{}' is not a table", file.display()),
    }
}

/// Load the configuration a build orchestrator placed into the project directory, if present.
pub async fn load_orchestrator(dir: &Path) -> anyhow::Result<Option<Map<String, Value>>> {
    let file = dir.join(ORCHESTRATOR_CONFIG_FILE);
    if !path_exists_and(&file, |meta| meta.is_file()).await? {
        return Ok(None);
    }

    let content = tokio::fs::read(&file)
        .await
        .with_context(|| format!("unable to read '{}'", file.display()))?;

    match serde_json::from_slice(&content)
        .with_context(|| format!("unable to parse '{}'", file.display()))?
    {
        Value::Object(map) => Ok(Some(map)),
        _ => bail!("'{}' must contain a JSON object", file.display()),
    }
}
