//! Merging user configuration over the defaults.
//!
//! The work happens in ordered stages: migrate deprecated keys, reduce and validate the user
//! keys, merge them over the defaults, derive settings from `basePath`, and finally validate the
//! nested groups. Stages report warnings into a shared list, which gets logged once all stages
//! ran (or one of them failed).

use super::{
    ConfigError, ConfigWarning, NextConfigComplete,
    defaults::default_config,
    i18n, images,
};
use crate::{http_agent::HttpAgents, js};
use serde_json::{Map, Value};

/// The outcome of [`assign_defaults`].
#[derive(Debug)]
pub struct Assigned {
    pub config: NextConfigComplete,
    pub warnings: Vec<ConfigWarning>,
}

/// Merge a user configuration over the defaults, validating it along the way.
///
/// The shared HTTP agents get initialized with the resulting `httpAgentOptions`, unless they
/// already are.
pub fn assign_defaults(
    user: Map<String, Value>,
    agents: &HttpAgents,
) -> Result<Assigned, ConfigError> {
    let mut warnings = Vec::new();
    let result = resolve(user, agents, &mut warnings);

    for warning in &warnings {
        warning.emit();
    }

    result.map(|config| Assigned {
        config: NextConfigComplete::new(config),
        warnings,
    })
}

fn resolve(
    mut user: Map<String, Value>,
    agents: &HttpAgents,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<Map<String, Value>, ConfigError> {
    migrate(&mut user, warnings);
    let reduced = reduce(user, warnings)?;
    let mut result = merge(reduced);

    let base_path = derive_from_base_path(&mut result)?;

    if js::is_truthy(result.get("images")) {
        if let Some(value) = result.get_mut("images") {
            images::validate(value, &base_path)?;
        }
    }

    let options = result
        .get("httpAgentOptions")
        .filter(|options| js::is_truthy(Some(*options)))
        .or_else(|| default_config().get("httpAgentOptions"))
        .cloned()
        .unwrap_or(Value::Null);
    agents.set_options(&options)?;

    if js::is_truthy(result.get("i18n")) {
        if let Some(value) = result.get_mut("i18n") {
            i18n::validate(value)?;
        }
    }

    Ok(result)
}

/// Move deprecated keys to their replacements.
fn migrate(user: &mut Map<String, Value>, warnings: &mut Vec<ConfigWarning>) {
    if let Some(value) = user.shift_remove("exportTrailingSlash") {
        warnings.push(ConfigWarning::ExportTrailingSlash);
        if !user.contains_key("trailingSlash") {
            user.insert("trailingSlash".into(), value);
        }
    }

    if let Some(Value::Object(experimental)) = user.get_mut("experimental") {
        if let Some(mode) = experimental.shift_remove("reactMode") {
            warnings.push(ConfigWarning::ReactMode);
            if !experimental.contains_key("reactRoot") {
                let root = matches!(mode.as_str(), Some("concurrent" | "blocking"));
                experimental.insert("reactRoot".into(), Value::Bool(root));
            }
        }
    }
}

/// Validate the top-level user keys and merge structured values one level deep over their
/// defaults. Missing values (`null`) are dropped.
fn reduce(
    user: Map<String, Value>,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<Map<String, Value>, ConfigError> {
    let defaults = default_config();
    let mut reduced = Map::new();

    for (key, value) in user {
        if value.is_null() {
            continue;
        }

        // a user provided value is never the default instance
        if key == "experimental" {
            warnings.push(ConfigWarning::Experimental);
        }

        let value = match key.as_str() {
            "distDir" => validate_dist_dir(&value)?,
            "pageExtensions" => {
                validate_page_extensions(&value)?;
                value
            }
            _ => value,
        };

        let value = match value {
            Value::Object(overrides) => {
                let mut merged = match defaults.get(&key) {
                    Some(Value::Object(defaults)) => defaults.clone(),
                    _ => Map::new(),
                };
                merged.extend(overrides.into_iter().filter(|(_, v)| !v.is_null()));
                Value::Object(merged)
            }
            other => other,
        };

        reduced.insert(key, value);
    }

    Ok(reduced)
}

fn validate_dist_dir(value: &Value) -> Result<Value, ConfigError> {
    let Value::String(dist_dir) = value else {
        return Err(ConfigError::DistDirType {
            found: js::type_of(Some(value)),
        });
    };

    let dist_dir = dist_dir.trim();
    // 'public' is reserved for static files
    if dist_dir == "public" {
        return Err(ConfigError::DistDirReserved);
    }
    // an empty directory would end up removing the project directory
    if dist_dir.is_empty() {
        return Err(ConfigError::DistDirEmpty);
    }

    Ok(Value::from(dist_dir))
}

fn validate_page_extensions(value: &Value) -> Result<(), ConfigError> {
    let Value::Array(extensions) = value else {
        return Err(ConfigError::PageExtensionsType {
            found: js::display(value),
        });
    };

    if extensions.is_empty() {
        return Err(ConfigError::PageExtensionsEmpty);
    }

    match extensions.iter().find(|ext| !ext.is_string()) {
        Some(ext) => Err(ConfigError::PageExtensionType {
            value: js::display(ext),
            found: js::type_of(Some(ext)),
        }),
        None => Ok(()),
    }
}

/// Overlay the reduced user configuration over the defaults.
fn merge(reduced: Map<String, Value>) -> Map<String, Value> {
    let mut result = default_config().clone();
    result.extend(reduced);
    result
}

/// Validate `assetPrefix` and `basePath`, deriving empty prefixes from the base path.
///
/// Returns the validated base path.
fn derive_from_base_path(result: &mut Map<String, Value>) -> Result<String, ConfigError> {
    let asset_prefix = match result.get("assetPrefix") {
        Some(Value::String(prefix)) => prefix.clone(),
        other => {
            return Err(ConfigError::AssetPrefixType {
                found: js::type_of(other),
            });
        }
    };

    let base_path = match result.get("basePath") {
        Some(Value::String(base_path)) => base_path.clone(),
        other => {
            return Err(ConfigError::BasePathType {
                found: js::type_of(other),
            });
        }
    };

    if base_path.is_empty() {
        return Ok(base_path);
    }

    if base_path == "/" {
        return Err(ConfigError::BasePathRoot);
    }
    if !base_path.starts_with('/') {
        return Err(ConfigError::BasePathLeadingSlash { base_path });
    }
    if base_path.ends_with('/') {
        return Err(ConfigError::BasePathTrailingSlash { base_path });
    }

    if asset_prefix.is_empty() {
        result.insert("assetPrefix".into(), Value::from(base_path.as_str()));
    }

    if let Some(Value::Object(amp)) = result.get_mut("amp") {
        if amp.get("canonicalBase").and_then(Value::as_str) == Some("") {
            amp.insert("canonicalBase".into(), Value::from(base_path.as_str()));
        }
    }

    Ok(base_path)
}
