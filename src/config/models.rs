//! The resolved configuration model
//!
//! Resolution works on untyped values, as the user configuration needs to be checked with the
//! JavaScript notion of types. Once resolved, the settings can be consumed through typed views.

use crate::js;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{ops::Deref, path::PathBuf};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// The deployment target of the build.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Deserialize, AsRefStr, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Target {
    Server,
    Serverless,
    ExperimentalServerlessTrace,
}

impl Target {
    /// Render all valid targets, for error messages.
    pub fn valid() -> String {
        Self::iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the target produces one self-contained function per page.
    pub fn is_serverless_like(self) -> bool {
        matches!(self, Self::Serverless | Self::ExperimentalServerlessTrace)
    }
}

/// Check if a target name describes a serverless-like target.
pub fn is_target_like_serverless(target: &str) -> bool {
    target
        .parse::<Target>()
        .is_ok_and(|target| target.is_serverless_like())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub device_sizes: Vec<u32>,
    pub image_sizes: Vec<u32>,
    pub path: String,
    pub loader: String,
    pub domains: Vec<String>,
    #[serde(default)]
    pub disable_static_images: bool,
    #[serde(rename = "minimumCacheTTL")]
    pub minimum_cache_ttl: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainLocale {
    pub domain: String,
    pub default_locale: String,
    #[serde(default)]
    pub locales: Option<Vec<String>>,
    #[serde(default)]
    pub http: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct I18nConfig {
    pub locales: Vec<String>,
    pub default_locale: String,
    #[serde(default)]
    pub domains: Option<Vec<DomainLocale>>,
    #[serde(default)]
    pub locale_detection: Option<bool>,
}

/// Options for the shared connection pools.
///
/// Read leniently: an option with a value that does not fit is ignored, like the runtime
/// ignores it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpAgentOptions {
    /// Keep idle connections around for reuse.
    pub keep_alive: Option<bool>,
    /// TCP keep-alive probe interval, in milliseconds.
    pub keep_alive_msecs: Option<u64>,
    /// Maximum number of idle connections kept per host.
    pub max_free_sockets: Option<usize>,
    /// Request timeout, in milliseconds.
    pub timeout: Option<u64>,
}

impl HttpAgentOptions {
    /// Read the options from the `httpAgentOptions` object.
    pub fn from_config(options: &Map<String, Value>) -> Self {
        let keep_alive = options
            .get("keepAlive")
            .filter(|value| !value.is_null())
            .map(|value| js::is_truthy(Some(value)));

        Self {
            keep_alive,
            keep_alive_msecs: non_negative(options, "keepAliveMsecs").map(|n| n as u64),
            max_free_sockets: non_negative(options, "maxFreeSockets").map(|n| n as usize),
            timeout: non_negative(options, "timeout").map(|n| n as u64),
        }
    }
}

fn non_negative(options: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = options.get(key).filter(|value| !value.is_null())?;
    match value.as_f64() {
        Some(n) if n.is_finite() && n >= 0.0 => Some(n.trunc()),
        _ => {
            tracing::warn!(
                "ignoring config.httpAgentOptions.{key}, expected a non-negative number but got {}",
                js::display(value)
            );
            None
        }
    }
}

/// A fully resolved configuration. Every known setting is present.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NextConfigComplete(Map<String, Value>);

impl NextConfigComplete {
    pub(crate) fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    fn typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<T> {
        let value = self.0.get(key).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).with_context(|| format!("unable to read config.{key}"))
    }

    pub fn dist_dir(&self) -> PathBuf {
        PathBuf::from(self.str_field("distDir"))
    }

    pub fn base_path(&self) -> &str {
        self.str_field("basePath")
    }

    pub fn asset_prefix(&self) -> &str {
        self.str_field("assetPrefix")
    }

    pub fn config_origin(&self) -> &str {
        self.str_field("configOrigin")
    }

    pub fn canonical_base(&self) -> &str {
        self.0
            .get("amp")
            .and_then(|amp| amp.get("canonicalBase"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn trailing_slash(&self) -> bool {
        self.0
            .get("trailingSlash")
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    pub fn page_extensions(&self) -> Result<Vec<String>> {
        self.typed("pageExtensions")
    }

    pub fn target(&self) -> Result<Target> {
        self.typed("target")
    }

    pub fn images(&self) -> Result<ImageConfig> {
        self.typed("images")
    }

    pub fn i18n(&self) -> Result<Option<I18nConfig>> {
        self.typed("i18n")
    }

    pub fn http_agent_options(&self) -> HttpAgentOptions {
        self.0
            .get("httpAgentOptions")
            .and_then(Value::as_object)
            .map(HttpAgentOptions::from_config)
            .unwrap_or_default()
    }
}

impl Deref for NextConfigComplete {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("server", false)]
    #[case("serverless", true)]
    #[case("experimental-serverless-trace", true)]
    #[case("unknown", false)]
    fn test_serverless_like(#[case] target: &str, #[case] expected: bool) {
        assert_eq!(is_target_like_serverless(target), expected);
    }

    #[test]
    fn test_valid_targets() {
        assert_eq!(
            Target::valid(),
            "server, serverless, experimental-serverless-trace"
        );
    }
}
