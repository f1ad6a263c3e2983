//! A narrow read of the session cookie prefix.
//!
//! Generating a page wrapper only needs this single derived value, so this does not resolve
//! (and validate) the full configuration.

use super::defaults::CONFIG_FILE;
use crate::common::find_up;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const DEFAULT_PREFIX: &str = "blitz";

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-zA-Z0-9_-]").expect("regex must compile"));

#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
}

/// The only settings of the configuration file consulted here. Values of the wrong type are
/// left for the full resolution to report.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionSettings {
    #[serde(default)]
    cookie_prefix: Option<Value>,
    #[serde(default)]
    default: Option<Value>,
}

impl SessionSettings {
    fn cookie_prefix(&self) -> Option<&str> {
        self.cookie_prefix
            .as_ref()
            .or_else(|| self.default.as_ref()?.get("cookiePrefix"))
            .and_then(Value::as_str)
            .filter(|prefix| !prefix.is_empty())
    }
}

/// Derive the session cookie prefix for the project containing `dir`.
///
/// A `cookiePrefix` in the configuration file wins over the package name.
pub async fn session_cookie_prefix(dir: &Path) -> Result<String> {
    if let Some(prefix) = configured_prefix(dir).await? {
        return Ok(sanitize(&prefix));
    }

    let Some(file) = find_up(dir, &["package.json"]).await? else {
        return Ok(DEFAULT_PREFIX.to_string());
    };

    let content = tokio::fs::read(&file)
        .await
        .with_context(|| format!("unable to read '{}'", file.display()))?;
    let package: PackageJson = serde_json::from_slice(&content)
        .with_context(|| format!("unable to parse '{}'", file.display()))?;

    Ok(prefix_from_name(package.name.as_deref()))
}

async fn configured_prefix(dir: &Path) -> Result<Option<String>> {
    let Some(file) = find_up(dir, &[CONFIG_FILE]).await? else {
        return Ok(None);
    };

    let content = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("unable to read configuration file '{}'", file.display()))?;
    let settings: SessionSettings = toml::from_str(&content)
        .with_context(|| format!("unable to parse configuration file '{}'", file.display()))?;

    Ok(settings.cookie_prefix().map(ToString::to_string))
}

fn prefix_from_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => sanitize(name),
        _ => DEFAULT_PREFIX.to_string(),
    }
}

fn sanitize(prefix: &str) -> String {
    UNSAFE_CHARS.replace_all(prefix, "_").into_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    #[rstest]
    #[case(Some("my-app"), "my-app")]
    #[case(Some("@acme/shop"), "_acme_shop")]
    #[case(Some("my_app.v2"), "my_app_v2")]
    #[case(Some(""), "blitz")]
    #[case(None, "blitz")]
    fn test_prefix(#[case] name: Option<&str>, #[case] expected: &str) {
        assert_eq!(prefix_from_name(name), expected);
    }

    #[tokio::test]
    async fn reads_nearest_package_json() {
        let root = tempdir().expect("should be able to create temp directory");
        let pages = root.path().join("app").join("pages");
        fs::create_dir_all(&pages).expect("should create directories");
        fs::write(
            root.path().join("package.json"),
            r#"{"name": "@acme/store", "version": "1.0.0"}"#,
        )
        .expect("should write package.json");

        let prefix = session_cookie_prefix(&pages).await.expect("must read");
        assert_eq!(prefix, "_acme_store");
    }

    #[tokio::test]
    async fn configured_prefix_wins() {
        let root = tempdir().expect("should be able to create temp directory");
        let pages = root.path().join("app").join("pages");
        fs::create_dir_all(&pages).expect("should create directories");
        fs::write(root.path().join("package.json"), r#"{"name": "store"}"#)
            .expect("should write package.json");
        fs::write(
            root.path().join(CONFIG_FILE),
            "cookiePrefix = \"acme.shop\"\n[images]\ndomains = 5\n",
        )
        .expect("should write config");

        let prefix = session_cookie_prefix(&pages).await.expect("must read");
        assert_eq!(prefix, "acme_shop");
    }

    #[tokio::test]
    async fn configured_prefix_in_default_table() {
        let root = tempdir().expect("should be able to create temp directory");
        fs::write(
            root.path().join(CONFIG_FILE),
            "[default]\ncookiePrefix = \"shop\"\n",
        )
        .expect("should write config");

        let prefix = session_cookie_prefix(root.path()).await.expect("must read");
        assert_eq!(prefix, "shop");
    }

    #[tokio::test]
    async fn config_without_prefix_uses_package_name() {
        let root = tempdir().expect("should be able to create temp directory");
        fs::write(root.path().join("package.json"), r#"{"name": "store"}"#)
            .expect("should write package.json");
        fs::write(root.path().join(CONFIG_FILE), "cookiePrefix = 42\n")
            .expect("should write config");

        let prefix = session_cookie_prefix(root.path()).await.expect("must read");
        assert_eq!(prefix, "store");
    }
}
