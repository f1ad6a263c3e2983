//! Generating the serverless wrapper module of a page.
//!
//! The bundler invokes the loader once per page, passing the build parameters as a query of
//! string values. Those get decoded into [`PageBuildParameters`], from which the wrapper source
//! is synthesized.

pub mod codegen;
pub mod devalue;
mod route;
mod template;

pub use route::RouteKind;
pub use template::{GeneratedModule, synthesize};

use crate::{common::normalize_path_sep, config::session_cookie_prefix};
use anyhow::{Context, anyhow, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, convert::Infallible, path::Path, str::FromStr};

/// The raw parameters handed over by the bundler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoaderQuery(HashMap<String, String>);

impl LoaderQuery {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn required(&self, key: &str) -> anyhow::Result<String> {
        self.get(key)
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("missing loader parameter '{key}'"))
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    }

    fn flag(&self, key: &str) -> anyhow::Result<bool> {
        match self.get(key).unwrap_or_default() {
            "" | "false" => Ok(false),
            "true" => Ok(true),
            value => bail!("loader parameter '{key}' must be 'true' or 'false', found '{value}'"),
        }
    }

    fn json(&self, key: &str) -> anyhow::Result<Option<Value>> {
        self.optional(key)
            .map(|value| {
                serde_json::from_str(&value)
                    .with_context(|| format!("loader parameter '{key}' is not valid JSON"))
            })
            .transpose()
    }
}

impl FromStr for LoaderQuery {
    type Err = Infallible;

    /// Parse a query string, with or without the leading `?`.
    fn from_str(query: &str) -> Result<Self, Self::Err> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Ok(Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        ))
    }
}

impl From<HashMap<String, String>> for LoaderQuery {
    fn from(value: HashMap<String, String>) -> Self {
        Self(value)
    }
}

/// An environment file, loaded by the build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedEnvFile {
    pub path: String,
    pub contents: String,
}

/// The decoded inputs for generating the wrapper of a single page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageBuildParameters {
    /// The route of the page, like `/post/[id]`.
    pub page: String,
    pub pages_dir: String,
    pub dist_dir: String,
    pub absolute_page_path: String,
    /// Only used by pages, empty for API routes.
    pub absolute_app_path: String,
    /// Only used by pages, empty for API routes.
    pub absolute_document_path: String,
    /// Only used by pages, empty for API routes.
    pub absolute_error_path: String,
    pub absolute_404_path: Option<String>,
    pub build_id: String,
    pub asset_prefix: String,
    pub canonical_base: String,
    pub base_path: String,
    pub generate_etags: bool,
    pub powered_by_header: bool,
    pub runtime_config: Option<Value>,
    pub preview_props: Value,
    pub loaded_env_files: Vec<LoadedEnvFile>,
    pub i18n: Option<Value>,
}

impl PageBuildParameters {
    /// Decode the parameters from the loader query.
    pub fn decode(query: &LoaderQuery) -> anyhow::Result<Self> {
        let page = query.required("page")?;

        let page_module = |key: &str| match RouteKind::of(&page) {
            RouteKind::Api => Ok(query.get(key).unwrap_or_default().to_string()),
            RouteKind::Page => query.required(key),
        };

        let preview_props = query
            .json("previewProps")?
            .ok_or_else(|| anyhow!("missing loader parameter 'previewProps'"))?;

        Ok(Self {
            pages_dir: query.required("pagesDir")?,
            dist_dir: query.required("distDir")?,
            absolute_page_path: query.required("absolutePagePath")?,
            absolute_app_path: page_module("absoluteAppPath")?,
            absolute_document_path: page_module("absoluteDocumentPath")?,
            absolute_error_path: page_module("absoluteErrorPath")?,
            absolute_404_path: query.optional("absolute404Path"),
            build_id: query.required("buildId")?,
            asset_prefix: query.get("assetPrefix").unwrap_or_default().to_string(),
            canonical_base: query.get("canonicalBase").unwrap_or_default().to_string(),
            base_path: query.get("basePath").unwrap_or_default().to_string(),
            generate_etags: query.flag("generateEtags")?,
            powered_by_header: query.flag("poweredByHeader")?,
            runtime_config: query.json("runtimeConfig")?,
            preview_props,
            loaded_env_files: decode_env_files(query.get("loadedEnvFiles").unwrap_or_default())?,
            i18n: query.json("i18n")?,
            page,
        })
    }
}

fn decode_env_files(encoded: &str) -> anyhow::Result<Vec<LoadedEnvFile>> {
    if encoded.is_empty() {
        return Ok(vec![]);
    }

    let decoded = STANDARD
        .decode(encoded)
        .context("loader parameter 'loadedEnvFiles' is not valid base64")?;
    serde_json::from_slice(&decoded)
        .context("loader parameter 'loadedEnvFiles' must be a list of environment files")
}

/// Run the loader: decode the query and generate the wrapper.
#[tracing::instrument(level = "trace", skip(query))]
pub async fn run(query: &LoaderQuery) -> anyhow::Result<GeneratedModule> {
    let params = PageBuildParameters::decode(query)?;

    let pages_dir = normalize_path_sep(&params.pages_dir);
    let session_cookie_prefix = session_cookie_prefix(Path::new(&pages_dir)).await?;

    let module = synthesize(&params, &session_cookie_prefix);
    tracing::debug!(
        "generated {} wrapper for {} ({} exports)",
        module.kind,
        params.page,
        module.exports.len()
    );

    Ok(module)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn encode_env_files(files: &[LoadedEnvFile]) -> String {
        STANDARD.encode(serde_json::to_vec(files).expect("must serialize"))
    }

    fn query(page: &str) -> HashMap<String, String> {
        HashMap::from_iter(
            [
                ("page", page),
                ("pagesDir", "/project/app/pages"),
                ("distDir", "/project/.next"),
                ("absolutePagePath", "/project/app/pages/index.tsx"),
                ("absoluteAppPath", "/project/app/pages/_app.tsx"),
                ("absoluteDocumentPath", "/project/app/pages/_document.tsx"),
                ("absoluteErrorPath", "/project/app/pages/_error.tsx"),
                ("buildId", "build.1"),
                ("previewProps", r#"{"previewModeId":"id"}"#),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn parse_query_string() {
        let query: LoaderQuery = "?page=%2Fposts%2F%5Bid%5D&generateEtags=true&basePath="
            .parse()
            .expect("infallible");
        assert_eq!(query.get("page"), Some("/posts/[id]"));
        assert_eq!(query.get("generateEtags"), Some("true"));
        assert_eq!(query.get("basePath"), Some(""));

        let query: LoaderQuery = "page=%2Fapi%2Fhello".parse().expect("infallible");
        assert_eq!(query.get("page"), Some("/api/hello"));
    }

    #[test]
    fn decode_page() {
        let mut raw = query("/posts/[id]");
        raw.insert("generateEtags".into(), "true".into());
        raw.insert("absolute404Path".into(), "".into());
        raw.insert("runtimeConfig".into(), r#"{"api":"/api"}"#.into());
        raw.insert(
            "loadedEnvFiles".into(),
            encode_env_files(&[LoadedEnvFile {
                path: ".env".into(),
                contents: "SECRET=1\n".into(),
            }]),
        );

        let params = PageBuildParameters::decode(&raw.into()).expect("must decode");
        assert_eq!(params.page, "/posts/[id]");
        assert!(params.generate_etags);
        assert!(!params.powered_by_header);
        assert_eq!(params.absolute_404_path, None);
        assert_eq!(params.runtime_config, Some(json!({"api": "/api"})));
        assert_eq!(params.preview_props, json!({"previewModeId": "id"}));
        assert_eq!(params.loaded_env_files[0].path, ".env");
        assert_eq!(params.i18n, None);
    }

    #[test]
    fn decode_api_route_without_page_modules() {
        let mut raw = query("/api/hello");
        raw.remove("absoluteAppPath");
        raw.remove("absoluteDocumentPath");
        raw.remove("absoluteErrorPath");

        let params = PageBuildParameters::decode(&raw.into()).expect("must decode");
        assert_eq!(params.absolute_app_path, "");
    }

    #[test]
    fn decode_errors() {
        let mut raw = query("/about");
        raw.remove("absoluteDocumentPath");
        let err = PageBuildParameters::decode(&raw.into()).expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "missing loader parameter 'absoluteDocumentPath'"
        );

        let mut raw = query("/about");
        raw.insert("poweredByHeader".into(), "yes".into());
        assert!(PageBuildParameters::decode(&raw.into()).is_err());

        let mut raw = query("/about");
        raw.insert("previewProps".into(), "{".into());
        assert!(PageBuildParameters::decode(&raw.into()).is_err());

        let mut raw = query("/about");
        raw.insert("loadedEnvFiles".into(), "not base64!".into());
        assert!(PageBuildParameters::decode(&raw.into()).is_err());
    }

    #[tokio::test]
    async fn run_reads_session_cookie_prefix() {
        let root = tempdir().expect("should be able to create temp directory");
        let pages = root.path().join("app").join("pages");
        fs::create_dir_all(&pages).expect("should create directories");
        fs::write(root.path().join("package.json"), r#"{"name": "shop"}"#)
            .expect("should write package.json");

        let mut raw = query("/about");
        raw.insert("pagesDir".into(), pages.to_string_lossy().into_owned());

        let module = run(&raw.into()).await.expect("must generate");
        assert_eq!(module.kind, RouteKind::Page);
        assert!(
            module
                .source
                .contains(r#"process.env.__BLITZ_SESSION_COOKIE_PREFIX = "shop""#)
        );
    }
}
