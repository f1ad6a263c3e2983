//! Build manifests, as far as the wrappers need them.

use crate::http_agent::Agents;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use url::Url;

pub const BUILD_MANIFEST: &str = "build-manifest.json";
pub const ROUTES_MANIFEST: &str = "routes-manifest.json";
pub const REACT_LOADABLE_MANIFEST: &str = "react-loadable-manifest.json";

/// A single rewrite rule. Its shape is up to the router.
pub type Rewrite = Value;

/// The rewrite rules of the routes manifest.
///
/// Earlier rules take precedence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RewriteSet {
    Flat(Vec<Rewrite>),
    #[serde(rename_all = "camelCase")]
    Phased {
        #[serde(default)]
        before_files: Vec<Rewrite>,
        #[serde(default)]
        after_files: Vec<Rewrite>,
        #[serde(default)]
        fallback: Vec<Rewrite>,
    },
}

impl Default for RewriteSet {
    fn default() -> Self {
        Self::Flat(vec![])
    }
}

impl RewriteSet {
    /// All rules, in the order they get matched.
    pub fn flatten(self) -> Vec<Rewrite> {
        match self {
            Self::Flat(rewrites) => rewrites,
            Self::Phased {
                before_files,
                after_files,
                fallback,
            } => before_files
                .into_iter()
                .chain(after_files)
                .chain(fallback)
                .collect(),
        }
    }
}

/// The routes manifest. Only the rewrites are of interest, everything else is kept as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutesManifest {
    #[serde(default)]
    pub rewrites: RewriteSet,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl RoutesManifest {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("unable to read routes manifest '{}'", path.display()))?;
        serde_json::from_slice(&content)
            .with_context(|| format!("unable to parse routes manifest '{}'", path.display()))
    }

    /// Download the manifest of a build published elsewhere, using the shared agents.
    pub async fn fetch(url: &Url, agents: &Agents) -> Result<Self> {
        tracing::debug!("downloading routes manifest from {url}");
        let content = agents
            .client(url)
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("unable to download routes manifest '{url}'"))?
            .bytes()
            .await
            .with_context(|| format!("unable to download routes manifest '{url}'"))?;
        serde_json::from_slice(&content)
            .with_context(|| format!("unable to parse routes manifest '{url}'"))
    }
}
