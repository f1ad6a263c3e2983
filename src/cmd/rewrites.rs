use crate::{
    config::default_config,
    http_agent::HttpAgents,
    manifest::{ROUTES_MANIFEST, RoutesManifest},
};
use anyhow::Result;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use url::Url;

/// Show the rewrites of a routes manifest, in the order they get matched.
#[derive(Clone, Debug, Args)]
#[command(name = "rewrites")]
pub struct Rewrites {
    /// The routes manifest, a path or an http(s) URL [default: .next/routes-manifest.json]
    #[arg(long)]
    manifest: Option<String>,
}

/// Where to read the manifest from.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Location {
    File(PathBuf),
    Remote(Url),
}

impl Location {
    fn parse(manifest: Option<String>) -> Self {
        let Some(manifest) = manifest else {
            return Self::File(PathBuf::from(".next").join(ROUTES_MANIFEST));
        };

        match Url::parse(&manifest) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::File(PathBuf::from(manifest)),
        }
    }
}

impl Rewrites {
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn run(self) -> Result<()> {
        let manifest = match Location::parse(self.manifest) {
            Location::File(path) => RoutesManifest::load(&path).await?,
            Location::Remote(url) => {
                let options = default_config()
                    .get("httpAgentOptions")
                    .unwrap_or(&Value::Null);
                let agents = HttpAgents::global().set_options(options)?;
                RoutesManifest::fetch(&url, &agents).await?
            }
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&manifest.rewrites.flatten())?
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Location::File(PathBuf::from(".next").join(ROUTES_MANIFEST)))]
    #[case(Some("build/routes-manifest.json"), Location::File("build/routes-manifest.json".into()))]
    #[case(Some(r"C:\app\.next\routes-manifest.json"), Location::File(r"C:\app\.next\routes-manifest.json".into()))]
    #[case(
        Some("https://builds.example.com/42/routes-manifest.json"),
        Location::Remote(Url::parse("https://builds.example.com/42/routes-manifest.json").expect("valid url"))
    )]
    fn test_location(#[case] manifest: Option<&str>, #[case] expected: Location) {
        assert_eq!(Location::parse(manifest.map(ToString::to_string)), expected);
    }
}
