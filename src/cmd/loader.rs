use crate::{
    common::SUCCESS,
    loader::{LoaderQuery, run},
};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Generate the serverless wrapper of a page.
#[derive(Clone, Debug, Args)]
#[command(name = "loader")]
pub struct Loader {
    /// The loader query, like `?page=/about&pagesDir=...`
    #[arg(long, conflicts_with = "query_file")]
    query: Option<String>,
    /// Read the loader query from a file.
    #[arg(long)]
    query_file: Option<PathBuf>,
    /// Write the module to a file, instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Loader {
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn run(self) -> Result<()> {
        let query = match (self.query, self.query_file) {
            (Some(query), _) => query,
            (None, Some(file)) => tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("unable to read query file '{}'", file.display()))?,
            (None, None) => anyhow::bail!("either --query or --query-file is required"),
        };

        // parsing a query never fails
        let Ok(query) = query.trim().parse::<LoaderQuery>();
        let module = run(&query).await?;

        match self.output {
            Some(output) => {
                tokio::fs::write(&output, module.source.as_bytes())
                    .await
                    .with_context(|| format!("unable to write '{}'", output.display()))?;
                tracing::info!(
                    "{}generated {} wrapper at {}",
                    SUCCESS,
                    module.kind,
                    output.display()
                );
            }
            None => print!("{module}"),
        }

        Ok(())
    }
}
