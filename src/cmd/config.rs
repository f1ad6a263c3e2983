use crate::{
    config::{
        Environment, HttpAgentOptions, NextConfigComplete, NoopHooks, Phase,
        is_target_like_serverless, load_config,
    },
    http_agent::HttpAgents,
};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::{
    fmt::Write,
    path::{Path, PathBuf},
};

/// Configuration controls.
#[derive(Clone, Debug, Args)]
#[command(name = "config")]
pub struct Config {
    #[command(subcommand)]
    action: ConfigSubcommands,
}

impl Config {
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn run(self) -> Result<()> {
        match self.action {
            ConfigSubcommands::Show { project } => {
                let config = project.load().await?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigSubcommands::Check { project } => {
                let config = project.load().await?;
                let agents = HttpAgents::global()
                    .get()
                    .map(|agents| agents.options.clone())
                    .unwrap_or_default();
                print!("{}", report(&config, &agents)?);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Subcommand)]
enum ConfigSubcommands {
    /// Show the resolved configuration.
    Show {
        #[command(flatten)]
        project: Project,
    },
    /// Validate the configuration and summarize the settings relevant for a build.
    Check {
        #[command(flatten)]
        project: Project,
    },
}

#[derive(Clone, Debug, Args)]
struct Project {
    /// The phase to resolve the configuration for.
    #[arg(long, value_enum, default_value_t = Phase::ProductionBuild)]
    phase: Phase,
    /// The project directory [default: current directory]
    #[arg(long)]
    dir: Option<PathBuf>,
    #[command(flatten)]
    env: Environment,
}

impl Project {
    async fn load(self) -> Result<NextConfigComplete> {
        let dir = match self.dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("unable to get current directory")?,
        };
        load_config(
            self.phase,
            &dir,
            None,
            &self.env,
            &NoopHooks,
            HttpAgents::global(),
        )
        .await
    }
}

/// Render the typed view of a resolved configuration.
fn report(config: &NextConfigComplete, agents: &HttpAgentOptions) -> Result<String> {
    let mut out = String::new();

    match config.get("configFile").and_then(|file| file.as_str()) {
        Some(file) => writeln!(out, "source:          {}", Path::new(file).display())?,
        None => writeln!(out, "source:          {}", config.config_origin())?,
    }

    let target = config.target()?;
    if is_target_like_serverless(target.as_ref()) {
        writeln!(out, "target:          {target} (one function per page)")?;
    } else {
        writeln!(out, "target:          {target}")?;
    }

    writeln!(out, "distDir:         {}", config.dist_dir().display())?;
    writeln!(out, "basePath:        {}", or_none(config.base_path()))?;
    writeln!(out, "assetPrefix:     {}", or_none(config.asset_prefix()))?;
    writeln!(out, "canonicalBase:   {}", or_none(config.canonical_base()))?;
    writeln!(out, "trailingSlash:   {}", config.trailing_slash())?;
    writeln!(out, "pageExtensions:  {}", config.page_extensions()?.join(", "))?;

    let images = config.images()?;
    writeln!(
        out,
        "images:          {} loader at {}, {} domain(s), cached for at least {}s",
        images.loader,
        images.path,
        images.domains.len(),
        images.minimum_cache_ttl
    )?;
    writeln!(out, "  deviceSizes:   {}", join(&images.device_sizes))?;
    writeln!(out, "  imageSizes:    {}", join(&images.image_sizes))?;
    if images.disable_static_images {
        writeln!(out, "  static images are disabled")?;
    }

    match config.i18n()? {
        None => writeln!(out, "i18n:            (none)")?,
        Some(i18n) => {
            writeln!(
                out,
                "i18n:            {} (default {}), locale detection {}",
                i18n.locales.join(", "),
                i18n.default_locale,
                if i18n.locale_detection == Some(false) {
                    "off"
                } else {
                    "on"
                }
            )?;
            for domain in i18n.domains.unwrap_or_default() {
                let scheme = if domain.http == Some(true) {
                    "http"
                } else {
                    "https"
                };
                writeln!(
                    out,
                    "  {scheme}://{}: {} ({})",
                    domain.domain,
                    domain.default_locale,
                    domain.locales.unwrap_or_default().join(", ")
                )?;
            }
        }
    }

    let configured = config.http_agent_options();
    writeln!(out, "httpAgents:      {}", agent_options(agents))?;
    if configured != *agents {
        writeln!(
            out,
            "  configured {} but the agents were already initialized",
            agent_options(&configured)
        )?;
    }

    Ok(out)
}

fn or_none(value: &str) -> &str {
    if value.is_empty() { "(none)" } else { value }
}

fn join(sizes: &[u32]) -> String {
    sizes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn agent_options(options: &HttpAgentOptions) -> String {
    let mut parts = vec![format!(
        "keepAlive {}",
        options.keep_alive.unwrap_or_default()
    )];
    if let Some(msecs) = options.keep_alive_msecs {
        parts.push(format!("keepAliveMsecs {msecs}"));
    }
    if let Some(max) = options.max_free_sockets {
        parts.push(format!("maxFreeSockets {max}"));
    }
    if let Some(timeout) = options.timeout {
        parts.push(format!("timeout {timeout}"));
    }
    parts.join(", ")
}
