//! Configuration resolution.
//!
//! The user's `blitz.config.toml` (or a configuration injected by the caller) is merged over the
//! framework defaults, validated, and returned as a [`NextConfigComplete`]. Loading either fully
//! succeeds or fails, there is no partially resolved configuration.

mod assign;
mod defaults;
mod env;
mod error;
mod i18n;
mod images;
mod models;
mod session;
mod source;
mod warning;

#[cfg(test)]
mod test;

pub use assign::assign_defaults;
pub use defaults::{CONFIG_FILE, default_config};
pub use env::Environment;
pub use error::ConfigError;
pub use models::*;
pub use session::session_cookie_prefix;
pub use source::Source;
pub use warning::ConfigWarning;

use crate::{http_agent::HttpAgents, js};
use serde_json::{Map, Value};
use std::{future::Future, path::Path, str::FromStr};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The lifecycle phase the configuration is loaded for.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    AsRefStr,
    Display,
    EnumString,
    EnumIter,
    clap::ValueEnum,
)]
pub enum Phase {
    #[strum(serialize = "phase-export")]
    #[value(name = "phase-export")]
    Export,
    #[strum(serialize = "phase-production-build")]
    #[value(name = "phase-production-build")]
    ProductionBuild,
    #[strum(serialize = "phase-production-server")]
    #[value(name = "phase-production-server")]
    ProductionServer,
    #[strum(serialize = "phase-development-server")]
    #[value(name = "phase-development-server")]
    DevelopmentServer,
}

impl Phase {
    /// The configuration was already compiled by a preceding build, when starting the server.
    pub fn needs_compilation(self) -> bool {
        !matches!(self, Self::ProductionServer)
    }
}

/// Side effects performed before the configuration is read.
///
/// All of them default to doing nothing.
pub trait LoadHooks {
    /// Load the environment files of the project.
    fn prime_env(
        &self,
        _dir: &Path,
        _dev: bool,
    ) -> impl Future<Output = anyhow::Result<()>> + Send {
        async { Ok(()) }
    }

    /// Compile the configuration file, if it needs it.
    fn compile_config(&self, _dir: &Path) -> impl Future<Output = anyhow::Result<()>> + Send {
        async { Ok(()) }
    }

    /// Register the bundler customization hook.
    fn load_bundler_hook(
        &self,
        _phase: Phase,
        _dir: &Path,
    ) -> impl Future<Output = anyhow::Result<()>> + Send {
        async { Ok(()) }
    }
}

/// Hooks which don't do anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl LoadHooks for NoopHooks {}

/// Resolve the configuration of a project.
///
/// An `injected` configuration replaces the discovery of the configuration file.
#[tracing::instrument(level = "trace", skip(injected, env, hooks, agents))]
pub async fn load_config(
    phase: Phase,
    dir: &Path,
    injected: Option<Map<String, Value>>,
    env: &Environment,
    hooks: &impl LoadHooks,
    agents: &HttpAgents,
) -> anyhow::Result<NextConfigComplete> {
    hooks
        .prime_env(dir, phase == Phase::DevelopmentServer)
        .await?;
    if phase.needs_compilation() {
        hooks.compile_config(dir).await?;
    }
    hooks.load_bundler_hook(phase, dir).await?;

    if let Some(injected) = injected {
        let mut user = Map::new();
        user.insert("configOrigin".into(), "server".into());
        user.extend(injected);
        return Ok(resolved(assign_defaults(user, agents)?));
    }

    let file = match Source::find(dir).await? {
        Source::File(file) => file,
        Source::Default => {
            tracing::debug!("no configuration file found, using the defaults");
            let config = default_config().clone();
            agents.set_options(config.get("httpAgentOptions").unwrap_or(&Value::Null))?;
            return Ok(NextConfigComplete::new(config));
        }
    };

    tracing::debug!("loading configuration from {}", file.display());
    let mut user = normalize_config(phase, source::load_from(&file).await?);

    if env.vercel_builder {
        if let Some(orchestrator) = source::load_orchestrator(dir).await? {
            tracing::debug!("merging the build orchestrator's configuration: {orchestrator:?}");
            user.extend(orchestrator);
        }
    }

    if user.is_empty() {
        ConfigWarning::EmptyConfig.emit();
    }

    validate_target(&user)?;
    strip_canonical_base(&mut user);

    if let Some(target) = env.target_override() {
        user.insert("target".into(), target.into());
    }

    let mut config = Map::new();
    config.insert("configOrigin".into(), CONFIG_FILE.into());
    config.insert(
        "configFile".into(),
        file.to_string_lossy().into_owned().into(),
    );
    config.extend(user);

    Ok(resolved(assign_defaults(config, agents)?))
}

fn resolved(assigned: assign::Assigned) -> NextConfigComplete {
    if !assigned.warnings.is_empty() {
        tracing::debug!(
            "configuration resolved with {} warning(s)",
            assigned.warnings.len()
        );
    }
    assigned.config
}

/// Select the parts of a configuration file which apply to a phase.
///
/// A `[default]` table takes the place of the whole file. A `[phases.<phase>]` table is merged over
/// the top level.
pub fn normalize_config(phase: Phase, mut config: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::Object(default)) = config.get("default") {
        config = default.clone();
    }

    let Some(phases) = config.shift_remove("phases") else {
        return config;
    };

    if let Some(Value::Object(overrides)) = phases.get(phase.as_ref()) {
        for (key, value) in overrides {
            config.insert(key.clone(), value.clone());
        }
    }

    config
}

fn validate_target(user: &Map<String, Value>) -> Result<(), ConfigError> {
    let target = user.get("target");
    if !js::is_truthy(target) {
        return Ok(());
    }

    let valid = target
        .and_then(Value::as_str)
        .is_some_and(|target| Target::from_str(target).is_ok());
    if valid {
        return Ok(());
    }

    Err(ConfigError::InvalidTarget {
        target: target.map(js::display).unwrap_or_default(),
        valid: Target::valid(),
    })
}

fn strip_canonical_base(user: &mut Map<String, Value>) {
    let Some(Value::Object(amp)) = user.get_mut("amp") else {
        return;
    };

    if let Some(Value::String(canonical_base)) = amp.get_mut("canonicalBase") {
        if canonical_base.ends_with('/') {
            canonical_base.pop();
        }
    }
}
