use super::*;
use serde_json::json;
use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};
use tempfile::{TempDir, tempdir};

fn project(config: Option<&str>) -> TempDir {
    let dir = tempdir().expect("should be able to create temp directory");
    if let Some(config) = config {
        fs::write(dir.path().join(CONFIG_FILE), config).expect("should write config");
    }
    dir
}

async fn load(dir: &Path, phase: Phase, env: &Environment) -> anyhow::Result<NextConfigComplete> {
    load_config(phase, dir, None, env, &NoopHooks, &HttpAgents::new()).await
}

#[tokio::test]
async fn defaults_without_config_file() {
    let dir = project(None);
    let agents = HttpAgents::new();

    let config = load_config(
        Phase::ProductionBuild,
        dir.path(),
        None,
        &Environment::default(),
        &NoopHooks,
        &agents,
    )
    .await
    .expect("must load");

    assert_eq!(&*config, default_config());
    assert_eq!(config.config_origin(), "default");
    assert!(agents.get().is_some());
}

#[tokio::test]
async fn unsupported_config_file() {
    let dir = project(None);
    fs::write(dir.path().join("blitz.config.js"), "module.exports = {}")
        .expect("should write config");

    let err = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect_err("must fail");
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::UnsupportedConfigFile {
            name: "blitz.config.js".into(),
            canonical: CONFIG_FILE,
        })
    );
}

#[tokio::test]
async fn config_file() {
    let dir = project(Some(
        r#"
basePath = "/docs"
trailingSlash = true

[images]
domains = ["example.com"]
"#,
    ));

    let config = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect("must load");

    assert_eq!(config.config_origin(), CONFIG_FILE);
    assert_eq!(
        config["configFile"],
        json!(dir.path().join(CONFIG_FILE).to_string_lossy())
    );
    assert_eq!(config.base_path(), "/docs");
    assert_eq!(config.asset_prefix(), "/docs");
    assert!(config.trailing_slash());

    let images = config.images().expect("must read images");
    assert_eq!(images.domains, vec!["example.com".to_string()]);
    assert_eq!(images.path, "/docs/_next/image");
}

#[tokio::test]
async fn config_file_in_ancestor() {
    let dir = project(Some(r#"distDir = "build""#));
    let nested = dir.path().join("app");
    fs::create_dir_all(&nested).expect("should create directory");

    let config = load(&nested, Phase::ProductionBuild, &Environment::default())
        .await
        .expect("must load");
    assert_eq!(config.dist_dir(), PathBuf::from("build"));
}

#[tokio::test]
async fn empty_config_file() {
    let dir = project(Some(""));

    let config = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect("must load");
    assert_eq!(config.config_origin(), CONFIG_FILE);
    assert_eq!(config.dist_dir(), PathBuf::from(".next"));
}

#[tokio::test]
async fn validation_errors_are_fatal() {
    let dir = project(Some(r#"distDir = "public""#));

    let err = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect_err("must fail");
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::DistDirReserved)
    );
}

#[tokio::test]
async fn invalid_target() {
    let dir = project(Some(r#"target = "lambda""#));

    let err = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect_err("must fail");
    assert_eq!(
        err.to_string(),
        r#"Specified target is invalid. Provided: "lambda" should be one of server, serverless, experimental-serverless-trace"#
    );
}

#[tokio::test]
async fn target_override() {
    let dir = project(Some(r#"target = "serverless""#));

    let config = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect("must load");
    assert_eq!(config.target().expect("must be valid"), Target::Serverless);

    let env = Environment {
        has_next_support: true,
        ..Default::default()
    };
    let config = load(dir.path(), Phase::ProductionBuild, &env)
        .await
        .expect("must load");
    assert_eq!(config.target().expect("must be valid"), Target::Server);

    let env = Environment {
        private_target: Some("experimental-serverless-trace".into()),
        ..Default::default()
    };
    let config = load(dir.path(), Phase::ProductionBuild, &env)
        .await
        .expect("must load");
    assert_eq!(
        config.target().expect("must be valid"),
        Target::ExperimentalServerlessTrace
    );
}

#[tokio::test]
async fn canonical_base_trailing_slash() {
    let dir = project(Some(
        r#"
[amp]
canonicalBase = "https://example.com/"
"#,
    ));

    let config = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect("must load");
    assert_eq!(config.canonical_base(), "https://example.com");
}

#[tokio::test]
async fn phase_tables() {
    let dir = project(Some(
        r#"
distDir = "build"
poweredByHeader = false

[phases.phase-development-server]
distDir = "build-dev"
"#,
    ));

    let config = load(dir.path(), Phase::DevelopmentServer, &Environment::default())
        .await
        .expect("must load");
    assert_eq!(config.dist_dir(), PathBuf::from("build-dev"));
    assert_eq!(config["poweredByHeader"], false);
    assert!(!config.contains_key("phases"));

    let config = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect("must load");
    assert_eq!(config.dist_dir(), PathBuf::from("build"));
}

#[tokio::test]
async fn default_table() {
    let dir = project(Some(
        r#"
[default]
basePath = "/blog"
"#,
    ));

    let config = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect("must load");
    assert_eq!(config.base_path(), "/blog");
    assert!(!config.contains_key("default"));
}

#[tokio::test]
async fn orchestrator_config() {
    let dir = project(Some(r#"distDir = "build""#));
    fs::write(
        dir.path().join("next.config.json"),
        r#"{"distDir": "vercel-out"}"#,
    )
    .expect("should write config");

    let config = load(dir.path(), Phase::ProductionBuild, &Environment::default())
        .await
        .expect("must load");
    assert_eq!(config.dist_dir(), PathBuf::from("build"));

    let env = Environment {
        vercel_builder: true,
        ..Default::default()
    };
    let config = load(dir.path(), Phase::ProductionBuild, &env)
        .await
        .expect("must load");
    assert_eq!(config.dist_dir(), PathBuf::from("vercel-out"));
}

#[tokio::test]
async fn injected_config() {
    // the unsupported file must not be looked at
    let dir = project(None);
    fs::write(dir.path().join("next.config.js"), "").expect("should write config");

    let injected = json!({"basePath": "/app", "target": "lambda"});
    let config = load_config(
        Phase::ProductionServer,
        dir.path(),
        injected.as_object().cloned(),
        &Environment::default(),
        &NoopHooks,
        &HttpAgents::new(),
    )
    .await
    .expect("must load");

    assert_eq!(config.config_origin(), "server");
    assert_eq!(config.base_path(), "/app");
    assert_eq!(config["target"], "lambda");
}

#[derive(Default)]
struct CountingHooks {
    primed: AtomicUsize,
    compiled: AtomicUsize,
    hooked: AtomicUsize,
}

impl LoadHooks for CountingHooks {
    async fn prime_env(&self, _dir: &Path, _dev: bool) -> anyhow::Result<()> {
        self.primed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn compile_config(&self, _dir: &Path) -> anyhow::Result<()> {
        self.compiled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_bundler_hook(&self, _phase: Phase, _dir: &Path) -> anyhow::Result<()> {
        self.hooked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn start_skips_compilation() {
    let dir = project(None);

    for (phase, compiled) in [
        (Phase::ProductionServer, 0),
        (Phase::ProductionBuild, 1),
        (Phase::DevelopmentServer, 1),
        (Phase::Export, 1),
    ] {
        let hooks = CountingHooks::default();
        load_config(
            phase,
            dir.path(),
            None,
            &Environment::default(),
            &hooks,
            &HttpAgents::new(),
        )
        .await
        .expect("must load");

        assert_eq!(hooks.primed.load(Ordering::SeqCst), 1, "{phase}");
        assert_eq!(hooks.compiled.load(Ordering::SeqCst), compiled, "{phase}");
        assert_eq!(hooks.hooked.load(Ordering::SeqCst), 1, "{phase}");
    }
}

#[test]
fn phase_names() {
    assert_eq!(Phase::Export.as_ref(), "phase-export");
    assert_eq!(
        "phase-production-server".parse::<Phase>().expect("must parse"),
        Phase::ProductionServer
    );
}
