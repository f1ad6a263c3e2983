//! Shared HTTP connection pools.
//!
//! All outbound HTTP calls share one plain and one TLS-only client per process. The options of
//! the first configuration which gets loaded win, later attempts to set them are ignored.

use crate::{
    config::{ConfigError, HttpAgentOptions},
    js,
};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use url::Url;

/// The pair of pooled clients.
#[derive(Debug)]
pub struct Agents {
    pub options: HttpAgentOptions,
    pub http: reqwest::Client,
    pub https: reqwest::Client,
}

impl Agents {
    /// The client to use for a URL.
    pub fn client(&self, url: &Url) -> &reqwest::Client {
        match url.scheme() {
            "https" => &self.https,
            _ => &self.http,
        }
    }
}

/// A guarded, one-time initialized holder of the shared [`Agents`].
#[derive(Debug, Default)]
pub struct HttpAgents {
    agents: OnceCell<Arc<Agents>>,
}

static GLOBAL: HttpAgents = HttpAgents::new();

impl HttpAgents {
    pub const fn new() -> Self {
        Self {
            agents: OnceCell::new(),
        }
    }

    /// The process-wide instance.
    pub fn global() -> &'static HttpAgents {
        &GLOBAL
    }

    /// The agents, if already initialized.
    pub fn get(&self) -> Option<Arc<Agents>> {
        self.agents.get().cloned()
    }

    /// Initialize the agents from the `httpAgentOptions` configuration value.
    ///
    /// If the agents are already initialized, nothing changes and the existing agents are
    /// returned, regardless of the options passed.
    pub fn set_options(&self, options: &Value) -> Result<Arc<Agents>, ConfigError> {
        if let Some(agents) = self.agents.get() {
            tracing::trace!("http agents already initialized, ignoring options");
            return Ok(agents.clone());
        }

        if !js::is_truthy(Some(options)) {
            return Err(ConfigError::HttpAgentOptions);
        }
        let options = options
            .as_object()
            .map(HttpAgentOptions::from_config)
            .unwrap_or_default();

        self.agents
            .get_or_try_init(|| {
                tracing::debug!(?options, "initializing http agents");
                let http = build_client(&options, false)?;
                let https = build_client(&options, true)?;
                Ok(Arc::new(Agents {
                    options,
                    http,
                    https,
                }))
            })
            .cloned()
    }
}

fn build_client(
    options: &HttpAgentOptions,
    https_only: bool,
) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::ClientBuilder::new().https_only(https_only);

    if options.keep_alive == Some(false) {
        builder = builder.pool_max_idle_per_host(0);
    } else if let Some(max) = options.max_free_sockets {
        builder = builder.pool_max_idle_per_host(max);
    }

    if let Some(msecs) = options.keep_alive_msecs {
        builder = builder.tcp_keepalive(Duration::from_millis(msecs));
    }

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(Duration::from_millis(timeout));
    }

    builder
        .build()
        .map_err(|err| ConfigError::HttpAgent(err.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn first_writer_wins() {
        let agents = HttpAgents::new();
        assert!(agents.get().is_none());

        let first = agents
            .set_options(&json!({"keepAlive": true}))
            .expect("must initialize");
        let second = agents
            .set_options(&json!({"keepAlive": false, "timeout": 10}))
            .expect("must not fail");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.options.keep_alive, Some(true));
        assert_eq!(second.options.timeout, None);
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!(false))]
    #[case(json!(0))]
    #[case(json!(""))]
    fn rejects_missing_options(#[case] options: Value) {
        let agents = HttpAgents::new();
        assert_eq!(
            agents.set_options(&options).expect_err("must fail"),
            ConfigError::HttpAgentOptions
        );
        assert!(agents.get().is_none());
    }

    #[rstest]
    #[case(json!({"keepAlive": true, "keepAliveMsecs": 1500.5}), HttpAgentOptions {
        keep_alive: Some(true),
        keep_alive_msecs: Some(1500),
        ..Default::default()
    })]
    #[case(json!({"keepAlive": "yes"}), HttpAgentOptions {
        keep_alive: Some(true),
        ..Default::default()
    })]
    #[case(json!({"timeout": -1, "maxFreeSockets": "8"}), HttpAgentOptions::default())]
    #[case(json!(true), HttpAgentOptions::default())]
    fn accepts_loose_options(#[case] options: Value, #[case] expected: HttpAgentOptions) {
        let agents = HttpAgents::new();
        let agents = agents.set_options(&options).expect("must initialize");
        assert_eq!(agents.options, expected);
    }

    #[test]
    fn client_by_scheme() {
        let agents = HttpAgents::new();
        let agents = agents.set_options(&json!({})).expect("must initialize");

        let url = Url::parse("https://example.com/routes-manifest.json").expect("valid url");
        assert!(std::ptr::eq(agents.client(&url), &agents.https));
        let url = Url::parse("http://localhost:3000/routes-manifest.json").expect("valid url");
        assert!(std::ptr::eq(agents.client(&url), &agents.http));
    }

    #[test]
    fn ignores_invalid_options_once_initialized() {
        let agents = HttpAgents::new();
        agents
            .set_options(&json!({}))
            .expect("must initialize");
        assert!(agents.set_options(&json!("nope")).is_ok());
    }
}
