//! Framework defaults.

use once_cell::sync::Lazy;
use serde_json::{Map, Value, json};

/// The canonical configuration file name.
pub const CONFIG_FILE: &str = "blitz.config.toml";

/// File names which look like a configuration, but are not supported.
pub const UNSUPPORTED_CONFIG_FILES: &[&str] = &[
    "blitz.config.js",
    "blitz.config.jsx",
    "blitz.config.ts",
    "blitz.config.tsx",
    "blitz.config.json",
    "blitz.config.yaml",
    "next.config.js",
    "next.config.jsx",
    "next.config.ts",
    "next.config.tsx",
    "next.config.json",
];

/// The configuration file provided by a third-party build orchestrator.
pub const ORCHESTRATOR_CONFIG_FILE: &str = "next.config.json";

pub const VALID_LOADERS: &[&str] = &["default", "imgix", "cloudinary", "akamai", "custom"];

pub const DEFAULT_IMAGE_PATH: &str = "/_next/image";

static DEFAULT_CONFIG: Lazy<Map<String, Value>> = Lazy::new(|| {
    let value = json!({
        "env": {},
        "webpack": null,
        "webpackDevMiddleware": null,
        "distDir": ".next",
        "cleanDistDir": true,
        "assetPrefix": "",
        "configOrigin": "default",
        "useFileSystemPublicRoutes": true,
        "generateEtags": true,
        "pageExtensions": ["tsx", "ts", "jsx", "js"],
        "target": "server",
        "poweredByHeader": true,
        "compress": true,
        "analyticsId": "",
        "images": image_defaults(),
        "devIndicators": {
            "buildActivity": true
        },
        "onDemandEntries": {
            "maxInactiveAge": 60 * 1000,
            "pagesBufferLength": 2
        },
        "amp": {
            "canonicalBase": ""
        },
        "basePath": "",
        "sassOptions": {},
        "trailingSlash": false,
        "i18n": null,
        "productionBrowserSourceMaps": false,
        "optimizeFonts": true,
        "excludeDefaultMomentLocales": true,
        "serverRuntimeConfig": {},
        "publicRuntimeConfig": {},
        "reactStrictMode": false,
        "httpAgentOptions": {
            "keepAlive": true
        },
        "outputFileTracing": true,
        "experimental": {
            "swcMinify": false,
            "swcLoader": false,
            "cpus": default_cpus(),
            "plugins": false,
            "profiling": false,
            "isrFlushToDisk": true,
            "workerThreads": false,
            "pageEnv": false,
            "optimizeImages": false,
            "optimizeCss": false,
            "scrollRestoration": false,
            "stats": false,
            "externalDir": false,
            "reactRoot": false,
            "disableOptimizedLoading": false,
            "gzipSize": true,
            "craCompat": false,
            "esmExternals": false,
            "staticPageGenerationTimeout": 60,
            "pageDataCollectionTimeout": 60,
            "isrMemoryCacheSize": 50 * 1024 * 1024,
            "concurrentFeatures": false
        },
        "future": {
            "strictPostcssBrowserslist": false
        }
    });

    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
});

/// The complete default configuration.
pub fn default_config() -> &'static Map<String, Value> {
    &DEFAULT_CONFIG
}

/// The defaults of the `images` group.
pub fn image_defaults() -> Value {
    json!({
        "deviceSizes": [640, 750, 828, 1080, 1200, 1920, 2048, 3840],
        "imageSizes": [16, 32, 48, 64, 96, 128, 256, 384],
        "path": DEFAULT_IMAGE_PATH,
        "loader": "default",
        "domains": [],
        "disableStaticImages": false,
        "minimumCacheTTL": 60
    })
}

fn default_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let defaults = default_config();
        for key in [
            "experimental",
            "images",
            "i18n",
            "amp",
            "httpAgentOptions",
            "basePath",
            "assetPrefix",
        ] {
            assert!(defaults.contains_key(key), "missing default for {key}");
        }
        assert_eq!(defaults["images"]["loader"], "default");
        assert_eq!(defaults["i18n"], Value::Null);
    }
}
