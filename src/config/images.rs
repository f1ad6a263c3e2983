//! Validation of the `images` group.

use super::{
    ConfigError,
    defaults::{DEFAULT_IMAGE_PATH, VALID_LOADERS},
};
use crate::js;
use serde_json::{Map, Value};

const MAX_DOMAINS: usize = 50;
const MAX_SIZES: usize = 25;
const SIZE_RANGE: std::ops::RangeInclusive<f64> = 1.0..=10000.0;

/// Validate and normalize the `images` group in place.
pub fn validate(images: &mut Value, base_path: &str) -> Result<(), ConfigError> {
    let found = js::type_of(Some(&*images));
    let Value::Object(images) = images else {
        return Err(ConfigError::ImagesType { found });
    };

    validate_domains(images)?;
    validate_sizes(images, "deviceSizes")?;
    validate_sizes(images, "imageSizes")?;
    normalize_loader(images)?;
    normalize_path(images, base_path);
    validate_minimum_cache_ttl(images)?;

    Ok(())
}

fn validate_domains(images: &Map<String, Value>) -> Result<(), ConfigError> {
    let domains = images.get("domains");
    if !js::is_truthy(domains) {
        return Ok(());
    }

    let Some(Value::Array(domains)) = domains else {
        return Err(ConfigError::ImageDomainsType {
            found: js::type_of(domains),
        });
    };

    if domains.len() > MAX_DOMAINS {
        return Err(ConfigError::ImageDomainsLength { len: domains.len() });
    }

    let invalid = domains.iter().filter(|d| !d.is_string()).collect::<Vec<_>>();
    if !invalid.is_empty() {
        return Err(ConfigError::ImageDomainsInvalid {
            values: js::join(&invalid),
        });
    }

    Ok(())
}

fn validate_sizes(images: &Map<String, Value>, field: &'static str) -> Result<(), ConfigError> {
    let sizes = images.get(field);
    if !js::is_truthy(sizes) {
        return Ok(());
    }

    let Some(Value::Array(sizes)) = sizes else {
        return Err(ConfigError::ImageSizesType {
            field,
            found: js::type_of(sizes),
        });
    };

    if sizes.len() > MAX_SIZES {
        return Err(ConfigError::ImageSizesLength {
            field,
            len: sizes.len(),
        });
    }

    let invalid = sizes
        .iter()
        .filter(|size| !size.as_f64().is_some_and(|size| SIZE_RANGE.contains(&size)))
        .collect::<Vec<_>>();
    if !invalid.is_empty() {
        return Err(ConfigError::ImageSizesInvalid {
            field,
            values: js::join(&invalid),
        });
    }

    Ok(())
}

fn normalize_loader(images: &mut Map<String, Value>) -> Result<(), ConfigError> {
    if !js::is_truthy(images.get("loader")) {
        images.insert("loader".into(), Value::from("default"));
    }

    match images.get("loader") {
        Some(Value::String(loader)) if VALID_LOADERS.contains(&loader.as_str()) => Ok(()),
        other => Err(ConfigError::ImageLoader {
            loader: other.map(js::display).unwrap_or_default(),
            valid: VALID_LOADERS.join(", "),
        }),
    }
}

fn normalize_path(images: &mut Map<String, Value>, base_path: &str) {
    let is_default_loader = images.get("loader").and_then(Value::as_str) == Some("default");

    if let Some(Value::String(path)) = images.get_mut("path") {
        // non-default loaders get a trailing slash, so paths can be joined
        if !path.is_empty() && !is_default_loader && !path.ends_with('/') {
            path.push('/');
        }

        if *path == DEFAULT_IMAGE_PATH && !base_path.is_empty() {
            *path = format!("{base_path}{path}");
        }
    }
}

fn validate_minimum_cache_ttl(images: &Map<String, Value>) -> Result<(), ConfigError> {
    let ttl = images.get("minimumCacheTTL");
    match ttl {
        Some(value) if js::is_truthy(ttl) => {
            if js::is_integer(value) && value.as_f64().is_some_and(|v| v >= 0.0) {
                Ok(())
            } else {
                Err(ConfigError::ImageMinimumCacheTtl {
                    value: js::display(value),
                })
            }
        }
        _ => Ok(()),
    }
}
