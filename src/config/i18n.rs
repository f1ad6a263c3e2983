//! Validation of the `i18n` group.

use super::ConfigError;
use crate::js;
use serde_json::{Map, Value};

const MAX_LOCALES: usize = 100;

/// Validate and normalize the `i18n` group in place.
///
/// On success, the default locale is the first entry of `locales`.
pub fn validate(i18n: &mut Value) -> Result<(), ConfigError> {
    let found = js::type_of(Some(&*i18n));
    let Value::Object(i18n) = i18n else {
        return Err(ConfigError::I18nType { found });
    };

    let locales = match i18n.get("locales") {
        Some(Value::Array(locales)) => locales,
        other => {
            return Err(ConfigError::I18nLocalesType {
                found: js::type_of(other),
            });
        }
    };

    if locales.len() > MAX_LOCALES {
        return Err(ConfigError::I18nLocalesLength { len: locales.len() });
    }

    let default_locale = match i18n.get("defaultLocale") {
        Some(Value::String(locale)) if !locale.is_empty() => locale.clone(),
        _ => return Err(ConfigError::I18nDefaultLocaleType),
    };

    validate_domains(i18n)?;

    let invalid = locales.iter().filter(|l| !l.is_string()).collect::<Vec<_>>();
    if !invalid.is_empty() {
        return Err(ConfigError::I18nLocalesInvalid {
            values: js::join(&invalid),
        });
    }

    if !locales.iter().any(|l| l.as_str() == Some(default_locale.as_str())) {
        return Err(ConfigError::I18nDefaultLocaleMissing);
    }

    let reordered = std::iter::once(Value::from(default_locale.as_str()))
        .chain(
            locales
                .iter()
                .filter(|l| l.as_str() != Some(default_locale.as_str()))
                .cloned(),
        )
        .collect::<Vec<_>>();
    i18n.insert("locales".into(), Value::Array(reordered));

    match i18n.get("localeDetection") {
        None | Some(Value::Bool(_)) => Ok(()),
        other => Err(ConfigError::I18nLocaleDetection {
            found: js::type_of(other),
        }),
    }
}

fn validate_domains(i18n: &Map<String, Value>) -> Result<(), ConfigError> {
    let domains = match i18n.get("domains") {
        None => return Ok(()),
        Some(Value::Array(domains)) => domains,
        other => {
            return Err(ConfigError::I18nDomainsType {
                found: js::type_of(other),
            });
        }
    };

    let invalid = domains
        .iter()
        .filter(|item| is_invalid_domain(item, domains))
        .map(|item| serde_json::to_string(item).unwrap_or_else(|_| js::display(item)))
        .collect::<Vec<_>>();

    if !invalid.is_empty() {
        return Err(ConfigError::I18nDomainsInvalid { entries: invalid });
    }

    Ok(())
}

/// Check a single domain entry, including conflicts with all other entries.
fn is_invalid_domain(item: &Value, domains: &[Value]) -> bool {
    let Value::Object(entry) = item else {
        return true;
    };
    if !js::is_truthy(entry.get("defaultLocale")) {
        return true;
    }
    let domain = match entry.get("domain") {
        Some(Value::String(domain)) if !domain.is_empty() => domain,
        _ => return true,
    };

    let duplicate = domains.iter().find(|other| {
        js::strict_eq(other.get("defaultLocale"), entry.get("defaultLocale"))
            && !js::strict_eq(other.get("domain"), entry.get("domain"))
    });
    if let Some(duplicate) = duplicate {
        tracing::warn!(
            "Both {domain} and {} configured the defaultLocale {} but only one can. Change one item's default locale to continue",
            duplicate.get("domain").map(js::display).unwrap_or_default(),
            entry.get("defaultLocale").map(js::display).unwrap_or_default(),
        );
        return true;
    }

    let mut has_invalid_locale = false;

    if let Some(Value::Array(locales)) = entry.get("locales") {
        for locale in locales {
            if !locale.is_string() {
                has_invalid_locale = true;
            }

            for other in domains {
                if std::ptr::eq(other, item) {
                    continue;
                }
                let claimed = other
                    .get("locales")
                    .and_then(Value::as_array)
                    .is_some_and(|locales| locales.iter().any(|l| js::strict_eq(Some(l), Some(locale))));
                if claimed {
                    tracing::warn!(
                        "Both {domain} and {} configured the locale ({}) but only one can. Remove it from one i18n.domains config to continue",
                        other.get("domain").map(js::display).unwrap_or_default(),
                        js::display(locale),
                    );
                    has_invalid_locale = true;
                    break;
                }
            }
        }
    }

    has_invalid_locale
}
