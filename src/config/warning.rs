use super::defaults::CONFIG_FILE;
use console::style;
use std::{fmt, sync::Once};

static EXPERIMENTAL_WARNING: Once = Once::new();

/// A non-fatal finding while resolving the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `exportTrailingSlash` was migrated to `trailingSlash`.
    ExportTrailingSlash,
    /// `experimental.reactMode` was migrated to `experimental.reactRoot`.
    ReactMode,
    /// Experimental features are enabled.
    Experimental,
    /// The configuration file exists, but is empty.
    EmptyConfig,
}

impl ConfigWarning {
    /// Log the warning. The experimental features warning is only logged once per process.
    pub fn emit(&self) {
        match self {
            Self::Experimental => EXPERIMENTAL_WARNING.call_once(|| {
                tracing::warn!("{}", style("You have enabled experimental feature(s).").bold());
                tracing::warn!("{self}");
            }),
            Self::ExportTrailingSlash | Self::ReactMode => {
                tracing::warn!("{}{self}", style("Warning: ").yellow().bold())
            }
            Self::EmptyConfig => tracing::warn!("{self}"),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExportTrailingSlash => write!(
                f,
                r#"The "exportTrailingSlash" option has been renamed to "trailingSlash". Please update your {CONFIG_FILE}."#
            ),
            Self::ReactMode => write!(
                f,
                r#"The experimental "reactMode" option has been replaced with "reactRoot". Please update your {CONFIG_FILE}."#
            ),
            Self::Experimental => f.write_str(
                "Experimental features are not covered by semver, and may cause unexpected or broken application behavior. Use them at your own risk.",
            ),
            Self::EmptyConfig => write!(
                f,
                "Detected {CONFIG_FILE}, no exported configuration found. https://nextjs.org/docs/messages/empty-configuration"
            ),
        }
    }
}
