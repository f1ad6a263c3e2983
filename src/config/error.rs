use thiserror::Error;

/// A fatal problem with the user supplied configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuring Blitz.js via '{name}' is not supported. Please replace the file with '{canonical}'")]
    UnsupportedConfigFile {
        name: String,
        canonical: &'static str,
    },
    #[error("Specified target is invalid. Provided: \"{target}\" should be one of {valid}")]
    InvalidTarget { target: String, valid: String },

    #[error("Specified distDir is not a string, found type \"{found}\"")]
    DistDirType { found: &'static str },
    #[error(
        "The 'public' directory is reserved in Blitz.js and can not be set as the 'distDir'. https://nextjs.org/docs/messages/can-not-output-to-public"
    )]
    DistDirReserved,
    #[error(
        "Invalid distDir provided, distDir can not be an empty string. Please remove this config or set it to undefined"
    )]
    DistDirEmpty,

    #[error(
        "Specified pageExtensions is not an array of strings, found \"{found}\". Please update this config or remove it."
    )]
    PageExtensionsType { found: String },
    #[error(
        "Specified pageExtensions is an empty array. Please update it with the relevant extensions or remove it."
    )]
    PageExtensionsEmpty,
    #[error(
        "Specified pageExtensions is not an array of strings, found \"{value}\" of type \"{found}\". Please update this config or remove it."
    )]
    PageExtensionType { value: String, found: &'static str },

    #[error(
        "Specified assetPrefix is not a string, found type \"{found}\" https://nextjs.org/docs/messages/invalid-assetprefix"
    )]
    AssetPrefixType { found: &'static str },
    #[error("Specified basePath is not a string, found type \"{found}\"")]
    BasePathType { found: &'static str },
    #[error("Specified basePath /. basePath has to be either an empty string or a path prefix")]
    BasePathRoot,
    #[error("Specified basePath has to start with a /, found \"{base_path}\"")]
    BasePathLeadingSlash { base_path: String },
    #[error("Specified basePath should not end with /, found \"{base_path}\"")]
    BasePathTrailingSlash { base_path: String },

    #[error("Specified images should be an object received {found}.\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config")]
    ImagesType { found: &'static str },
    #[error("Specified images.domains should be an Array received {found}.\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config")]
    ImageDomainsType { found: &'static str },
    #[error(
        "Specified images.domains exceeds length of 50, received length ({len}), please reduce the length of the array to continue.\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config"
    )]
    ImageDomainsLength { len: usize },
    #[error(
        "Specified images.domains should be an Array of strings received invalid values ({values}).\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config"
    )]
    ImageDomainsInvalid { values: String },
    #[error("Specified images.{field} should be an Array received {found}.\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config")]
    ImageSizesType {
        field: &'static str,
        found: &'static str,
    },
    #[error(
        "Specified images.{field} exceeds length of 25, received length ({len}), please reduce the length of the array to continue.\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config"
    )]
    ImageSizesLength { field: &'static str, len: usize },
    #[error(
        "Specified images.{field} should be an Array of numbers that are between 1 and 10000, received invalid values ({values}).\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config"
    )]
    ImageSizesInvalid { field: &'static str, values: String },
    #[error(
        "Specified images.loader should be one of ({valid}), received invalid value ({loader}).\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config"
    )]
    ImageLoader { loader: String, valid: String },
    #[error(
        "Specified images.minimumCacheTTL should be an integer 0 or more, received ({value}).\nSee more info here: https://nextjs.org/docs/messages/invalid-images-config"
    )]
    ImageMinimumCacheTtl { value: String },

    #[error("Expected config.httpAgentOptions to be an object")]
    HttpAgentOptions,
    #[error("Unable to create the shared HTTP agents: {0}")]
    HttpAgent(String),

    #[error("Specified i18n should be an object received {found}.\nSee more info here: https://nextjs.org/docs/messages/invalid-i18n-config")]
    I18nType { found: &'static str },
    #[error("Specified i18n.locales should be an Array received {found}.\nSee more info here: https://nextjs.org/docs/messages/invalid-i18n-config")]
    I18nLocalesType { found: &'static str },
    #[error(
        "Received {len} i18n.locales items which exceeds the max of 100, please reduce the number of items to continue.\nSee more info here: https://nextjs.org/docs/messages/invalid-i18n-config"
    )]
    I18nLocalesLength { len: usize },
    #[error(
        "Specified i18n.locales contains invalid values ({values}), locales must be valid locale tags provided as strings e.g. \"en-US\".\nSee here for list of valid language sub-tags: http://www.iana.org/assignments/language-subtag-registry/language-subtag-registry"
    )]
    I18nLocalesInvalid { values: String },
    #[error("Specified i18n.defaultLocale should be a string.\nSee more info here: https://nextjs.org/docs/messages/invalid-i18n-config")]
    I18nDefaultLocaleType,
    #[error(
        "Specified i18n.domains must be an array of domain objects e.g. [ {{ domain: 'example.fr', defaultLocale: 'fr', locales: ['fr'] }} ] received {found}.\nSee more info here: https://nextjs.org/docs/messages/invalid-i18n-config"
    )]
    I18nDomainsType { found: &'static str },
    #[error(
        "Invalid i18n.domains values:\n{}\n\ndomains value must follow format {{ domain: 'example.fr', defaultLocale: 'fr', locales: ['fr'] }}.\nSee more info here: https://nextjs.org/docs/messages/invalid-i18n-config",
        .entries.join("\n")
    )]
    I18nDomainsInvalid { entries: Vec<String> },
    #[error("Specified i18n.defaultLocale should be included in i18n.locales.\nSee more info here: https://nextjs.org/docs/messages/invalid-i18n-config")]
    I18nDefaultLocaleMissing,
    #[error(
        "Specified i18n.localeDetection should be undefined or a boolean received {found}.\nSee more info here: https://nextjs.org/docs/messages/invalid-i18n-config"
    )]
    I18nLocaleDetection { found: &'static str },
}
