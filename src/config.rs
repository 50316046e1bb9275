use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub(crate) const MAX_VERSION: u32 = 1;
pub(crate) const DEFAULT_INTERVAL_SECS: u64 = 1;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default = "default_version")]
    pub(crate) version: u32,

    /// Polling interval in seconds when watching for changes.
    #[serde(default)]
    pub(crate) interval: Option<u64>,

    /// Languages keyed by file extension, without the leading dot.
    #[serde(default, rename = "language")]
    pub(crate) languages: BTreeMap<String, LanguageConfig>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct LanguageConfig {
    pub(crate) compiler: String,

    #[serde(default)]
    pub(crate) flags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: MAX_VERSION,
            interval: None,
            languages: built_in_languages(),
        }
    }
}

fn default_version() -> u32 {
    MAX_VERSION
}

fn built_in_languages() -> BTreeMap<String, LanguageConfig> {
    let mut languages = BTreeMap::new();
    languages.insert(
        "cpp".to_owned(),
        LanguageConfig {
            compiler: "c++".to_owned(),
            flags: vec!["-std=c++11".to_owned()],
        },
    );
    languages
}

impl Config {
    /// Returns the configured languages, keyed by extension.
    pub(crate) fn languages(&self) -> Languages<'_> {
        Languages(&self.languages)
    }

    pub(crate) fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.unwrap_or(DEFAULT_INTERVAL_SECS))
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Languages<'a>(&'a BTreeMap<String, LanguageConfig>);

impl<'a> Languages<'a> {
    /// Returns the language used to build `path`, based on its extension.
    pub(crate) fn for_path(&self, path: &Path) -> Option<&'a LanguageConfig> {
        let extension = path.extension()?.to_str()?;
        self.0.get(extension)
    }

    pub(crate) fn is_supported(&self, path: &Path) -> bool {
        self.for_path(path).is_some()
    }
}

/// Loads configuration from `config_path`. A missing file yields the built-in defaults.
pub(crate) fn parse_file(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        log::info!("No config at `{}`, using defaults", config_path.display());
        return Ok(Config::default());
    }
    let contents = crate::fs::read_to_string(config_path)?;
    parse(&contents, config_path)
        .with_context(|| format!("Failed to parse {}", config_path.display()))
}

pub(crate) fn parse(contents: &str, config_path: &Path) -> Result<Config> {
    let mut config: Config = toml::from_str(contents)?;
    merge_built_ins(&mut config);
    crate::config_validation::validate(&config, config_path)?;
    Ok(config)
}

/// Fills in built-in languages that the config file didn't override.
fn merge_built_ins(config: &mut Config) {
    for (extension, language) in built_in_languages() {
        config.languages.entry(extension).or_insert(language);
    }
}
