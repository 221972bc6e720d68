//! File-loadable engine configuration.
//!
//! Every field is optional in the source; missing fields keep their defaults. Keys are
//! snake_case, with the camelCase spellings accepted as aliases.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vdom::{DiffOptions, SelectorError, SelectorList, SkipMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid skip selector: {0}")]
    Selector(#[from] SelectorError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(alias = "skipSelector", skip_serializing_if = "Option::is_none")]
    pub skip_selector: Option<String>,
    #[serde(alias = "skipAttributes")]
    pub skip_attributes: Vec<String>,
    #[serde(alias = "skipChildren")]
    pub skip_children: bool,
    #[serde(alias = "skipMode")]
    pub skip_mode: SkipMode,
    pub debug: bool,
    #[serde(alias = "diffcap", alias = "diffCap", skip_serializing_if = "Option::is_none")]
    pub diff_cap: Option<usize>,
    #[serde(alias = "valueDiffing")]
    pub value_diffing: bool,
    #[serde(alias = "caseSensitive")]
    pub case_sensitive: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&DiffOptions::default())
    }
}

impl From<&DiffOptions> for EngineConfig {
    fn from(options: &DiffOptions) -> Self {
        Self {
            skip_selector: options
                .skip_selector
                .as_ref()
                .map(|selectors| selectors.as_str().to_string()),
            skip_attributes: options.skip_attributes.clone(),
            skip_children: options.skip_children,
            skip_mode: options.skip_mode,
            debug: options.debug,
            diff_cap: options.diff_cap,
            value_diffing: options.value_diffing,
            case_sensitive: options.case_sensitive,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!(target: "engine", "loaded configuration from {path:?}");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Validates the configuration and turns it into diff options.
    pub fn into_options(self) -> Result<DiffOptions, ConfigError> {
        let skip_selector = self
            .skip_selector
            .as_deref()
            .map(SelectorList::parse)
            .transpose()?;
        Ok(DiffOptions {
            skip_selector,
            skip_attributes: self.skip_attributes,
            skip_children: self.skip_children,
            skip_mode: self.skip_mode,
            debug: self.debug,
            diff_cap: self.diff_cap,
            value_diffing: self.value_diffing,
            case_sensitive: self.case_sensitive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, EngineConfig::default());
        let options = config.into_options().expect("options");
        assert!(options.value_diffing);
        assert!(!options.case_sensitive);
        assert_eq!(options.skip_mode, SkipMode::Full);
        assert_eq!(options.diff_cap, None);
    }

    #[test]
    fn fields_merge_over_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
skip_selector = "script, style"
skipMode = "children"
diffcap = 10
debug = true
"#,
        )
        .expect("config");
        assert_eq!(config.skip_mode, SkipMode::Children);
        assert_eq!(config.diff_cap, Some(10));
        assert!(config.value_diffing, "untouched fields keep defaults");
        let options = config.into_options().expect("options");
        assert_eq!(
            options.skip_selector.as_ref().map(SelectorList::as_str),
            Some("script, style")
        );
        assert_eq!(options.effective_cap(), Some(10));
    }

    #[test]
    fn bad_selector_is_a_configuration_error() {
        let config = EngineConfig::from_toml_str("skip_selector = \"div,,p\"").expect("parses");
        assert!(matches!(
            config.into_options(),
            Err(ConfigError::Selector(SelectorError::Empty(_)))
        ));
    }

    #[test]
    fn unknown_keys_and_bad_types_are_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("skip_everything = true"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("skip_mode = \"half\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn configuration_survives_a_toml_round_trip() {
        let config = EngineConfig {
            skip_selector: Some("[data-static]".into()),
            skip_attributes: vec!["style".into()],
            diff_cap: Some(3),
            ..EngineConfig::default()
        };
        let text = config.to_toml_string();
        assert_eq!(EngineConfig::from_toml_str(&text).expect("reparse"), config);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = EngineConfig::from_path(Path::new("/nonexistent/domdelta.toml"))
            .expect_err("missing file");
        assert!(err.to_string().contains("domdelta.toml"), "{err}");
    }
}
