use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use super::{DEFAULT_EXTENSION_GROUP_NAME, DEFAULT_NAMESPACE_NAME};
use crate::Result;

fn default_namespace_name() -> String {
    DEFAULT_NAMESPACE_NAME.to_owned()
}

fn default_extension_group_name() -> String {
    DEFAULT_EXTENSION_GROUP_NAME.to_owned()
}

#[derive(Clone, Debug, TypedBuilder, Deserialize)]
pub struct Configuration {
    /// Namespace assumed for records that carry no `metadata.namespace`.
    #[builder(default = default_namespace_name())]
    #[serde(default = "default_namespace_name")]
    pub default_namespace: String,
    /// API group written on `ExtensionRef` filters pointing at option resources.
    #[builder(default = default_extension_group_name())]
    #[serde(default = "default_extension_group_name")]
    pub extension_group: String,
    /// Fail instead of warn when a route action has no translatable destination.
    #[builder(default)]
    #[serde(default)]
    pub strict: bool,
    #[builder(default)]
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::builder().build()
    }
}

#[derive(Error, Debug)]
enum ConfigurationError {
    #[error("default namespace must be not empty")]
    DefaultNamespace,
    #[error("extension group must be not empty")]
    ExtensionGroup,
}

impl Configuration {
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Configuration::default());
        }
        serde_yaml::from_str(content).map_err(std::convert::Into::into)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_namespace.is_empty() {
            return Err(ConfigurationError::DefaultNamespace.into());
        }
        if self.extension_group.is_empty() {
            return Err(ConfigurationError::ExtensionGroup.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Configuration;

    #[test]
    pub fn test_defaults() {
        let configuration = Configuration::from_yaml("").unwrap();
        assert_eq!(configuration.default_namespace, "default");
        assert_eq!(configuration.extension_group, "gateway.solo.io");
        assert!(!configuration.strict);
        assert!(configuration.log_file.is_none());
        assert!(configuration.validate().is_ok());
    }

    #[test]
    pub fn test_partial_file() {
        let m = r"
default_namespace: gloo-system
strict: true
";
        let configuration = Configuration::from_yaml(m).unwrap();
        assert_eq!(configuration.default_namespace, "gloo-system");
        assert_eq!(configuration.extension_group, "gateway.solo.io");
        assert!(configuration.strict);
    }

    #[test]
    pub fn test_builder_defaults_match_file_defaults() {
        let built = Configuration::builder().strict(true).build();
        assert_eq!(built.default_namespace, "default");
        assert_eq!(built.extension_group, "gateway.solo.io");
        assert!(built.strict);
        let parsed = Configuration::from_yaml("strict: true\n").unwrap();
        assert_eq!(parsed.default_namespace, built.default_namespace);
        assert_eq!(parsed.extension_group, built.extension_group);
    }

    #[test]
    pub fn test_validate_rejects_empty_values() {
        let configuration = Configuration::builder().default_namespace(String::new()).build();
        assert!(configuration.validate().is_err());
        let configuration = Configuration::builder().extension_group(String::new()).build();
        assert!(configuration.validate().is_err());
    }
}
