mod configuration;
mod resource_key;

pub use configuration::Configuration;
pub use resource_key::{
    resolve_namespace, ResourceKey, DEFAULT_EXTENSION_GROUP_NAME, DEFAULT_GROUP_NAME, DEFAULT_NAMESPACE_NAME, HTTP_ROUTE_KIND_NAME,
    UPSTREAM_GROUP_NAME, UPSTREAM_KIND_NAME,
};
use thiserror::Error;

/// Failures raised while translating a single legacy substructure. They carry no record context;
/// the assembler attaches the owning record's key when turning them into a [`ConversionError`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TranslationError {
    #[error("destination has neither upstream nor kube populated")]
    MissingDestination,
    #[error("delegate action has neither selector nor ref populated")]
    MissingDelegateTarget,
    #[error("route action has no single destination ({0})")]
    UnsupportedRouteAction(String),
    #[error("options must be a mapping, got {0}")]
    UnsupportedOptionsShape(String),
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("{key}: {reason}")]
    Structural { key: ResourceKey, reason: String },
    #[error("{key}: unsupported shape: {reason}")]
    UnsupportedShape { key: ResourceKey, reason: String },
    #[error("{kind} is missing required field {field}")]
    MissingField { kind: String, field: String },
    #[error("malformed manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),
    #[error("unable to serialize output: {0}")]
    Serialization(String),
}

impl ConversionError {
    pub fn structural(key: &ResourceKey, reason: impl ToString) -> Self {
        ConversionError::Structural { key: key.clone(), reason: reason.to_string() }
    }

    pub fn from_translation(key: &ResourceKey, error: TranslationError) -> Self {
        match error {
            TranslationError::MissingDestination | TranslationError::MissingDelegateTarget => ConversionError::structural(key, error),
            TranslationError::UnsupportedRouteAction(_) | TranslationError::UnsupportedOptionsShape(_) => {
                ConversionError::UnsupportedShape { key: key.clone(), reason: error.to_string() }
            },
        }
    }

    pub fn resource_key(&self) -> Option<&ResourceKey> {
        match self {
            ConversionError::Structural { key, .. } | ConversionError::UnsupportedShape { key, .. } => Some(key),
            ConversionError::MissingField { .. } | ConversionError::Manifest(_) | ConversionError::Serialization(_) => None,
        }
    }
}
