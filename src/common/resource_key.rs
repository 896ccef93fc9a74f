use std::fmt::Display;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::ConversionError;

pub const DEFAULT_GROUP_NAME: &str = "gateway.networking.k8s.io";
pub const DEFAULT_EXTENSION_GROUP_NAME: &str = "gateway.solo.io";
pub const UPSTREAM_GROUP_NAME: &str = "gloo.solo.io";

pub const DEFAULT_NAMESPACE_NAME: &str = "default";
pub const HTTP_ROUTE_KIND_NAME: &str = "HTTPRoute";
pub const UPSTREAM_KIND_NAME: &str = "Upstream";

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceKey {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

/// Namespace a record lives in; absent and empty namespaces both mean `default_namespace`.
pub fn resolve_namespace<'a>(namespace: Option<&'a str>, default_namespace: &'a str) -> &'a str {
    namespace.filter(|namespace| !namespace.is_empty()).unwrap_or(default_namespace)
}

impl ResourceKey {
    pub fn namespaced(kind: &str, name: &str, namespace: &str) -> Self {
        Self { kind: kind.to_owned(), name: name.to_owned(), namespace: namespace.to_owned() }
    }

    /// Builds the key of a legacy record, falling back to `default_namespace` when the record has none.
    pub fn from_metadata(kind: &str, metadata: &ObjectMeta, default_namespace: &str) -> Result<Self, ConversionError> {
        let name = metadata
            .name
            .as_ref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ConversionError::MissingField { kind: kind.to_owned(), field: "metadata.name".to_owned() })?;
        Ok(Self::namespaced(kind, name, resolve_namespace(metadata.namespace.as_deref(), default_namespace)))
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, create_id(&self.name, &self.namespace))
    }
}

fn create_id(name: &str, namespace: &str) -> String {
    namespace.to_owned() + "/" + name
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::{resolve_namespace, ResourceKey, DEFAULT_NAMESPACE_NAME};
    use crate::common::ConversionError;

    #[test]
    pub fn test_key_from_metadata() {
        let metadata = ObjectMeta { name: Some("vs".to_owned()), namespace: Some("gloo".to_owned()), ..Default::default() };
        let key = ResourceKey::from_metadata("VirtualService", &metadata, DEFAULT_NAMESPACE_NAME).unwrap();
        assert_eq!(key, ResourceKey::namespaced("VirtualService", "vs", "gloo"));
        assert_eq!(key.to_string(), "VirtualService gloo/vs");
    }

    #[test]
    pub fn test_key_default_namespace() {
        let metadata = ObjectMeta { name: Some("rt".to_owned()), ..Default::default() };
        let key = ResourceKey::from_metadata("RouteTable", &metadata, "fallback").unwrap();
        assert_eq!(key.namespace, "fallback");

        let metadata = ObjectMeta { name: Some("rt".to_owned()), namespace: Some(String::new()), ..Default::default() };
        let key = ResourceKey::from_metadata("RouteTable", &metadata, "fallback").unwrap();
        assert_eq!(key.namespace, "fallback");
        assert_eq!(resolve_namespace(Some("gloo"), "fallback"), "gloo");
    }

    #[test]
    pub fn test_key_missing_name() {
        let metadata = ObjectMeta { namespace: Some("gloo".to_owned()), ..Default::default() };
        let error = ResourceKey::from_metadata("RouteTable", &metadata, DEFAULT_NAMESPACE_NAME).unwrap_err();
        assert!(matches!(error, ConversionError::MissingField { ref field, .. } if field == "metadata.name"));
    }
}
