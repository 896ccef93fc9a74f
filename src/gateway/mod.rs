//! Output resources: `HTTPRoute` plus the option resources that carry features HTTPRoute cannot express.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

pub const ROUTE_OPTION_KIND: &str = "RouteOption";
pub const VIRTUAL_HOST_OPTION_KIND: &str = "VirtualHostOption";

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[kube(group = "gateway.networking.k8s.io", version = "v1beta1", kind = "HTTPRoute", namespaced, schema = "disabled")]
#[serde(rename_all = "camelCase")]
pub struct HTTPRouteSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostnames: Option<Vec<String>>,
    pub rules: Vec<HTTPRouteRule>,
    /// Host level filters, only populated from VirtualService or RouteTable options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<HTTPRouteFilter>>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HTTPRouteRule {
    pub matches: Vec<RouteMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_refs: Option<Vec<BackendRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<HTTPRouteFilter>>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<ValueMatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Vec<ValueMatch>>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathMatchType {
    PathPrefix,
    Exact,
    RegularExpression,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PathMatch {
    pub r#type: PathMatchType,
    pub value: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueMatchType {
    Exact,
    RegularExpression,
}

/// Header or query parameter match.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ValueMatch {
    pub name: String,
    pub r#type: ValueMatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackendRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum HTTPRouteFilter {
    #[serde(rename = "URLRewrite", rename_all = "camelCase")]
    UrlRewrite { url_rewrite: UrlRewrite },
    #[serde(rename_all = "camelCase")]
    ExtensionRef { extension_ref: LocalObjectReference },
}

impl HTTPRouteFilter {
    pub fn replace_prefix_match(prefix: &str) -> Self {
        HTTPRouteFilter::UrlRewrite {
            url_rewrite: UrlRewrite { path: PathModifier::ReplacePrefixMatch { replace_prefix_match: prefix.to_owned() } },
        }
    }

    pub fn extension_ref(group: &str, kind: &str, name: &str) -> Self {
        HTTPRouteFilter::ExtensionRef {
            extension_ref: LocalObjectReference { group: group.to_owned(), kind: kind.to_owned(), name: name.to_owned() },
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct UrlRewrite {
    pub path: PathModifier,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum PathModifier {
    #[serde(rename_all = "camelCase")]
    ReplacePrefixMatch { replace_prefix_match: String },
}

/// Reference resolved in the namespace of the referring resource.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LocalObjectReference {
    pub group: String,
    pub kind: String,
    pub name: String,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[kube(group = "gateway.solo.io", version = "v1", kind = "RouteOption", namespaced, schema = "disabled")]
pub struct RouteOptionSpec {
    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[kube(group = "gateway.solo.io", version = "v1", kind = "VirtualHostOption", namespaced, schema = "disabled")]
pub struct VirtualHostOptionSpec {
    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// Any document the converter emits.
#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum OutputResource {
    HttpRoute(HTTPRoute),
    RouteOption(RouteOption),
    VirtualHostOption(VirtualHostOption),
}

impl OutputResource {
    pub fn kind(&self) -> &'static str {
        match self {
            OutputResource::HttpRoute(_) => "HTTPRoute",
            OutputResource::RouteOption(_) => ROUTE_OPTION_KIND,
            OutputResource::VirtualHostOption(_) => VIRTUAL_HOST_OPTION_KIND,
        }
    }

    pub fn name(&self) -> Option<&str> {
        let metadata = match self {
            OutputResource::HttpRoute(route) => &route.metadata,
            OutputResource::RouteOption(option) => &option.metadata,
            OutputResource::VirtualHostOption(option) => &option.metadata,
        };
        metadata.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendRef, HTTPRoute, HTTPRouteFilter, HTTPRouteRule, HTTPRouteSpec, PathMatch, PathMatchType, RouteMatch};

    #[test]
    pub fn test_filters_serialization() {
        let filter = serde_yaml::to_value(HTTPRouteFilter::replace_prefix_match("/y")).unwrap();
        let expected: serde_yaml::Value = serde_yaml::from_str(
            r"
type: URLRewrite
urlRewrite:
  path:
    type: ReplacePrefixMatch
    replacePrefixMatch: /y
",
        )
        .unwrap();
        assert_eq!(filter, expected);

        let filter = serde_yaml::to_value(HTTPRouteFilter::extension_ref("gateway.solo.io", "RouteOption", "route-option-0123abcd")).unwrap();
        let expected: serde_yaml::Value = serde_yaml::from_str(
            r"
type: ExtensionRef
extensionRef:
  group: gateway.solo.io
  kind: RouteOption
  name: route-option-0123abcd
",
        )
        .unwrap();
        assert_eq!(filter, expected);
    }

    #[test]
    pub fn test_http_route_document() {
        let mut route = HTTPRoute::new(
            "vs",
            HTTPRouteSpec {
                rules: vec![HTTPRouteRule {
                    matches: vec![RouteMatch {
                        path: Some(PathMatch { r#type: PathMatchType::PathPrefix, value: "/x".to_owned() }),
                        ..Default::default()
                    }],
                    backend_refs: Some(vec![BackendRef {
                        name: "svc".to_owned(),
                        namespace: Some("ns".to_owned()),
                        port: Some(80),
                        ..Default::default()
                    }]),
                    filters: None,
                }],
                ..Default::default()
            },
        );
        route.metadata.namespace = Some("gloo".to_owned());

        let document = serde_yaml::to_value(&route).unwrap();
        let expected: serde_yaml::Value = serde_yaml::from_str(
            r"
apiVersion: gateway.networking.k8s.io/v1beta1
kind: HTTPRoute
metadata:
  name: vs
  namespace: gloo
spec:
  rules:
  - matches:
    - path:
        type: PathPrefix
        value: /x
    backendRefs:
    - name: svc
      namespace: ns
      port: 80
",
        )
        .unwrap();
        assert_eq!(document, expected);
    }
}
