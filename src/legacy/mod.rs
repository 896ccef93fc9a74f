//! Typed view over the legacy `gateway.solo.io/v1` routing resources.
//!
//! Only the fields the converter reads are modelled; everything else in the input is ignored by serde.
//! Optional union-shaped structures (path specifier, destination, delegate target) are exposed through
//! accessors returning sum types so every translation site matches them exhaustively.

use std::collections::BTreeMap;

use kube::CustomResource;
use serde::{Deserialize, Serialize};

use crate::common::TranslationError;

pub const VIRTUAL_SERVICE_KIND: &str = "VirtualService";
pub const ROUTE_TABLE_KIND: &str = "RouteTable";

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[kube(group = "gateway.solo.io", version = "v1", kind = "VirtualService", namespaced, schema = "disabled")]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceSpec {
    pub virtual_host: VirtualHost,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    pub routes: Vec<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[kube(group = "gateway.solo.io", version = "v1", kind = "RouteTable", namespaced, schema = "disabled")]
#[serde(rename_all = "camelCase")]
pub struct RouteTableSpec {
    pub routes: Vec<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub matchers: Vec<Matcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate_action: Option<DelegateAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_action: Option<RouteAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Matcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<HeaderMatcher>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_parameters: Option<Vec<QueryParameterMatcher>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSpecifier<'a> {
    Prefix(&'a str),
    Exact(&'a str),
    Regex(&'a str),
}

impl Matcher {
    /// Resolves the path specifier, preferring prefix, then exact, then regex. Empty values count as unset.
    pub fn path_specifier(&self) -> Option<PathSpecifier<'_>> {
        fn populated(value: Option<&String>) -> Option<&str> {
            value.map(String::as_str).filter(|value| !value.is_empty())
        }

        populated(self.prefix.as_ref())
            .map(PathSpecifier::Prefix)
            .or_else(|| populated(self.exact.as_ref()).map(PathSpecifier::Exact))
            .or_else(|| populated(self.regex.as_ref()).map(PathSpecifier::Regex))
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMatcher {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub invert_match: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameterMatcher {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub regex: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DelegateAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<RouteTableSelector>,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<ObjectRef>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteTableSelector {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub namespaces: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DelegateTarget<'a> {
    Selector(&'a RouteTableSelector),
    Ref(&'a ObjectRef),
    Unspecified,
}

impl DelegateAction {
    /// Selector is consulted before a direct ref.
    pub fn target(&self) -> DelegateTarget<'_> {
        match (&self.selector, &self.reference) {
            (Some(selector), _) => DelegateTarget::Selector(selector),
            (None, Some(reference)) => DelegateTarget::Ref(reference),
            (None, None) => DelegateTarget::Unspecified,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single: Option<DestinationSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_group: Option<serde_json::Value>,
}

impl RouteAction {
    pub fn single_destination(&self) -> Result<Destination<'_>, TranslationError> {
        match (&self.single, &self.multi, &self.upstream_group) {
            (Some(single), _, _) => single.destination(),
            (None, Some(_), _) => Err(TranslationError::UnsupportedRouteAction("multi".to_owned())),
            (None, None, Some(_)) => Err(TranslationError::UnsupportedRouteAction("upstreamGroup".to_owned())),
            (None, None, None) => Err(TranslationError::UnsupportedRouteAction("empty".to_owned())),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DestinationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube: Option<KubeServiceDestination>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KubeServiceDestination {
    #[serde(rename = "ref")]
    pub reference: ObjectRef,
    pub port: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Destination<'a> {
    Upstream(&'a ObjectRef),
    Kube(&'a KubeServiceDestination),
}

impl DestinationSpec {
    /// Upstream wins over kube when both are present.
    pub fn destination(&self) -> Result<Destination<'_>, TranslationError> {
        match (&self.upstream, &self.kube) {
            (Some(upstream), _) => Ok(Destination::Upstream(upstream)),
            (None, Some(kube)) => Ok(Destination::Kube(kube)),
            (None, None) => Err(TranslationError::MissingDestination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DelegateTarget, Destination, Matcher, PathSpecifier, RouteAction, RouteTable, VirtualService};
    use crate::common::TranslationError;

    #[test]
    pub fn test_path_priority() {
        let matcher = Matcher { prefix: Some("/p".to_owned()), exact: Some("/e".to_owned()), regex: Some("/r.*".to_owned()), ..Default::default() };
        assert_eq!(matcher.path_specifier(), Some(PathSpecifier::Prefix("/p")));

        let matcher = Matcher { prefix: Some(String::new()), exact: Some("/e".to_owned()), ..Default::default() };
        assert_eq!(matcher.path_specifier(), Some(PathSpecifier::Exact("/e")));

        let matcher = Matcher { regex: Some("/r.*".to_owned()), ..Default::default() };
        assert_eq!(matcher.path_specifier(), Some(PathSpecifier::Regex("/r.*")));

        assert_eq!(Matcher::default().path_specifier(), None);
    }

    #[test]
    pub fn test_virtual_service() {
        let m = r"
apiVersion: gateway.solo.io/v1
kind: VirtualService
metadata:
  name: default
  namespace: gloo-system
spec:
  virtualHost:
    domains:
    - 'a.com'
    routes:
    - matchers:
      - prefix: /x
        headers:
        - name: version
          value: v1
          regex: true
        methods: [GET, POST]
      routeAction:
        single:
          kube:
            ref:
              name: svc
              namespace: ns
            port: 80
      options:
        prefixRewrite: /y
";
        let vs: VirtualService = serde_yaml::from_str(m).unwrap();
        assert_eq!(vs.metadata.name.as_deref(), Some("default"));
        assert_eq!(vs.spec.virtual_host.domains, Some(vec!["a.com".to_owned()]));
        let route = &vs.spec.virtual_host.routes[0];
        let headers = route.matchers[0].headers.as_ref().unwrap();
        assert!(headers[0].regex);
        let Ok(Destination::Kube(kube)) = route.route_action.as_ref().unwrap().single_destination() else {
            panic!("expected kube destination");
        };
        assert_eq!(kube.port, 80);
        assert_eq!(kube.reference.name, "svc");
    }

    #[test]
    pub fn test_route_table_delegate() {
        let m = r"
apiVersion: gateway.solo.io/v1
kind: RouteTable
metadata:
  name: parent
spec:
  routes:
  - matchers:
    - prefix: /a
    delegateAction:
      selector:
        labels:
          team: a
        namespaces: [apps]
  - matchers:
    - prefix: /b
    delegateAction:
      ref:
        name: child
";
        let rt: RouteTable = serde_yaml::from_str(m).unwrap();
        let first = rt.spec.routes[0].delegate_action.as_ref().unwrap();
        assert!(matches!(first.target(), DelegateTarget::Selector(selector) if selector.namespaces == vec!["apps".to_owned()]));
        let second = rt.spec.routes[1].delegate_action.as_ref().unwrap();
        assert!(matches!(second.target(), DelegateTarget::Ref(reference) if reference.name == "child" && reference.namespace.is_none()));
    }

    #[test]
    pub fn test_unsupported_route_actions() {
        let action: RouteAction = serde_yaml::from_str("multi:\n  destinations: []\n").unwrap();
        assert_eq!(action.single_destination(), Err(TranslationError::UnsupportedRouteAction("multi".to_owned())));

        let action: RouteAction = serde_yaml::from_str("single: {}\n").unwrap();
        assert_eq!(action.single_destination(), Err(TranslationError::MissingDestination));
    }
}
