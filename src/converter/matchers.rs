use itertools::Itertools;

use crate::{
    common::{TranslationError, DEFAULT_GROUP_NAME, HTTP_ROUTE_KIND_NAME, UPSTREAM_GROUP_NAME, UPSTREAM_KIND_NAME},
    gateway::{BackendRef, PathMatch, PathMatchType, RouteMatch, ValueMatch, ValueMatchType},
    legacy::{DelegateAction, DelegateTarget, Destination, HeaderMatcher, Matcher, PathSpecifier, QueryParameterMatcher},
};

const DELEGATE_NAME_PREFIX: &str = "delegate";

impl From<PathSpecifier<'_>> for PathMatch {
    fn from(path: PathSpecifier<'_>) -> Self {
        let (r#type, value) = match path {
            PathSpecifier::Prefix(value) => (PathMatchType::PathPrefix, value),
            PathSpecifier::Exact(value) => (PathMatchType::Exact, value),
            PathSpecifier::Regex(value) => (PathMatchType::RegularExpression, value),
        };
        PathMatch { r#type, value: value.to_owned() }
    }
}

fn value_match_type(regex: bool) -> ValueMatchType {
    if regex {
        ValueMatchType::RegularExpression
    } else {
        ValueMatchType::Exact
    }
}

impl From<&HeaderMatcher> for ValueMatch {
    fn from(header: &HeaderMatcher) -> Self {
        ValueMatch { name: header.name.clone(), r#type: value_match_type(header.regex), value: header.value.clone() }
    }
}

impl From<&QueryParameterMatcher> for ValueMatch {
    fn from(parameter: &QueryParameterMatcher) -> Self {
        ValueMatch { name: parameter.name.clone(), r#type: value_match_type(parameter.regex), value: parameter.value.clone() }
    }
}

pub fn translate_matcher(matcher: &Matcher) -> RouteMatch {
    RouteMatch {
        path: matcher.path_specifier().map(PathMatch::from),
        headers: matcher.headers.as_ref().map(|headers| headers.iter().map(ValueMatch::from).collect()),
        method: matcher.methods.clone(),
        query_params: matcher.query_parameters.as_ref().map(|parameters| parameters.iter().map(ValueMatch::from).collect()),
    }
}

pub fn translate_destination(destination: &Destination<'_>) -> BackendRef {
    match destination {
        Destination::Upstream(upstream) => BackendRef {
            group: Some(UPSTREAM_GROUP_NAME.to_owned()),
            kind: Some(UPSTREAM_KIND_NAME.to_owned()),
            name: upstream.name.clone(),
            namespace: upstream.namespace.clone(),
            port: None,
        },
        Destination::Kube(kube) => BackendRef {
            name: kube.reference.name.clone(),
            namespace: kube.reference.namespace.clone(),
            port: Some(kube.port),
            ..Default::default()
        },
    }
}

/// Points the rule at the child HTTPRoute the delegate action targets.
///
/// A selector has no single target, so its name is synthesized as `delegate-<label values>` with the
/// values joined in label-key order, and its namespace is the first candidate namespace.
pub fn translate_delegate(delegate: &DelegateAction, default_namespace: &str) -> Result<BackendRef, TranslationError> {
    let (name, namespace) = match delegate.target() {
        DelegateTarget::Selector(selector) => {
            let name = format!("{DELEGATE_NAME_PREFIX}-{}", selector.labels.values().join("-"));
            let namespace = selector.namespaces.first().filter(|namespace| !namespace.is_empty()).cloned();
            (name, namespace)
        },
        DelegateTarget::Ref(reference) => (reference.name.clone(), reference.namespace.clone().filter(|namespace| !namespace.is_empty())),
        DelegateTarget::Unspecified => return Err(TranslationError::MissingDelegateTarget),
    };

    Ok(BackendRef {
        group: Some(DEFAULT_GROUP_NAME.to_owned()),
        kind: Some(HTTP_ROUTE_KIND_NAME.to_owned()),
        name,
        namespace: Some(namespace.unwrap_or_else(|| default_namespace.to_owned())),
        port: None,
    })
}
