use serde_json::{Map, Value};
use tracing::warn;

use crate::{common::TranslationError, gateway::HTTPRouteFilter};

type FilterBuilder = fn(&Value) -> Option<HTTPRouteFilter>;

/// Options with a native HTTPRoute representation, in the order their filters are emitted.
/// Keys listed here are consumed even when their builder yields no filter.
const CONVERTIBLE_OPTIONS: &[(&str, FilterBuilder)] = &[("prefixRewrite", prefix_rewrite)];

fn prefix_rewrite(value: &Value) -> Option<HTTPRouteFilter> {
    match value {
        Value::String(prefix) if !prefix.is_empty() => Some(HTTPRouteFilter::replace_prefix_match(prefix)),
        Value::String(_) | Value::Null => None,
        _ => {
            warn!("Ignoring prefixRewrite {value} which is not a string");
            None
        },
    }
}

fn is_convertible(key: &str) -> bool {
    CONVERTIBLE_OPTIONS.iter().any(|(convertible, _)| *convertible == key)
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Splits a legacy options bag into native filters and the residual options that have no native form.
/// Residual values are cloned verbatim.
pub fn split_options(options: &Value) -> Result<(Vec<HTTPRouteFilter>, Map<String, Value>), TranslationError> {
    let Value::Object(options) = options else {
        return Err(TranslationError::UnsupportedOptionsShape(shape_name(options).to_owned()));
    };

    let filters = CONVERTIBLE_OPTIONS.iter().filter_map(|(key, builder)| options.get(*key).and_then(|value| builder(value))).collect();
    let residual = options.iter().filter(|(key, _)| !is_convertible(key)).map(|(key, value)| (key.clone(), value.clone())).collect();
    Ok((filters, residual))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::split_options;
    use crate::{common::TranslationError, gateway::HTTPRouteFilter};

    #[test]
    pub fn test_prefix_rewrite_only() {
        let (filters, residual) = split_options(&json!({"prefixRewrite": "/y"})).unwrap();
        assert_eq!(filters, vec![HTTPRouteFilter::replace_prefix_match("/y")]);
        assert!(residual.is_empty());
    }

    #[test]
    pub fn test_residual_is_preserved_verbatim() {
        let options = json!({
            "prefixRewrite": "/y",
            "timeout": "5s",
            "retries": {"retryOn": "5xx", "numRetries": 3, "perTryTimeout": null},
        });
        let (filters, residual) = split_options(&options).unwrap();
        assert_eq!(filters.len(), 1);
        let mut expected = Map::new();
        expected.insert("timeout".to_owned(), json!("5s"));
        expected.insert("retries".to_owned(), json!({"retryOn": "5xx", "numRetries": 3, "perTryTimeout": null}));
        assert_eq!(residual, expected);
        assert_eq!(options["prefixRewrite"], json!("/y"));
    }

    #[test]
    pub fn test_empty_prefix_rewrite_is_consumed() {
        let (filters, residual) = split_options(&json!({"prefixRewrite": ""})).unwrap();
        assert!(filters.is_empty());
        assert!(residual.is_empty());
    }

    #[test]
    pub fn test_options_must_be_a_mapping() {
        assert_eq!(split_options(&json!(["a"])), Err(TranslationError::UnsupportedOptionsShape("sequence".to_owned())));
    }
}
