//! Reading and writing multi-document YAML manifest streams.

use serde::Deserialize;
use serde_yaml::Value;

use crate::{common::ConversionError, gateway::OutputResource};

pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Parses every document of the stream into raw records, dropping empty documents.
pub fn parse_manifest_stream(input: &str) -> Result<Vec<Value>, ConversionError> {
    let mut records = vec![];
    for document in serde_yaml::Deserializer::from_str(input) {
        let document = Value::deserialize(document)?;
        if !document.is_null() {
            records.push(document);
        }
    }
    Ok(records)
}

pub fn serialize_record(record: &OutputResource) -> Result<String, ConversionError> {
    serde_yaml::to_string(record).map_err(|e| ConversionError::Serialization(format!("{} {}: {e}", record.kind(), record.name().unwrap_or_default())))
}

pub fn serialize_records(records: &[OutputResource]) -> Result<String, ConversionError> {
    Ok(records.iter().map(serialize_record).collect::<Result<Vec<_>, _>>()?.join(DOCUMENT_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::{parse_manifest_stream, serialize_records};
    use crate::{
        common::ConversionError,
        gateway::{HTTPRoute, HTTPRouteSpec, OutputResource},
    };

    #[test]
    pub fn test_parse_stream_keeps_lists_whole() {
        let m = r"
---
apiVersion: v1
kind: List
items:
- kind: VirtualService
  metadata:
    name: one
- kind: RouteTable
  metadata:
    name: two
---
kind: Service
metadata:
  name: three
---
";
        let records = parse_manifest_stream(m).unwrap();
        let kinds: Vec<_> = records.iter().map(|record| record["kind"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["List", "Service"]);
        assert_eq!(records[0]["items"].as_sequence().unwrap().len(), 2);
    }

    #[test]
    pub fn test_malformed_stream() {
        let error = parse_manifest_stream("kind: [unterminated\n").unwrap_err();
        assert!(matches!(error, ConversionError::Manifest(_)));
    }

    #[test]
    pub fn test_serialize_joins_documents() {
        let first = OutputResource::HttpRoute(HTTPRoute::new("a", HTTPRouteSpec::default()));
        let second = OutputResource::HttpRoute(HTTPRoute::new("b", HTTPRouteSpec::default()));
        let output = serialize_records(&[first, second]).unwrap();
        let documents: Vec<_> = output.split("---\n").collect();
        assert_eq!(documents.len(), 2);
        assert!(documents[0].starts_with("apiVersion: gateway.networking.k8s.io/v1beta1\nkind: HTTPRoute\n"));
        assert!(documents[1].contains("name: b"));
        assert_eq!(serialize_records(&[]).unwrap(), "");
    }
}
