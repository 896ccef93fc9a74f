//! Translation of legacy VirtualService and RouteTable records into HTTPRoutes and option resources.

mod assembler;
mod matchers;
mod options;
mod registry;

pub use assembler::{LegacyRouteSource, RouteAssembler};
pub use matchers::{translate_delegate, translate_destination, translate_matcher};
pub use options::split_options;
pub use registry::{canonical_json, fingerprint, SideResourceKind, SideResourceRegistry};
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::{debug, info};

use crate::{
    common::{resolve_namespace, Configuration, ConversionError, ResourceKey},
    gateway::OutputResource,
    legacy::{RouteTable, VirtualService, ROUTE_TABLE_KIND, VIRTUAL_SERVICE_KIND},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub virtual_services: usize,
    pub route_tables: usize,
    pub skipped: usize,
    pub route_options: usize,
    pub virtual_host_options: usize,
}

#[derive(Debug)]
pub struct Conversion {
    /// Converted HTTPRoutes in input order, followed by option resources in creation order.
    pub resources: Vec<OutputResource>,
    pub report: ConversionReport,
}

const LIST_KIND: &str = "List";
const LIST_API_VERSION: &str = "v1";

fn record_kind(record: &Value) -> Option<&str> {
    record.get("kind").and_then(Value::as_str)
}

/// A `v1` List is replaced by its items, one level deep and in item order.
fn flatten_list(mut record: Value) -> Vec<Value> {
    let is_list = record_kind(&record) == Some(LIST_KIND) && record.get("apiVersion").and_then(Value::as_str) == Some(LIST_API_VERSION);
    if is_list {
        if let Some(Value::Sequence(items)) = record.as_mapping_mut().and_then(|mapping| mapping.remove("items")) {
            return items;
        }
    }
    vec![record]
}

/// Key of a raw record, read before typed deserialization so that schema errors can name the record.
fn record_key(kind: &str, record: &Value, configuration: &Configuration) -> Result<ResourceKey, ConversionError> {
    let metadata = record.get("metadata");
    let field = |name: &str| metadata.and_then(|metadata| metadata.get(name)).and_then(Value::as_str);
    let name = field("name")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ConversionError::MissingField { kind: kind.to_owned(), field: "metadata.name".to_owned() })?;
    Ok(ResourceKey::namespaced(kind, name, resolve_namespace(field("namespace"), &configuration.default_namespace)))
}

fn typed_record<T: DeserializeOwned>(kind: &str, record: Value, configuration: &Configuration) -> Result<T, ConversionError> {
    let key = record_key(kind, &record, configuration)?;
    serde_yaml::from_value(record).map_err(|e| ConversionError::structural(&key, e))
}

/// Walks the records in order, converting every VirtualService and RouteTable and skipping other kinds.
/// Records wrapped in a `v1` List are converted in place of the list.
///
/// The side resource registry lives for this call only, so concurrent conversions never share names.
pub fn convert_records(records: Vec<Value>, configuration: &Configuration) -> Result<Conversion, ConversionError> {
    let mut registry = SideResourceRegistry::new();
    let mut report = ConversionReport::default();
    let mut resources = vec![];

    for record in records.into_iter().flat_map(flatten_list) {
        let kind = record_kind(&record).map(str::to_owned);
        let http_route = match kind.as_deref() {
            Some(VIRTUAL_SERVICE_KIND) => {
                let virtual_service: VirtualService = typed_record(VIRTUAL_SERVICE_KIND, record, configuration)?;
                report.virtual_services += 1;
                RouteAssembler::new(configuration, &mut registry).assemble_host_resource(LegacyRouteSource::VirtualService(&virtual_service))?
            },
            Some(ROUTE_TABLE_KIND) => {
                let route_table: RouteTable = typed_record(ROUTE_TABLE_KIND, record, configuration)?;
                report.route_tables += 1;
                RouteAssembler::new(configuration, &mut registry).assemble_host_resource(LegacyRouteSource::RouteTable(&route_table))?
            },
            kind => {
                debug!("Skipping record of kind {}", kind.unwrap_or("<none>"));
                report.skipped += 1;
                continue;
            },
        };
        resources.push(OutputResource::HttpRoute(http_route));
    }

    report.route_options = registry.count(SideResourceKind::RouteOption);
    report.virtual_host_options = registry.count(SideResourceKind::VirtualHostOption);
    if report.skipped > 0 {
        debug!("Skipped {} records that are neither VirtualService nor RouteTable", report.skipped);
    }
    info!(
        "Converted {} virtual services and {} route tables, created {} route options and {} virtual host options",
        report.virtual_services, report.route_tables, report.route_options, report.virtual_host_options
    );

    resources.extend(registry.into_resources());
    Ok(Conversion { resources, report })
}
