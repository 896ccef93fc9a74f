use std::collections::{HashMap, HashSet};

use md5::{Digest, Md5};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::gateway::{OutputResource, RouteOption, RouteOptionSpec, VirtualHostOption, VirtualHostOptionSpec, ROUTE_OPTION_KIND, VIRTUAL_HOST_OPTION_KIND};

const NAME_HASH_LENGTH: usize = 8;
const NAME_HASH_STEP: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SideResourceKind {
    RouteOption,
    VirtualHostOption,
}

impl SideResourceKind {
    pub fn kind(self) -> &'static str {
        match self {
            SideResourceKind::RouteOption => ROUTE_OPTION_KIND,
            SideResourceKind::VirtualHostOption => VIRTUAL_HOST_OPTION_KIND,
        }
    }

    fn name_prefix(self) -> &'static str {
        match self {
            SideResourceKind::RouteOption => "route-option",
            SideResourceKind::VirtualHostOption => "virtualhost-option",
        }
    }

    fn create_resource(self, name: &str, namespace: &str, options: &Map<String, Value>) -> OutputResource {
        match self {
            SideResourceKind::RouteOption => {
                let mut resource = RouteOption::new(name, RouteOptionSpec { options: options.clone() });
                resource.metadata.namespace = Some(namespace.to_owned());
                OutputResource::RouteOption(resource)
            },
            SideResourceKind::VirtualHostOption => {
                let mut resource = VirtualHostOption::new(name, VirtualHostOptionSpec { options: options.clone() });
                resource.metadata.namespace = Some(namespace.to_owned());
                OutputResource::VirtualHostOption(resource)
            },
        }
    }
}

/// Rebuilds `value` with every mapping's keys in ascending order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.cmp(right));
            Value::Object(entries.into_iter().map(|(key, value)| (key.clone(), canonicalize(value))).collect())
        },
        Value::Array(values) => Value::Array(values.iter().map(canonicalize).collect()),
        _ => value.clone(),
    }
}

pub fn canonical_json(options: &Map<String, Value>) -> String {
    canonicalize(&Value::Object(options.clone())).to_string()
}

/// MD5 hex digest of the canonical options followed by the namespace.
pub fn fingerprint(options: &Map<String, Value>, namespace: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(canonical_json(options).as_bytes());
    hasher.update(namespace.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Default)]
struct KindRegistry {
    names_by_fingerprint: HashMap<String, String>,
    names: HashSet<String>,
}

impl KindRegistry {
    /// Shortest `<prefix>-<hex>` name not already held by another fingerprint.
    fn free_name(&self, prefix: &str, fingerprint: &str) -> String {
        let mut length = NAME_HASH_LENGTH;
        loop {
            let name = format!("{prefix}-{}", &fingerprint[..length.min(fingerprint.len())]);
            if !self.names.contains(&name) || length >= fingerprint.len() {
                return name;
            }
            warn!("Side resource name {name} already taken by different options, lengthening");
            length += NAME_HASH_STEP;
        }
    }
}

/// Deduplicates option resources for a single conversion run.
///
/// Value-equal options in the same namespace always resolve to the same resource, which is minted
/// once and kept in creation order until [`SideResourceRegistry::into_resources`] hands them out.
#[derive(Debug, Default)]
pub struct SideResourceRegistry {
    registries: HashMap<SideResourceKind, KindRegistry>,
    resources: Vec<OutputResource>,
}

impl SideResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resource name for these options and whether it was created by this call.
    pub fn get_or_create(&mut self, kind: SideResourceKind, options: &Map<String, Value>, namespace: &str) -> (String, bool) {
        let fingerprint = fingerprint(options, namespace);
        let registry = self.registries.entry(kind).or_default();
        if let Some(name) = registry.names_by_fingerprint.get(&fingerprint) {
            debug!("Reusing {} {namespace}/{name}", kind.kind());
            return (name.clone(), false);
        }

        let name = registry.free_name(kind.name_prefix(), &fingerprint);
        registry.names.insert(name.clone());
        registry.names_by_fingerprint.insert(fingerprint, name.clone());
        self.resources.push(kind.create_resource(&name, namespace, options));
        debug!("Created {} {namespace}/{name}", kind.kind());
        (name, true)
    }

    pub fn resources(&self) -> &[OutputResource] {
        &self.resources
    }

    pub fn count(&self, kind: SideResourceKind) -> usize {
        self.registries.get(&kind).map_or(0, |registry| registry.names_by_fingerprint.len())
    }

    pub fn into_resources(self) -> Vec<OutputResource> {
        self.resources
    }
}
