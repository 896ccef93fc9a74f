use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::{debug, warn};

use super::{
    matchers::{translate_delegate, translate_destination, translate_matcher},
    options::split_options,
    registry::{SideResourceKind, SideResourceRegistry},
};
use crate::{
    common::{Configuration, ConversionError, ResourceKey, TranslationError},
    gateway::{BackendRef, HTTPRoute, HTTPRouteFilter, HTTPRouteRule, HTTPRouteSpec},
    legacy::{Route, RouteTable, VirtualService, ROUTE_TABLE_KIND, VIRTUAL_SERVICE_KIND},
};

/// A legacy resource that carries routes and becomes one HTTPRoute.
#[derive(Clone, Copy, Debug)]
pub enum LegacyRouteSource<'a> {
    VirtualService(&'a VirtualService),
    RouteTable(&'a RouteTable),
}

impl<'a> LegacyRouteSource<'a> {
    pub fn kind(self) -> &'static str {
        match self {
            LegacyRouteSource::VirtualService(_) => VIRTUAL_SERVICE_KIND,
            LegacyRouteSource::RouteTable(_) => ROUTE_TABLE_KIND,
        }
    }

    pub fn metadata(self) -> &'a ObjectMeta {
        match self {
            LegacyRouteSource::VirtualService(virtual_service) => &virtual_service.metadata,
            LegacyRouteSource::RouteTable(route_table) => &route_table.metadata,
        }
    }

    /// Only virtual services carry domains; route tables never produce hostnames.
    pub fn domains(self) -> Option<&'a Vec<String>> {
        match self {
            LegacyRouteSource::VirtualService(virtual_service) => virtual_service.spec.virtual_host.domains.as_ref(),
            LegacyRouteSource::RouteTable(_) => None,
        }
    }

    pub fn routes(self) -> &'a [Route] {
        match self {
            LegacyRouteSource::VirtualService(virtual_service) => &virtual_service.spec.virtual_host.routes,
            LegacyRouteSource::RouteTable(route_table) => &route_table.spec.routes,
        }
    }

    pub fn options(self) -> Option<&'a serde_json::Value> {
        match self {
            LegacyRouteSource::VirtualService(virtual_service) => virtual_service.spec.virtual_host.options.as_ref(),
            LegacyRouteSource::RouteTable(route_table) => route_table.spec.options.as_ref(),
        }
    }
}

/// Builds HTTPRoute rules and resources, registering option resources as residual options are found.
pub struct RouteAssembler<'a> {
    configuration: &'a Configuration,
    registry: &'a mut SideResourceRegistry,
}

impl<'a> RouteAssembler<'a> {
    pub fn new(configuration: &'a Configuration, registry: &'a mut SideResourceRegistry) -> Self {
        Self { configuration, registry }
    }

    pub fn assemble_host_resource(&mut self, source: LegacyRouteSource<'_>) -> Result<HTTPRoute, ConversionError> {
        let key = ResourceKey::from_metadata(source.kind(), source.metadata(), &self.configuration.default_namespace)?;
        let rules = source.routes().iter().map(|route| self.assemble_rule(route, &key)).collect::<Result<Vec<_>, _>>()?;
        let filters = match source.options() {
            Some(options) => self.option_filters(options, SideResourceKind::VirtualHostOption, &key)?,
            None => None,
        };

        let spec = HTTPRouteSpec { hostnames: source.domains().cloned(), rules, filters };
        let mut http_route = HTTPRoute::new(&key.name, spec);
        http_route.metadata.namespace = Some(key.namespace.clone());
        debug!("Converted {key} into HTTPRoute with {} rules", http_route.spec.rules.len());
        Ok(http_route)
    }

    pub fn assemble_rule(&mut self, route: &Route, key: &ResourceKey) -> Result<HTTPRouteRule, ConversionError> {
        for header in route.matchers.iter().filter_map(|matcher| matcher.headers.as_ref()).flatten().filter(|header| header.invert_match) {
            warn!("{key}: invertMatch on header {} has no HTTPRoute equivalent and is dropped", header.name);
        }

        let matches = route.matchers.iter().map(translate_matcher).collect();
        let backend_refs = self.backend_refs(route, key)?;
        let filters = match route.options.as_ref() {
            Some(options) => self.option_filters(options, SideResourceKind::RouteOption, key)?,
            None => None,
        };
        Ok(HTTPRouteRule { matches, backend_refs, filters })
    }

    fn backend_refs(&self, route: &Route, key: &ResourceKey) -> Result<Option<Vec<BackendRef>>, ConversionError> {
        if let Some(delegate) = route.delegate_action.as_ref() {
            if route.route_action.is_some() {
                warn!("{key}: route has both delegateAction and routeAction, using the delegate");
            }
            let backend = translate_delegate(delegate, &key.namespace).map_err(|e| ConversionError::from_translation(key, e))?;
            return Ok(Some(vec![backend]));
        }

        let Some(route_action) = route.route_action.as_ref() else {
            return Ok(None);
        };

        match route_action.single_destination() {
            Ok(destination) => Ok(Some(vec![translate_destination(&destination)])),
            Err(error @ TranslationError::UnsupportedRouteAction(_)) if !self.configuration.strict => {
                warn!("{key}: {error}, rule will have no backendRefs");
                Ok(None)
            },
            Err(error) => Err(ConversionError::from_translation(key, error)),
        }
    }

    /// Native filters for `options`, followed by an extension reference to the option resource holding the residual.
    fn option_filters(
        &mut self,
        options: &serde_json::Value,
        kind: SideResourceKind,
        key: &ResourceKey,
    ) -> Result<Option<Vec<HTTPRouteFilter>>, ConversionError> {
        let (mut filters, residual) = split_options(options).map_err(|e| ConversionError::from_translation(key, e))?;
        if !residual.is_empty() {
            let (name, _) = self.registry.get_or_create(kind, &residual, &key.namespace);
            filters.push(HTTPRouteFilter::extension_ref(&self.configuration.extension_group, kind.kind(), &name));
        }
        Ok((!filters.is_empty()).then_some(filters))
    }
}
