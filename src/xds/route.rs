//! Route configuration translation
//!
//! [`RouteTranslator`] turns a domain [`Route`] into an Envoy
//! `RouteConfiguration`. Clusters referenced by the route's destinations are
//! produced by the [`ClusterRegistry`] and collected in a caller-owned
//! [`ResourceMap`].
//!
//! A route either translates completely or not at all: its clusters are staged
//! in a scratch map and only merged into the caller's map once every virtual
//! host and rule has been converted.

use crate::domain::{Route, RouteRule, VirtualHost};
use crate::xds::cluster::ClusterRegistry;
use crate::xds::header_mutation::apply_header_mutations;
use crate::xds::resources::{ResourceKind, ResourceMap};
use crate::xds::route_action::to_envoy_route_action;
use crate::xds::route_match::to_envoy_route_match;
use crate::{Error, Result};
use envoy_types::pb::envoy::config::route::v3::{
    route::Action, Route as EnvoyRoute, RouteConfiguration, VirtualHost as EnvoyVirtualHost,
};
use envoy_types::pb::google::protobuf::BoolValue;
use tracing::{debug, warn};

/// Translates domain routes using a cluster registry
pub struct RouteTranslator<'a, R: ?Sized> {
    registry: &'a R,
}

impl<'a, R> RouteTranslator<'a, R>
where
    R: ClusterRegistry + ?Sized,
{
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Translate one route.
    ///
    /// Clusters are appended to `resources` only when the whole route
    /// succeeds. Any failure is returned as [`Error::Translation`] carrying
    /// the route name.
    pub fn translate(&self, route: &Route, resources: &mut ResourceMap) -> Result<RouteConfiguration> {
        let _span = crate::translation_span!(route.name).entered();

        let mut staged = ResourceMap::new();
        let route_configuration = self
            .build_route_configuration(route, &mut staged)
            .map_err(|e| Error::translation(&route.name, e))?;

        debug!(
            virtual_hosts = route_configuration.virtual_hosts.len(),
            clusters = staged.len(ResourceKind::Cluster),
            "Translated route"
        );

        resources.merge(staged);
        Ok(route_configuration)
    }

    /// Translate one route and record the configuration itself in `resources`
    pub fn translate_into(&self, route: &Route, resources: &mut ResourceMap) -> Result<()> {
        let route_configuration = self.translate(route, resources)?;
        resources.push_route_configuration(route_configuration);
        Ok(())
    }

    /// Translate every route, continuing past failures.
    ///
    /// Only clusters of successful routes reach `resources`. The report
    /// holds the configurations in input order next to every failure.
    pub fn translate_all(&self, routes: &[Route], resources: &mut ResourceMap) -> TranslationReport {
        let mut report = TranslationReport::default();

        for route in routes {
            match self.translate(route, resources) {
                Ok(route_configuration) => report.route_configurations.push(route_configuration),
                Err(e) => {
                    warn!(route = %route.name, error = %e, "Failed to translate route");
                    report.failures.push(e);
                }
            }
        }

        report
    }

    fn build_route_configuration(
        &self,
        route: &Route,
        resources: &mut ResourceMap,
    ) -> Result<RouteConfiguration> {
        let virtual_hosts = route
            .virtual_hosts
            .iter()
            .map(|virtual_host| self.build_virtual_host(virtual_host, resources))
            .collect::<Result<Vec<_>>>()?;

        Ok(RouteConfiguration {
            name: route.name.clone(),
            virtual_hosts,
            validate_clusters: Some(BoolValue { value: true }),
            ..Default::default()
        })
    }

    fn build_virtual_host(
        &self,
        virtual_host: &VirtualHost,
        resources: &mut ResourceMap,
    ) -> Result<EnvoyVirtualHost> {
        let routes = virtual_host
            .route_rules
            .iter()
            .map(|rule| self.build_route(rule, resources))
            .collect::<Result<Vec<_>>>()?;

        debug!(virtual_host = %virtual_host.name, rules = routes.len(), "Translated virtual host");

        let mut envoy_virtual_host = EnvoyVirtualHost {
            name: virtual_host.name.clone(),
            domains: virtual_host.domains.clone(),
            routes,
            ..Default::default()
        };
        apply_header_mutations(&mut envoy_virtual_host, &virtual_host.header_mutations);

        Ok(envoy_virtual_host)
    }

    fn build_route(&self, rule: &RouteRule, resources: &mut ResourceMap) -> Result<EnvoyRoute> {
        let action = to_envoy_route_action(&rule.destination, self.registry, resources)?;

        let mut envoy_route = EnvoyRoute {
            r#match: Some(to_envoy_route_match(&rule.route_match)),
            action: Some(Action::Route(action)),
            ..Default::default()
        };
        apply_header_mutations(&mut envoy_route, &rule.header_mutations);

        Ok(envoy_route)
    }
}

/// Outcome of [`RouteTranslator::translate_all`]
#[derive(Debug, Default)]
pub struct TranslationReport {
    /// Successfully translated routes, in input order
    pub route_configurations: Vec<RouteConfiguration>,
    /// One [`Error::Translation`] per failed route
    pub failures: Vec<Error>,
}

impl TranslationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse into the first failure, if any
    pub fn into_result(self) -> Result<Vec<RouteConfiguration>> {
        match self.failures.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.route_configurations),
        }
    }

    /// Record every translated configuration in `resources`
    pub fn push_into(&self, resources: &mut ResourceMap) {
        for route_configuration in &self.route_configurations {
            resources.push_route_configuration(route_configuration.clone());
        }
    }
}
