//! Generated resource collection
//!
//! A [`ResourceMap`] is owned by the caller of one translation run. Route
//! translation appends the clusters its destinations reference and, through
//! [`crate::xds::RouteTranslator::translate_into`], the route configurations
//! themselves. Never share one map between runs for different proxies.

use envoy_types::pb::envoy::config::cluster::v3::Cluster;
use envoy_types::pb::envoy::config::route::v3::RouteConfiguration;
use envoy_types::pb::google::protobuf::Any;
use prost::Message;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

pub const CLUSTER_TYPE_URL: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
pub const ROUTE_TYPE_URL: &str = "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";

/// Kind of a generated xDS resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Cluster,
    RouteConfiguration,
}

impl ResourceKind {
    pub fn type_url(self) -> &'static str {
        match self {
            ResourceKind::Cluster => CLUSTER_TYPE_URL,
            ResourceKind::RouteConfiguration => ROUTE_TYPE_URL,
        }
    }

    /// Short plural label, used for directory names and summaries
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Cluster => "clusters",
            ResourceKind::RouteConfiguration => "routes",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Wrapper for a built Envoy resource along with its name.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltResource {
    pub name: String,
    pub resource: Any,
}

impl BuiltResource {
    pub fn into_any(self) -> Any {
        self.resource
    }

    pub fn type_url(&self) -> &str {
        &self.resource.type_url
    }
}

/// Per-run accumulator of generated resources, keyed by kind.
///
/// Insertion order is kept. Duplicate clusters (several routes pointing at
/// the same name) are kept too; see [`ResourceMap::dedup_clusters_by_name`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMap {
    clusters: Vec<Cluster>,
    route_configurations: Vec<RouteConfiguration>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_clusters<I>(&mut self, clusters: I)
    where
        I: IntoIterator<Item = Cluster>,
    {
        self.clusters.extend(clusters);
    }

    pub fn push_route_configuration(&mut self, route_configuration: RouteConfiguration) {
        self.route_configurations.push(route_configuration);
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn route_configurations(&self) -> &[RouteConfiguration] {
        &self.route_configurations
    }

    pub fn len(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Cluster => self.clusters.len(),
            ResourceKind::RouteConfiguration => self.route_configurations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.route_configurations.is_empty()
    }

    /// Append everything from `other`, keeping its order
    pub fn merge(&mut self, other: ResourceMap) {
        self.clusters.extend(other.clusters);
        self.route_configurations.extend(other.route_configurations);
    }

    /// Drop repeated clusters, keeping the first occurrence of each name
    pub fn dedup_clusters_by_name(&mut self) {
        let before = self.clusters.len();
        let mut seen = HashSet::new();
        self.clusters.retain(|cluster| seen.insert(cluster.name.clone()));

        if before != self.clusters.len() {
            debug!(removed = before - self.clusters.len(), "Removed duplicate clusters");
        }
    }

    /// Encode every resource as `google.protobuf.Any`, grouped by kind
    pub fn to_built_resources(&self) -> BTreeMap<ResourceKind, Vec<BuiltResource>> {
        let mut built = BTreeMap::new();

        if !self.clusters.is_empty() {
            built.insert(
                ResourceKind::Cluster,
                self.clusters
                    .iter()
                    .map(|cluster| encode(ResourceKind::Cluster, &cluster.name, cluster))
                    .collect(),
            );
        }

        if !self.route_configurations.is_empty() {
            built.insert(
                ResourceKind::RouteConfiguration,
                self.route_configurations
                    .iter()
                    .map(|route| encode(ResourceKind::RouteConfiguration, &route.name, route))
                    .collect(),
            );
        }

        built
    }
}

fn encode<M: Message>(kind: ResourceKind, name: &str, message: &M) -> BuiltResource {
    BuiltResource {
        name: name.to_string(),
        resource: Any { type_url: kind.type_url().to_string(), value: message.encode_to_vec() },
    }
}
