//! Cluster registration for route destinations
//!
//! Route translation asks a [`ClusterRegistry`] for the wire clusters behind
//! every cluster name a destination references. One logical name may expand
//! to several Envoy clusters (failover groups become an aggregate cluster
//! plus one cluster per tier).

use crate::domain::{ClusterSpec, LoadBalancingPolicy};
use crate::{Error, Result};
use envoy_types::pb::envoy::config::cluster::v3::{
    cluster::{ClusterDiscoveryType, CustomClusterType, DiscoveryType, LbPolicy},
    Cluster,
};
use envoy_types::pb::envoy::config::core::v3::{
    address, socket_address, Address, SocketAddress,
};
use envoy_types::pb::envoy::config::endpoint::v3::{
    lb_endpoint, ClusterLoadAssignment, Endpoint, LbEndpoint, LocalityLbEndpoints,
};
use envoy_types::pb::envoy::extensions::clusters::aggregate::v3::ClusterConfig as AggregateClusterConfig;
use envoy_types::pb::google::protobuf::{Any, Duration};
use prost::Message;
use std::collections::BTreeMap;
use tracing::debug;

pub const AGGREGATE_CLUSTER_TYPE: &str = "envoy.clusters.aggregate";
pub const AGGREGATE_CLUSTER_CONFIG_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.clusters.aggregate.v3.ClusterConfig";

const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Source of the wire clusters behind a logical cluster name.
///
/// Implementations must be deterministic and idempotent: translation calls
/// `register_cluster` once per reference, so the same name may be asked for
/// many times in one run.
pub trait ClusterRegistry {
    fn register_cluster(&self, name: &str) -> Result<Vec<Cluster>>;
}

impl<F> ClusterRegistry for F
where
    F: Fn(&str) -> Result<Vec<Cluster>>,
{
    fn register_cluster(&self, name: &str) -> Result<Vec<Cluster>> {
        self(name)
    }
}

/// Registry backed by a catalog of [`ClusterSpec`] entries
#[derive(Debug, Clone, Default)]
pub struct CatalogClusterRegistry {
    catalog: BTreeMap<String, ClusterSpec>,
}

impl CatalogClusterRegistry {
    pub fn new(catalog: BTreeMap<String, ClusterSpec>) -> Self {
        Self { catalog }
    }

    /// Add or replace a catalog entry
    pub fn upsert(&mut self, name: impl Into<String>, spec: ClusterSpec) {
        self.catalog.insert(name.into(), spec);
    }

    fn spec(&self, name: &str) -> Result<&ClusterSpec> {
        self.catalog.get(name).ok_or_else(|| Error::unknown_cluster(name))
    }
}

impl ClusterRegistry for CatalogClusterRegistry {
    fn register_cluster(&self, name: &str) -> Result<Vec<Cluster>> {
        let spec = self.spec(name)?;

        if !spec.is_failover() {
            return Ok(vec![endpoint_cluster(name, spec)?]);
        }

        let mut tiers = Vec::with_capacity(spec.failover.len() + 1);
        tiers.push(endpoint_cluster(&failover_target_name(0, name), spec)?);
        for (index, target) in spec.failover.iter().enumerate() {
            let target_spec = self.spec(target)?;
            tiers.push(endpoint_cluster(&failover_target_name(index + 1, name), target_spec)?);
        }

        let aggregate =
            aggregate_cluster(name, spec, tiers.iter().map(|c| c.name.clone()).collect());

        debug!(cluster = %name, tiers = tiers.len(), "Expanded failover cluster");

        let mut clusters = Vec::with_capacity(tiers.len() + 1);
        clusters.push(aggregate);
        clusters.extend(tiers);
        Ok(clusters)
    }
}

/// Name of the concrete cluster serving failover tier `index` of `name`
pub fn failover_target_name(index: usize, name: &str) -> String {
    format!("failover-target~{}~{}", index, name)
}

fn endpoint_cluster(name: &str, spec: &ClusterSpec) -> Result<Cluster> {
    let mut lb_endpoints = Vec::with_capacity(spec.endpoints.len());
    for endpoint in &spec.endpoints {
        let (host, port) = endpoint.to_host_port().ok_or_else(|| {
            Error::cluster_registration(name, format!("invalid endpoint '{}'", endpoint))
        })?;

        lb_endpoints.push(LbEndpoint {
            host_identifier: Some(lb_endpoint::HostIdentifier::Endpoint(Endpoint {
                address: Some(Address {
                    address: Some(address::Address::SocketAddress(SocketAddress {
                        address: host,
                        port_specifier: Some(socket_address::PortSpecifier::PortValue(port)),
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })),
            ..Default::default()
        });
    }

    if lb_endpoints.is_empty() {
        return Err(Error::cluster_registration(name, "no endpoints defined"));
    }

    let discovery_type = if !spec.has_hostname() {
        DiscoveryType::Static
    } else if lb_endpoints.len() == 1 {
        DiscoveryType::LogicalDns
    } else {
        DiscoveryType::StrictDns
    };

    Ok(Cluster {
        name: name.to_string(),
        connect_timeout: Some(connect_timeout(spec)),
        lb_policy: map_lb_policy(spec.lb_policy.unwrap_or_default()) as i32,
        cluster_discovery_type: Some(ClusterDiscoveryType::Type(discovery_type as i32)),
        load_assignment: Some(ClusterLoadAssignment {
            cluster_name: name.to_string(),
            endpoints: vec![LocalityLbEndpoints { lb_endpoints, ..Default::default() }],
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn aggregate_cluster(name: &str, spec: &ClusterSpec, tiers: Vec<String>) -> Cluster {
    let config = AggregateClusterConfig { clusters: tiers };

    Cluster {
        name: name.to_string(),
        connect_timeout: Some(connect_timeout(spec)),
        lb_policy: LbPolicy::ClusterProvided as i32,
        cluster_discovery_type: Some(ClusterDiscoveryType::ClusterType(CustomClusterType {
            name: AGGREGATE_CLUSTER_TYPE.to_string(),
            typed_config: Some(Any {
                type_url: AGGREGATE_CLUSTER_CONFIG_TYPE_URL.to_string(),
                value: config.encode_to_vec(),
            }),
        })),
        ..Default::default()
    }
}

fn connect_timeout(spec: &ClusterSpec) -> Duration {
    let seconds = spec.connect_timeout_seconds.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECONDS);
    Duration { seconds: seconds as i64, nanos: 0 }
}

fn map_lb_policy(policy: LoadBalancingPolicy) -> LbPolicy {
    match policy {
        LoadBalancingPolicy::RoundRobin => LbPolicy::RoundRobin,
        LoadBalancingPolicy::LeastRequest => LbPolicy::LeastRequest,
        LoadBalancingPolicy::Random => LbPolicy::Random,
        LoadBalancingPolicy::RingHash => LbPolicy::RingHash,
        LoadBalancingPolicy::Maglev => LbPolicy::Maglev,
    }
}
