//! Route action translation
//!
//! Converts a [`RouteDestination`] into an Envoy `RouteAction`. Every cluster
//! the destination names is registered through the [`ClusterRegistry`] and
//! the resulting wire clusters are appended to the run's [`ResourceMap`].

use crate::domain::{DestinationConfiguration, DestinationTarget, RouteDestination, WeightedCluster};
use crate::xds::cluster::ClusterRegistry;
use crate::xds::hash_policy::{to_envoy_duration, to_envoy_hash_policy, to_envoy_retry_policy};
use crate::xds::header_mutation::apply_header_mutations;
use crate::xds::resources::ResourceMap;
use crate::Result;
use envoy_types::pb::envoy::config::route::v3::{
    route_action::{ClusterSpecifier, HostRewriteSpecifier},
    weighted_cluster::ClusterWeight,
    RouteAction, WeightedCluster as EnvoyWeightedCluster,
};
use envoy_types::pb::google::protobuf::{BoolValue, UInt32Value};

/// Weight sum that marks weights as hundredths of a percent.
///
/// Any other sum leaves `total_weight` unset, so Envoy reads the weights
/// against its default of 100.
pub const HUNDREDTHS_OF_PERCENT_TOTAL_WEIGHT: u32 = 10_000;

pub fn to_envoy_route_action<R>(
    destination: &RouteDestination,
    registry: &R,
    resources: &mut ResourceMap,
) -> Result<RouteAction>
where
    R: ClusterRegistry + ?Sized,
{
    let mut action = RouteAction::default();

    match &destination.target {
        DestinationTarget::Cluster(name) => {
            resources.push_clusters(registry.register_cluster(name)?);
            action.cluster_specifier = Some(ClusterSpecifier::Cluster(name.clone()));
        }
        DestinationTarget::WeightedClusters(entries) => {
            let mut clusters = Vec::with_capacity(entries.len());
            let mut total_weight: u64 = 0;

            for entry in entries {
                resources.push_clusters(registry.register_cluster(&entry.name)?);
                total_weight += u64::from(entry.weight);
                clusters.push(to_envoy_cluster_weight(entry));
            }

            let total_weight = (total_weight == u64::from(HUNDREDTHS_OF_PERCENT_TOTAL_WEIGHT))
                .then_some(UInt32Value { value: HUNDREDTHS_OF_PERCENT_TOTAL_WEIGHT });

            #[allow(deprecated)]
            let weighted = EnvoyWeightedCluster { clusters, total_weight, ..Default::default() };

            action.cluster_specifier = Some(ClusterSpecifier::WeightedClusters(weighted));
        }
    }

    if let Some(config) = &destination.destination_configuration {
        apply_destination_configuration(&mut action, config);
    }

    Ok(action)
}

fn to_envoy_cluster_weight(entry: &WeightedCluster) -> ClusterWeight {
    let mut cluster_weight = ClusterWeight {
        name: entry.name.clone(),
        weight: Some(UInt32Value { value: entry.weight }),
        ..Default::default()
    };

    apply_header_mutations(&mut cluster_weight, &entry.header_mutations);

    cluster_weight
}

/// Layer optional destination settings on top of an action.
///
/// Unset optional inputs stay unset; nothing is coerced to a zero value.
pub fn apply_destination_configuration(action: &mut RouteAction, config: &DestinationConfiguration) {
    action.hash_policy = config.hash_policies.iter().map(to_envoy_hash_policy).collect();

    if let Some(auto_host_rewrite) = config.auto_host_rewrite {
        action.host_rewrite_specifier =
            Some(HostRewriteSpecifier::AutoHostRewrite(BoolValue { value: auto_host_rewrite }));
    }

    action.prefix_rewrite = config.prefix_rewrite.clone();
    action.timeout = config.timeout.map(to_envoy_duration);
    action.idle_timeout = config.idle_timeout.map(to_envoy_duration);
    action.retry_policy = config.retry_policy.as_ref().map(to_envoy_retry_policy);
}
