//! Envoy xDS resource translation
//!
//! Converts the routing model in [`crate::domain`] into Envoy v3 protobuf
//! resources:
//! - `RouteConfiguration` (RDS) from each [`crate::domain::Route`]
//! - `Cluster` (CDS) for every cluster a route destination references,
//!   produced by a [`ClusterRegistry`]
//!
//! Translation is synchronous and holds no state between runs; all generated
//! resources land in a caller-owned [`ResourceMap`].

pub mod cluster;
pub mod hash_policy;
pub mod header_mutation;
pub mod resources;
pub mod route;
pub mod route_action;
pub mod route_match;

pub use cluster::{CatalogClusterRegistry, ClusterRegistry};
pub use resources::{BuiltResource, ResourceKind, ResourceMap, CLUSTER_TYPE_URL, ROUTE_TYPE_URL};
pub use route::{RouteTranslator, TranslationReport};
