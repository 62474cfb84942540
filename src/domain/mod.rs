//! Domain layer
//!
//! Pure input types for the translator: the routing model (`route`) and the
//! cluster catalog (`cluster`). A [`MeshSnapshot`] bundles both and is what
//! the command line loads from disk.

pub mod cluster;
pub mod route;

pub use cluster::{ClusterSpec, EndpointSpec, LoadBalancingPolicy};
pub use route::{
    AppendAction, DestinationConfiguration, DestinationTarget, Header, HeaderMatch,
    HeaderMatchKind, HeaderMutation, LoadBalancerHashPolicy, PathMatch, QueryParameterMatch,
    QueryParameterMatchKind, RetryPolicy, Route, RouteDestination, RouteMatch, RouteRule,
    VirtualHost, WeightedCluster,
};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Immutable input for one translation run: routes plus the cluster catalog
/// their destinations refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshSnapshot {
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub clusters: BTreeMap<String, ClusterSpec>,
}

impl MeshSnapshot {
    /// Load a snapshot from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            other => Err(Error::config(format!(
                "Unsupported snapshot extension {:?} for {}; use .json, .yaml or .yml",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    /// Parse YAML where every enum is written as a single-key map
    /// (`pathMatch: {prefix: /api}`), the same shape as the JSON form.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(
            contents,
        ))
        .map_err(|e| Error::serialization("Invalid YAML mesh snapshot", e))
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| Error::serialization("Invalid JSON mesh snapshot", e))
    }

    /// Keep only the named routes, preserving snapshot order
    pub fn retain_routes(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        self.routes.retain(|route| names.iter().any(|name| name == &route.name));
    }
}

/// Serde adapter storing `Option<Duration>` as integer milliseconds.
pub(crate) mod duration_ms {
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => {
                let millis = u64::try_from(duration.as_millis()).map_err(|_| {
                    S::Error::custom(format!("duration {:?} overflows u64 milliseconds", duration))
                })?;
                serializer.serialize_u64(millis)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
