//! Cluster catalog entries
//!
//! Upstream definitions the built-in cluster registry expands into Envoy
//! `Cluster` resources when a route destination references them by name.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A named upstream in the catalog.
///
/// With a non-empty `failover` list the entry expands into an aggregate
/// cluster plus one concrete cluster per failover tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default)]
    pub endpoints: Vec<EndpointSpec>,

    #[serde(default, alias = "connect_timeout_seconds")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_seconds: Option<u64>,

    #[serde(default, alias = "lb_policy")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lb_policy: Option<LoadBalancingPolicy>,

    /// Catalog names tried in order after this entry's own endpoints
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failover: Vec<String>,
}

impl ClusterSpec {
    pub fn with_endpoints<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoints: endpoints.into_iter().map(|e| EndpointSpec::String(e.into())).collect(),
            ..Default::default()
        }
    }

    pub fn is_failover(&self) -> bool {
        !self.failover.is_empty()
    }

    /// True when any endpoint names a host rather than an IP literal
    pub fn has_hostname(&self) -> bool {
        self.endpoints.iter().any(EndpointSpec::is_hostname)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadBalancingPolicy {
    #[default]
    RoundRobin,
    LeastRequest,
    Random,
    RingHash,
    Maglev,
}

/// An upstream endpoint, either `"host:port"` or `{ host, port }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointSpec {
    String(String),
    Address { host: String, port: u16 },
}

impl std::fmt::Display for EndpointSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointSpec::String(s) => write!(f, "{}", s),
            EndpointSpec::Address { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}

impl EndpointSpec {
    pub fn to_host_port(&self) -> Option<(String, u32)> {
        match self {
            EndpointSpec::String(value) => {
                let (host, port) = value.rsplit_once(':')?;
                let host = host.trim();
                let port = port.trim().parse::<u16>().ok()?;
                if host.is_empty() {
                    return None;
                }
                Some((host.to_string(), port.into()))
            }
            EndpointSpec::Address { host, port } => {
                if host.trim().is_empty() {
                    return None;
                }
                Some((host.trim().to_string(), (*port).into()))
            }
        }
    }

    pub fn is_hostname(&self) -> bool {
        self.to_host_port().is_some_and(|(host, _)| host.parse::<IpAddr>().is_err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_string_parsing() {
        let endpoint = EndpointSpec::String("10.0.0.1:8080".into());
        assert_eq!(endpoint.to_host_port(), Some(("10.0.0.1".to_string(), 8080)));
        assert!(!endpoint.is_hostname());

        let endpoint = EndpointSpec::String("api.internal:443".into());
        assert!(endpoint.is_hostname());

        assert_eq!(EndpointSpec::String("no-port".into()).to_host_port(), None);
        assert_eq!(EndpointSpec::String(":80".into()).to_host_port(), None);
        assert_eq!(EndpointSpec::String("host:99999".into()).to_host_port(), None);
    }

    #[test]
    fn endpoint_address_display() {
        let endpoint = EndpointSpec::Address { host: "db".into(), port: 5432 };
        assert_eq!(endpoint.to_string(), "db:5432");
        assert_eq!(endpoint.to_host_port(), Some(("db".to_string(), 5432)));
    }

    #[test]
    fn cluster_spec_from_yaml() {
        let yaml = r#"
endpoints:
  - 10.0.0.1:8080
  - host: api.internal
    port: 9090
lbPolicy: LEAST_REQUEST
failover: [api-dr]
"#;
        let spec: ClusterSpec = serde_yaml::from_str(yaml).expect("parse cluster spec");

        assert_eq!(spec.endpoints.len(), 2);
        assert_eq!(spec.lb_policy, Some(LoadBalancingPolicy::LeastRequest));
        assert!(spec.is_failover());
        assert!(spec.has_hostname());
    }
}
