//! Route domain types
//!
//! The internal routing model handed to the translator. It is produced and
//! validated upstream; nothing here re-validates it. Every "exactly one of"
//! choice is an enum, so an unset variant cannot be represented and is
//! rejected when a snapshot is deserialized.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A named route: the unit that becomes one Envoy `RouteConfiguration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub name: String,
    #[serde(default)]
    pub virtual_hosts: Vec<VirtualHost>,
}

/// A group of domains sharing an ordered list of route rules.
///
/// Domain order and rule order both decide matching precedence at the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHost {
    pub name: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub route_rules: Vec<RouteRule>,
    #[serde(default)]
    pub header_mutations: Vec<HeaderMutation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[serde(rename = "match")]
    pub route_match: RouteMatch,
    pub destination: RouteDestination,
    #[serde(default)]
    pub header_mutations: Vec<HeaderMutation>,
}

/// Complete route matching criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    pub path_match: PathMatch,
    #[serde(default)]
    pub header_matches: Vec<HeaderMatch>,
    #[serde(default)]
    pub method_matches: Vec<String>,
    #[serde(default)]
    pub query_parameter_matches: Vec<QueryParameterMatch>,
}

impl RouteMatch {
    /// Create a prefix-based route match with no further criteria
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::with_path(PathMatch::Prefix(prefix.into()))
    }

    /// Create an exact path route match with no further criteria
    pub fn exact(path: impl Into<String>) -> Self {
        Self::with_path(PathMatch::Exact(path.into()))
    }

    fn with_path(path_match: PathMatch) -> Self {
        Self {
            path_match,
            header_matches: Vec::new(),
            method_matches: Vec::new(),
            query_parameter_matches: Vec::new(),
        }
    }

    /// Add a header match requirement
    pub fn with_header(mut self, name: impl Into<String>, kind: HeaderMatchKind) -> Self {
        self.header_matches.push(HeaderMatch { name: name.into(), kind, invert_match: false });
        self
    }

    /// Add an HTTP method to the set of accepted methods
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method_matches.push(method.into());
        self
    }

    /// Add a query parameter match requirement
    pub fn with_query_param(
        mut self,
        name: impl Into<String>,
        kind: QueryParameterMatchKind,
    ) -> Self {
        self.query_parameter_matches.push(QueryParameterMatch { name: name.into(), kind });
        self
    }
}

/// Path matching strategy. Mandatory on every route match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathMatch {
    Exact(String),
    Prefix(String),
    Regex(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMatch {
    pub name: String,
    #[serde(rename = "match")]
    pub kind: HeaderMatchKind,
    #[serde(default)]
    pub invert_match: bool,
}

/// Header matching strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderMatchKind {
    Exact(String),
    Regex(String),
    Prefix(String),
    Suffix(String),
    /// Header must be present (any value)
    Present,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameterMatch {
    pub name: String,
    #[serde(rename = "match")]
    pub kind: QueryParameterMatchKind,
}

/// Query parameter matching strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryParameterMatchKind {
    Exact(String),
    Regex(String),
    /// Parameter must be present (any value)
    Present,
}

/// Where matched traffic goes, plus optional per-destination tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDestination {
    pub target: DestinationTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_configuration: Option<DestinationConfiguration>,
}

impl RouteDestination {
    /// Destination sending all traffic to a single cluster
    pub fn cluster(name: impl Into<String>) -> Self {
        Self { target: DestinationTarget::Cluster(name.into()), destination_configuration: None }
    }

    /// Destination splitting traffic across weighted clusters
    pub fn weighted(clusters: Vec<WeightedCluster>) -> Self {
        Self {
            target: DestinationTarget::WeightedClusters(clusters),
            destination_configuration: None,
        }
    }

    pub fn with_configuration(mut self, config: DestinationConfiguration) -> Self {
        self.destination_configuration = Some(config);
        self
    }
}

/// Route target specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DestinationTarget {
    /// Single cluster
    Cluster(String),

    /// Weighted distribution across multiple clusters. Never empty.
    WeightedClusters(Vec<WeightedCluster>),
}

/// Weighted cluster for traffic splitting
///
/// Weights summing to exactly 10000 are read by the proxy as hundredths of a
/// percent; any other sum is read against the proxy default of 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedCluster {
    pub name: String,
    pub weight: u32,
    #[serde(default)]
    pub header_mutations: Vec<HeaderMutation>,
}

impl WeightedCluster {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self { name: name.into(), weight, header_mutations: Vec::new() }
    }
}

/// Optional destination tuning. Every field keeps its absence through
/// translation; nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationConfiguration {
    /// Empty means "no rewrite"
    #[serde(default)]
    pub prefix_rewrite: String,

    #[serde(default, with = "super::duration_ms", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    #[serde(default, with = "super::duration_ms", skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,

    #[serde(default)]
    pub hash_policies: Vec<LoadBalancerHashPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_host_rewrite: Option<bool>,
}

/// Retry policy, copied verbatim to the proxy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_retries: Option<u32>,
    #[serde(default)]
    pub retriable_status_codes: Vec<u32>,
    /// Envoy retry-on tokens such as `5xx` or `reset`
    #[serde(default)]
    pub retry_on: Vec<String>,
}

/// Consistent-hash key source for session-affine load balancing.
///
/// `terminal` stops evaluation of later policies once this one yields a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadBalancerHashPolicy {
    /// Hash on the client source address
    #[serde(rename_all = "camelCase")]
    ConnectionProperties {
        #[serde(default)]
        terminal: bool,
    },

    #[serde(rename_all = "camelCase")]
    Header {
        name: String,
        #[serde(default)]
        terminal: bool,
    },

    /// Hash on a cookie; with a `ttl` the proxy generates the cookie when absent
    #[serde(rename_all = "camelCase")]
    Cookie {
        name: String,
        #[serde(default)]
        path: String,
        #[serde(default, with = "super::duration_ms", skip_serializing_if = "Option::is_none")]
        ttl: Option<Duration>,
        #[serde(default)]
        terminal: bool,
    },

    #[serde(rename_all = "camelCase")]
    QueryParameter {
        name: String,
        #[serde(default)]
        terminal: bool,
    },
}

impl LoadBalancerHashPolicy {
    pub fn is_terminal(&self) -> bool {
        match self {
            LoadBalancerHashPolicy::ConnectionProperties { terminal }
            | LoadBalancerHashPolicy::Header { terminal, .. }
            | LoadBalancerHashPolicy::Cookie { terminal, .. }
            | LoadBalancerHashPolicy::QueryParameter { terminal, .. } => *terminal,
        }
    }
}

/// Add or remove a request/response header at proxy time.
///
/// Applies the same way to a virtual host, a route rule or a weighted
/// cluster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderMutation {
    #[serde(rename_all = "camelCase")]
    RequestHeaderAdd {
        header: Header,
        #[serde(default)]
        append_action: AppendAction,
    },

    #[serde(rename_all = "camelCase")]
    RequestHeaderRemove { header_keys: Vec<String> },

    #[serde(rename_all = "camelCase")]
    ResponseHeaderAdd {
        header: Header,
        #[serde(default)]
        append_action: AppendAction,
    },

    #[serde(rename_all = "camelCase")]
    ResponseHeaderRemove { header_keys: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// What to do when a header being added already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppendAction {
    #[default]
    Unspecified,
    AppendIfExistsOrAdd,
    OverwriteIfExistsOrAdd,
}

impl AppendAction {
    /// Reduce to the proxy's boolean append flag
    pub fn appends(self) -> bool {
        matches!(self, AppendAction::AppendIfExistsOrAdd)
    }
}
