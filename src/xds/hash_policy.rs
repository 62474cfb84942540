//! Hash policy and retry policy mapping for route actions

use crate::domain::{LoadBalancerHashPolicy, RetryPolicy};
use envoy_types::pb::envoy::config::route::v3::{
    route_action::{
        hash_policy::{self, PolicySpecifier},
        HashPolicy,
    },
    RetryPolicy as EnvoyRetryPolicy,
};
use envoy_types::pb::google::protobuf::{Duration, UInt32Value};

/// Map one hash policy. The terminal flag is copied as-is.
pub fn to_envoy_hash_policy(policy: &LoadBalancerHashPolicy) -> HashPolicy {
    let specifier = match policy {
        LoadBalancerHashPolicy::ConnectionProperties { .. } => {
            PolicySpecifier::ConnectionProperties(hash_policy::ConnectionProperties {
                source_ip: true,
            })
        }
        LoadBalancerHashPolicy::Header { name, .. } => {
            PolicySpecifier::Header(hash_policy::Header {
                header_name: name.clone(),
                ..Default::default()
            })
        }
        LoadBalancerHashPolicy::Cookie { name, path, ttl, .. } => {
            PolicySpecifier::Cookie(hash_policy::Cookie {
                name: name.clone(),
                path: path.clone(),
                ttl: ttl.map(to_envoy_duration),
                ..Default::default()
            })
        }
        LoadBalancerHashPolicy::QueryParameter { name, .. } => {
            PolicySpecifier::QueryParameter(hash_policy::QueryParameter { name: name.clone() })
        }
    };

    HashPolicy { policy_specifier: Some(specifier), terminal: policy.is_terminal() }
}

/// Copy a retry policy without range or token checks.
///
/// Envoy takes `retry_on` as a single comma-separated string.
pub fn to_envoy_retry_policy(policy: &RetryPolicy) -> EnvoyRetryPolicy {
    EnvoyRetryPolicy {
        retry_on: policy.retry_on.join(","),
        num_retries: policy.num_retries.map(|value| UInt32Value { value }),
        retriable_status_codes: policy.retriable_status_codes.clone(),
        ..Default::default()
    }
}

/// Largest value a protobuf `Duration` may carry (10,000 years)
pub const MAX_DURATION_SECONDS: i64 = 315_576_000_000;

/// Convert to a protobuf `Duration`, saturating at [`MAX_DURATION_SECONDS`]
pub fn to_envoy_duration(duration: std::time::Duration) -> Duration {
    let seconds = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
    if seconds >= MAX_DURATION_SECONDS {
        return Duration { seconds: MAX_DURATION_SECONDS, nanos: 0 };
    }

    Duration { seconds, nanos: duration.subsec_nanos() as i32 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_properties_hash_on_source_ip() {
        let policy =
            to_envoy_hash_policy(&LoadBalancerHashPolicy::ConnectionProperties { terminal: true });

        assert!(policy.terminal);
        assert_eq!(
            policy.policy_specifier,
            Some(PolicySpecifier::ConnectionProperties(hash_policy::ConnectionProperties {
                source_ip: true
            }))
        );
    }

    #[test]
    fn header_and_query_parameter_policies() {
        let header = to_envoy_hash_policy(&LoadBalancerHashPolicy::Header {
            name: "x-user-id".into(),
            terminal: false,
        });
        assert!(!header.terminal);
        match header.policy_specifier {
            Some(PolicySpecifier::Header(h)) => assert_eq!(h.header_name, "x-user-id"),
            other => panic!("expected header policy, got {:?}", other),
        }

        let query = to_envoy_hash_policy(&LoadBalancerHashPolicy::QueryParameter {
            name: "shard".into(),
            terminal: true,
        });
        assert!(query.terminal);
        assert_eq!(
            query.policy_specifier,
            Some(PolicySpecifier::QueryParameter(hash_policy::QueryParameter {
                name: "shard".into()
            }))
        );
    }

    #[test]
    fn cookie_policy_keeps_ttl_absence() {
        let with_ttl = to_envoy_hash_policy(&LoadBalancerHashPolicy::Cookie {
            name: "session".into(),
            path: "/".into(),
            ttl: Some(std::time::Duration::from_millis(1500)),
            terminal: false,
        });
        match with_ttl.policy_specifier {
            Some(PolicySpecifier::Cookie(cookie)) => {
                assert_eq!(cookie.name, "session");
                assert_eq!(cookie.path, "/");
                assert_eq!(cookie.ttl, Some(Duration { seconds: 1, nanos: 500_000_000 }));
            }
            other => panic!("expected cookie policy, got {:?}", other),
        }

        let without_ttl = to_envoy_hash_policy(&LoadBalancerHashPolicy::Cookie {
            name: "session".into(),
            path: String::new(),
            ttl: None,
            terminal: false,
        });
        match without_ttl.policy_specifier {
            Some(PolicySpecifier::Cookie(cookie)) => assert!(cookie.ttl.is_none()),
            other => panic!("expected cookie policy, got {:?}", other),
        }
    }

    #[test]
    fn duration_conversion_saturates() {
        assert_eq!(
            to_envoy_duration(std::time::Duration::MAX),
            Duration { seconds: MAX_DURATION_SECONDS, nanos: 0 }
        );
        assert_eq!(
            to_envoy_duration(std::time::Duration::from_secs(MAX_DURATION_SECONDS as u64 + 1)),
            Duration { seconds: MAX_DURATION_SECONDS, nanos: 0 }
        );
        assert_eq!(
            to_envoy_duration(std::time::Duration::new(15, 250)),
            Duration { seconds: 15, nanos: 250 }
        );
    }

    #[test]
    fn retry_policy_is_copied_verbatim() {
        let policy = to_envoy_retry_policy(&RetryPolicy {
            num_retries: Some(3),
            retriable_status_codes: vec![503, 504],
            retry_on: vec!["5xx".into(), "retriable-status-codes".into()],
        });

        assert_eq!(policy.num_retries, Some(UInt32Value { value: 3 }));
        assert_eq!(policy.retriable_status_codes, vec![503, 504]);
        assert_eq!(policy.retry_on, "5xx,retriable-status-codes");
    }

    #[test]
    fn retry_policy_without_count_leaves_it_unset() {
        let policy = to_envoy_retry_policy(&RetryPolicy::default());
        assert!(policy.num_retries.is_none());
        assert!(policy.retry_on.is_empty());
    }
}
