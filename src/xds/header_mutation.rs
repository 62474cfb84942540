//! Header mutations for route-level scopes
//!
//! Envoy carries the same four header lists on a virtual host, a route and a
//! weighted cluster entry. [`HeaderMutationTarget`] exposes those lists so the
//! mutation dispatch in [`apply_header_mutations`] is written once for all
//! three scopes.

use crate::domain::{AppendAction, Header, HeaderMutation};
use envoy_types::pb::envoy::config::core::v3::{HeaderValue, HeaderValueOption};
use envoy_types::pb::envoy::config::route::v3::{weighted_cluster::ClusterWeight, Route, VirtualHost};
use envoy_types::pb::google::protobuf::BoolValue;

/// An Envoy scope that accepts request/response header additions and removals.
pub trait HeaderMutationTarget {
    fn request_headers_to_add(&mut self) -> &mut Vec<HeaderValueOption>;
    fn request_headers_to_remove(&mut self) -> &mut Vec<String>;
    fn response_headers_to_add(&mut self) -> &mut Vec<HeaderValueOption>;
    fn response_headers_to_remove(&mut self) -> &mut Vec<String>;
}

macro_rules! impl_header_mutation_target {
    ($($scope:ty),+ $(,)?) => {
        $(
            impl HeaderMutationTarget for $scope {
                fn request_headers_to_add(&mut self) -> &mut Vec<HeaderValueOption> {
                    &mut self.request_headers_to_add
                }

                fn request_headers_to_remove(&mut self) -> &mut Vec<String> {
                    &mut self.request_headers_to_remove
                }

                fn response_headers_to_add(&mut self) -> &mut Vec<HeaderValueOption> {
                    &mut self.response_headers_to_add
                }

                fn response_headers_to_remove(&mut self) -> &mut Vec<String> {
                    &mut self.response_headers_to_remove
                }
            }
        )+
    };
}

impl_header_mutation_target!(VirtualHost, Route, ClusterWeight);

/// Append every mutation, in order, to the matching list on `target`
pub fn apply_header_mutations<T>(target: &mut T, mutations: &[HeaderMutation])
where
    T: HeaderMutationTarget + ?Sized,
{
    for mutation in mutations {
        apply_header_mutation(target, mutation);
    }
}

pub fn apply_header_mutation<T>(target: &mut T, mutation: &HeaderMutation)
where
    T: HeaderMutationTarget + ?Sized,
{
    match mutation {
        HeaderMutation::RequestHeaderAdd { header, append_action } => {
            target.request_headers_to_add().push(header_value_option(header, *append_action));
        }
        HeaderMutation::RequestHeaderRemove { header_keys } => {
            target.request_headers_to_remove().extend(header_keys.iter().cloned());
        }
        HeaderMutation::ResponseHeaderAdd { header, append_action } => {
            target.response_headers_to_add().push(header_value_option(header, *append_action));
        }
        HeaderMutation::ResponseHeaderRemove { header_keys } => {
            target.response_headers_to_remove().extend(header_keys.iter().cloned());
        }
    }
}

#[allow(deprecated)]
fn header_value_option(header: &Header, append_action: AppendAction) -> HeaderValueOption {
    HeaderValueOption {
        header: Some(HeaderValue {
            key: header.key.clone(),
            value: header.value.clone(),
            ..Default::default()
        }),
        append: Some(BoolValue { value: append_action.appends() }),
        ..Default::default()
    }
}
