//! Route match translation
//!
//! Converts a [`RouteMatch`] into Envoy's `RouteMatch`. Envoy has no method
//! matcher, so accepted methods become one extra regex matcher on the
//! `:method` pseudo-header, placed after every explicit header matcher.

use crate::domain::{
    HeaderMatch, HeaderMatchKind, PathMatch, QueryParameterMatch, QueryParameterMatchKind,
    RouteMatch,
};
use envoy_types::pb::envoy::config::route::v3::{
    header_matcher::HeaderMatchSpecifier, query_parameter_matcher::QueryParameterMatchSpecifier,
    route_match::PathSpecifier, HeaderMatcher, QueryParameterMatcher,
    RouteMatch as EnvoyRouteMatch,
};
use envoy_types::pb::envoy::r#type::matcher::v3::{
    regex_matcher::{EngineType, GoogleRe2},
    string_matcher::MatchPattern,
    RegexMatcher, StringMatcher,
};

pub const METHOD_PSEUDO_HEADER: &str = ":method";

/// Build a safe-regex matcher. Every regex uses the RE2 engine.
#[allow(deprecated)]
pub fn regex_matcher(pattern: &str) -> RegexMatcher {
    RegexMatcher {
        engine_type: Some(EngineType::GoogleRe2(GoogleRe2::default())),
        regex: pattern.to_string(),
    }
}

pub fn to_envoy_route_match(route_match: &RouteMatch) -> EnvoyRouteMatch {
    let path_specifier = match &route_match.path_match {
        PathMatch::Exact(path) => PathSpecifier::Path(path.clone()),
        PathMatch::Prefix(prefix) => PathSpecifier::Prefix(prefix.clone()),
        PathMatch::Regex(regex) => PathSpecifier::SafeRegex(regex_matcher(regex)),
    };

    let mut headers: Vec<HeaderMatcher> =
        route_match.header_matches.iter().map(to_envoy_header_matcher).collect();

    if !route_match.method_matches.is_empty() {
        headers.push(method_header_matcher(&route_match.method_matches));
    }

    let query_parameters =
        route_match.query_parameter_matches.iter().map(to_envoy_query_parameter_matcher).collect();

    EnvoyRouteMatch {
        path_specifier: Some(path_specifier),
        headers,
        query_parameters,
        ..Default::default()
    }
}

#[allow(deprecated)]
pub fn to_envoy_header_matcher(header_match: &HeaderMatch) -> HeaderMatcher {
    let specifier = match &header_match.kind {
        HeaderMatchKind::Exact(value) => HeaderMatchSpecifier::ExactMatch(value.clone()),
        HeaderMatchKind::Regex(regex) => HeaderMatchSpecifier::SafeRegexMatch(regex_matcher(regex)),
        HeaderMatchKind::Prefix(prefix) => HeaderMatchSpecifier::PrefixMatch(prefix.clone()),
        HeaderMatchKind::Suffix(suffix) => HeaderMatchSpecifier::SuffixMatch(suffix.clone()),
        HeaderMatchKind::Present => HeaderMatchSpecifier::PresentMatch(true),
    };

    HeaderMatcher {
        name: header_match.name.clone(),
        header_match_specifier: Some(specifier),
        invert_match: header_match.invert_match,
        ..Default::default()
    }
}

/// Method tokens are joined verbatim; they are assumed to be regex-safe.
#[allow(deprecated)]
fn method_header_matcher(methods: &[String]) -> HeaderMatcher {
    HeaderMatcher {
        name: METHOD_PSEUDO_HEADER.to_string(),
        header_match_specifier: Some(HeaderMatchSpecifier::SafeRegexMatch(regex_matcher(
            &methods.join("|"),
        ))),
        ..Default::default()
    }
}

pub fn to_envoy_query_parameter_matcher(query_match: &QueryParameterMatch) -> QueryParameterMatcher {
    let specifier = match &query_match.kind {
        QueryParameterMatchKind::Exact(value) => {
            QueryParameterMatchSpecifier::StringMatch(StringMatcher {
                match_pattern: Some(MatchPattern::Exact(value.clone())),
                ..Default::default()
            })
        }
        QueryParameterMatchKind::Regex(regex) => {
            QueryParameterMatchSpecifier::StringMatch(StringMatcher {
                match_pattern: Some(MatchPattern::SafeRegex(regex_matcher(regex))),
                ..Default::default()
            })
        }
        QueryParameterMatchKind::Present => QueryParameterMatchSpecifier::PresentMatch(true),
    };

    QueryParameterMatcher {
        name: query_match.name.clone(),
        query_parameter_match_specifier: Some(specifier),
        ..Default::default()
    }
}
