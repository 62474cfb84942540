#![allow(deprecated)]

use envoy_types::pb::envoy::config::cluster::v3::Cluster;
use envoy_types::pb::envoy::config::route::v3::{route::Action, route_action::ClusterSpecifier};
use envoy_types::pb::google::protobuf::UInt32Value;
use meshroute::domain::{
    AppendAction, Header, HeaderMutation, Route, RouteDestination, RouteMatch, RouteRule,
    VirtualHost, WeightedCluster,
};
use meshroute::xds::{ResourceMap, RouteTranslator};
use meshroute::Result;
use proptest::prelude::*;

fn echo_registry(name: &str) -> Result<Vec<Cluster>> {
    Ok(vec![Cluster { name: name.to_string(), ..Default::default() }])
}

fn weighted_route(weights: &[u32]) -> Route {
    let clusters = weights
        .iter()
        .enumerate()
        .map(|(i, weight)| WeightedCluster::new(format!("backend-{}", i), *weight))
        .collect();

    Route {
        name: "weighted".into(),
        virtual_hosts: vec![VirtualHost {
            name: "vh".into(),
            domains: vec!["*".into()],
            route_rules: vec![RouteRule {
                route_match: RouteMatch::prefix("/"),
                destination: RouteDestination::weighted(clusters),
                header_mutations: Vec::new(),
            }],
            header_mutations: Vec::new(),
        }],
    }
}

fn append_action() -> impl Strategy<Value = AppendAction> {
    prop_oneof![
        Just(AppendAction::Unspecified),
        Just(AppendAction::AppendIfExistsOrAdd),
        Just(AppendAction::OverwriteIfExistsOrAdd),
    ]
}

fn arbitrary_route() -> impl Strategy<Value = Route> {
    let rule = (
        "/[a-z]{0,8}",
        prop::collection::vec("[A-Z]{3,6}", 0..3),
        prop::collection::vec(("[a-z]{1,6}", 0u32..5000), 1..4),
        prop::option::of(("x-[a-z]{1,6}", "[a-z0-9]{0,6}", append_action())),
    )
        .prop_map(|(prefix, methods, weights, header)| {
            let mut route_match = RouteMatch::prefix(prefix);
            route_match.method_matches = methods;

            let destination = if weights.len() == 1 {
                RouteDestination::cluster(weights[0].0.clone())
            } else {
                RouteDestination::weighted(
                    weights.into_iter().map(|(name, w)| WeightedCluster::new(name, w)).collect(),
                )
            };

            let header_mutations = header
                .map(|(key, value, append_action)| {
                    vec![HeaderMutation::RequestHeaderAdd {
                        header: Header::new(key, value),
                        append_action,
                    }]
                })
                .unwrap_or_default();

            RouteRule { route_match, destination, header_mutations }
        });

    let virtual_host = (
        "[a-z]{1,8}",
        prop::collection::vec("[a-z.*]{1,12}", 0..3),
        prop::collection::vec(rule, 0..4),
    )
        .prop_map(|(name, domains, route_rules)| VirtualHost {
            name,
            domains,
            route_rules,
            header_mutations: Vec::new(),
        });

    ("[a-z0-9-]{1,16}", prop::collection::vec(virtual_host, 0..3))
        .prop_map(|(name, virtual_hosts)| Route { name, virtual_hosts })
}

proptest! {
    #[test]
    fn translation_is_idempotent(route in arbitrary_route()) {
        let translator = RouteTranslator::new(&echo_registry);

        let mut first_resources = ResourceMap::new();
        let mut second_resources = ResourceMap::new();
        let first = translator.translate(&route, &mut first_resources).unwrap();
        let second = translator.translate(&route, &mut second_resources).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_resources, second_resources);
    }

    #[test]
    fn structure_is_preserved(route in arbitrary_route()) {
        let translator = RouteTranslator::new(&echo_registry);
        let config = translator.translate(&route, &mut ResourceMap::new()).unwrap();

        prop_assert_eq!(&config.name, &route.name);
        prop_assert_eq!(config.virtual_hosts.len(), route.virtual_hosts.len());
        for (envoy, domain) in config.virtual_hosts.iter().zip(&route.virtual_hosts) {
            prop_assert_eq!(&envoy.name, &domain.name);
            prop_assert_eq!(&envoy.domains, &domain.domains);
            prop_assert_eq!(envoy.routes.len(), domain.route_rules.len());
        }
    }

    #[test]
    fn total_weight_set_only_for_ten_thousand(weights in prop::collection::vec(0u32..6000, 1..5)) {
        let translator = RouteTranslator::new(&echo_registry);
        let config = translator.translate(&weighted_route(&weights), &mut ResourceMap::new()).unwrap();

        let action = match &config.virtual_hosts[0].routes[0].action {
            Some(Action::Route(action)) => action.clone(),
            other => panic!("expected route action, got {:?}", other),
        };
        let total_weight = match action.cluster_specifier {
            Some(ClusterSpecifier::WeightedClusters(weighted)) => weighted.total_weight,
            other => panic!("expected weighted clusters, got {:?}", other),
        };

        let sum: u64 = weights.iter().map(|w| u64::from(*w)).sum();
        if sum == 10_000 {
            prop_assert_eq!(total_weight, Some(UInt32Value { value: 10_000 }));
        } else {
            prop_assert_eq!(total_weight, None);
        }
    }

    #[test]
    fn weights_splitting_ten_thousand_set_total_weight(split in 0u32..=10_000) {
        let translator = RouteTranslator::new(&echo_registry);
        let config = translator
            .translate(&weighted_route(&[split, 10_000 - split]), &mut ResourceMap::new())
            .unwrap();

        match &config.virtual_hosts[0].routes[0].action {
            Some(Action::Route(action)) => match &action.cluster_specifier {
                Some(ClusterSpecifier::WeightedClusters(weighted)) => {
                    prop_assert_eq!(weighted.total_weight.clone(), Some(UInt32Value { value: 10_000 }));
                }
                other => panic!("expected weighted clusters, got {:?}", other),
            },
            other => panic!("expected route action, got {:?}", other),
        }
    }
}
