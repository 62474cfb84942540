//! `meshroute render`: translate a snapshot and optionally write the
//! encoded resources to disk.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::domain::MeshSnapshot;
use crate::xds::{CatalogClusterRegistry, ResourceKind, ResourceMap, RouteTranslator};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Snapshot file (.yaml, .yml or .json)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write each encoded resource to <DIR>/<kind>/<name>.pb
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Only render the named routes (repeatable)
    #[arg(long = "route", value_name = "NAME")]
    pub routes: Vec<String>,

    /// Drop repeated clusters before writing
    #[arg(long)]
    pub dedup_clusters: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct RenderSummary {
    pub routes: Vec<RouteSummary>,
    pub failures: Vec<RouteFailure>,
    pub written: Vec<PathBuf>,
}

impl RenderSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct RouteSummary {
    pub name: String,
    pub virtual_hosts: usize,
    pub route_rules: usize,
    /// Wire clusters the route generated, duplicates included
    pub clusters: usize,
}

#[derive(Debug, Serialize)]
pub struct RouteFailure {
    pub route: String,
    pub error: String,
}

/// Translate the snapshot named by `args`.
///
/// Route failures are collected in the summary rather than returned as
/// errors; only I/O and input problems abort the command.
pub fn render(args: &RenderArgs) -> Result<RenderSummary> {
    let mut snapshot = MeshSnapshot::from_path(&args.input)
        .with_context(|| format!("Failed to load snapshot {}", args.input.display()))?;
    snapshot.retain_routes(&args.routes);

    for name in &args.routes {
        if !snapshot.routes.iter().any(|route| &route.name == name) {
            warn!(route = %name, "Requested route not found in snapshot");
        }
    }

    let registry = CatalogClusterRegistry::new(snapshot.clusters);
    let translator = RouteTranslator::new(&registry);

    let mut resources = ResourceMap::new();
    let mut summary = RenderSummary::default();

    for route in &snapshot.routes {
        let clusters_before = resources.len(ResourceKind::Cluster);
        match translator.translate(route, &mut resources) {
            Ok(route_configuration) => {
                summary.routes.push(RouteSummary {
                    name: route_configuration.name.clone(),
                    virtual_hosts: route_configuration.virtual_hosts.len(),
                    route_rules: route_configuration
                        .virtual_hosts
                        .iter()
                        .map(|vh| vh.routes.len())
                        .sum(),
                    clusters: resources.len(ResourceKind::Cluster) - clusters_before,
                });
                resources.push_route_configuration(route_configuration);
            }
            Err(e) => {
                warn!(route = %route.name, error = %e, "Failed to translate route");
                summary.failures.push(RouteFailure { route: route.name.clone(), error: e.to_string() });
            }
        }
    }

    if args.dedup_clusters {
        resources.dedup_clusters_by_name();
    }

    info!(
        routes = summary.routes.len(),
        failures = summary.failures.len(),
        clusters = resources.len(ResourceKind::Cluster),
        "Rendered snapshot"
    );

    if let Some(out_dir) = &args.out_dir {
        summary.written = write_resources(out_dir, &resources)?;
    }

    Ok(summary)
}

/// Write every resource in `resources` as `<dir>/<kind>/<name>.pb`.
///
/// A repeated name overwrites the earlier file; the last occurrence wins.
pub fn write_resources(out_dir: &Path, resources: &ResourceMap) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (kind, built) in resources.to_built_resources() {
        let kind_dir = out_dir.join(kind.label());
        std::fs::create_dir_all(&kind_dir)
            .with_context(|| format!("Failed to create {}", kind_dir.display()))?;

        for resource in built {
            let path = kind_dir.join(format!("{}.pb", file_stem(&resource.name)));
            std::fs::write(&path, &resource.resource.value)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !written.contains(&path) {
                written.push(path);
            }
        }
    }

    Ok(written)
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c == '\\' || c == '\0' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_replaces_separators() {
        assert_eq!(file_stem("failover-target~0~api"), "failover-target~0~api");
        assert_eq!(file_stem("a/b\\c"), "a_b_c");
    }
}
