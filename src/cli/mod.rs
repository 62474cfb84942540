//! # Command Line Interface
//!
//! `meshroute render` translates a mesh snapshot into Envoy resources;
//! `meshroute validate` only checks that a snapshot parses.

pub mod output;
pub mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{Config, LogFormat};
use crate::domain::MeshSnapshot;
use crate::observability::{init_logging, log_config_info};
use output::OutputFormat;
use render::RenderArgs;

#[derive(Parser, Debug)]
#[command(name = "meshroute")]
#[command(about = "Render service-mesh routes into Envoy xDS resources")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format (text or json); overrides MESHROUTE_LOG_FORMAT
    #[arg(long, global = true, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Summary output format (table, json or yaml)
    #[arg(short, long, global = true, default_value = "table")]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate routes and report what was generated
    Render(RenderArgs),

    /// Parse a snapshot and report its size without translating
    Validate {
        /// Snapshot file (.yaml, .yml or .json)
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Debug, Serialize)]
pub struct ValidateSummary {
    pub input: String,
    pub routes: usize,
    pub virtual_hosts: usize,
    pub route_rules: usize,
    pub clusters: usize,
}

/// Run CLI commands
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let mut observability = config.observability;
    if cli.verbose {
        observability = observability.with_log_level("debug")?;
    }
    if let Some(format) = cli.log_format {
        observability = observability.with_log_format(format);
    }

    init_logging(&observability)?;
    log_config_info(&observability);

    match cli.command {
        Commands::Render(args) => {
            let summary = render::render(&args)?;
            output::print_render_summary(&summary, cli.output)?;
            if summary.has_failures() {
                anyhow::bail!("{} route(s) failed to translate", summary.failures.len());
            }
        }
        Commands::Validate { input } => {
            let summary = validate(&input)?;
            output::print_validate_summary(&summary, cli.output)?;
        }
    }

    Ok(())
}

pub fn validate(input: &std::path::Path) -> anyhow::Result<ValidateSummary> {
    let snapshot = MeshSnapshot::from_path(input)
        .with_context(|| format!("Failed to load snapshot {}", input.display()))?;

    let virtual_hosts = snapshot.routes.iter().map(|route| route.virtual_hosts.len()).sum();
    let route_rules = snapshot
        .routes
        .iter()
        .flat_map(|route| &route.virtual_hosts)
        .map(|vh| vh.route_rules.len())
        .sum();

    Ok(ValidateSummary {
        input: input.display().to_string(),
        routes: snapshot.routes.len(),
        virtual_hosts,
        route_rules,
        clusters: snapshot.clusters.len(),
    })
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse().map_err(|e: crate::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_arguments() {
        let cli = Cli::try_parse_from([
            "meshroute",
            "render",
            "--input",
            "mesh.yaml",
            "--out-dir",
            "out",
            "--route",
            "a",
            "--route",
            "b",
            "--verbose",
            "--output",
            "json",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.input, PathBuf::from("mesh.yaml"));
                assert_eq!(args.out_dir, Some(PathBuf::from("out")));
                assert_eq!(args.routes, vec!["a", "b"]);
                assert!(!args.dedup_clusters);
            }
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn test_log_format_flag() {
        let cli =
            Cli::try_parse_from(["meshroute", "--log-format", "json", "validate", "-i", "m.json"])
                .unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));

        assert!(Cli::try_parse_from(["meshroute", "--log-format", "xml", "validate", "-i", "m"])
            .is_err());
    }
}
