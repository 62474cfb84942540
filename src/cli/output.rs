//! Output formatting for CLI commands
//!
//! Summaries print as a plain table by default, or as JSON / YAML for
//! scripting.

use anyhow::{Context, Result};
use serde::Serialize;
use std::str::FromStr;

use super::render::RenderSummary;
use super::ValidateSummary;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.",
                s
            ),
        }
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize>(data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
    println!("{}", yaml);
    Ok(())
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

pub fn print_table_header(columns: &[(&str, usize)]) {
    println!();
    let mut header = String::new();
    for (name, width) in columns {
        header.push_str(&format!("{:<width$} ", name, width = width));
    }
    println!("{}", header.trim());

    let total_width: usize = columns.iter().map(|(_, w)| w + 1).sum();
    print_separator(total_width.saturating_sub(1));
}

pub fn print_render_summary(summary: &RenderSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => return print_json(summary),
        OutputFormat::Yaml => return print_yaml(summary),
        OutputFormat::Table => {}
    }

    if !summary.routes.is_empty() {
        print_table_header(&[("ROUTE", 32), ("VHOSTS", 8), ("RULES", 8), ("CLUSTERS", 8)]);
        for route in &summary.routes {
            println!(
                "{:<32} {:<8} {:<8} {:<8}",
                truncate(&route.name, 32),
                route.virtual_hosts,
                route.route_rules,
                route.clusters
            );
        }
    }

    if !summary.failures.is_empty() {
        print_table_header(&[("FAILED ROUTE", 32), ("ERROR", 60)]);
        for failure in &summary.failures {
            println!("{:<32} {}", truncate(&failure.route, 32), failure.error);
        }
    }

    if !summary.written.is_empty() {
        println!();
        println!("Wrote {} resource file(s)", summary.written.len());
    }

    Ok(())
}

pub fn print_validate_summary(summary: &ValidateSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Yaml => print_yaml(summary),
        OutputFormat::Table => {
            println!(
                "{}: {} route(s), {} virtual host(s), {} rule(s), {} catalog cluster(s)",
                summary.input,
                summary.routes,
                summary.virtual_hosts,
                summary.route_rules,
                summary.clusters
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("YAML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_print_json_and_yaml() {
        let data = TestData { name: "test".to_string(), value: 42 };
        assert!(print_json(&data).is_ok());
        assert!(print_yaml(&data).is_ok());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hello", 3), "...");
    }
}
