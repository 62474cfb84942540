//! # meshroute
//!
//! Renders a validated service-mesh routing model into Envoy
//! `RouteConfiguration` resources, registering every cluster the routes
//! point at along the way.
//!
//! ## Architecture
//!
//! ```text
//! MeshSnapshot (YAML/JSON) → domain model → RouteTranslator → ResourceMap → Any-encoded xDS
//!                                                 ↓
//!                                          ClusterRegistry
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meshroute::domain::MeshSnapshot;
//! use meshroute::xds::{CatalogClusterRegistry, ResourceMap, RouteTranslator};
//!
//! fn main() -> meshroute::Result<()> {
//!     let snapshot = MeshSnapshot::from_path("mesh.yaml")?;
//!     let registry = CatalogClusterRegistry::new(snapshot.clusters.clone());
//!
//!     let mut resources = ResourceMap::new();
//!     let report = RouteTranslator::new(&registry).translate_all(&snapshot.routes, &mut resources);
//!     report.push_into(&mut resources);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod xds;

// Re-export commonly used types and traits
pub use config::Config;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
