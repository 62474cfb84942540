//! # Error Handling
//!
//! Error types for the meshroute translator, defined with `thiserror`.
//!
//! The per-entity conversions in [`crate::xds`] are total over the input model;
//! the only runtime failures come from loading input, from the cluster
//! registry collaborator, and from encoding generated resources.

/// Custom result type for meshroute operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for meshroute
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot input could not be parsed
    #[error("Serialization error: {context}")]
    Serialization {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The cluster registry has no entry for the requested name
    #[error("Unknown cluster '{name}'")]
    UnknownCluster { name: String },

    /// The cluster registry could not build resources for a known name
    #[error("Cluster registration failed for '{name}': {message}")]
    ClusterRegistration { name: String, message: String },

    /// A route could not be translated; wraps the first failure inside it
    #[error("Failed to translate route '{route}': {source}")]
    Translation {
        route: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new serialization error with the underlying parser error
    pub fn serialization<S, E>(context: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization { context: context.into(), source: Box::new(source) }
    }

    /// Create an unknown-cluster error
    pub fn unknown_cluster<S: Into<String>>(name: S) -> Self {
        Self::UnknownCluster { name: name.into() }
    }

    /// Create a cluster registration error
    pub fn cluster_registration<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::ClusterRegistration { name: name.into(), message: message.into() }
    }

    /// Wrap an error raised while translating the named route
    pub fn translation<S: Into<String>>(route: S, source: Error) -> Self {
        Self::Translation { route: route.into(), source: Box::new(source) }
    }

    /// Name of the route this error belongs to, if it is a route-level failure
    pub fn route_name(&self) -> Option<&str> {
        match self {
            Error::Translation { route, .. } => Some(route),
            _ => None,
        }
    }
}
