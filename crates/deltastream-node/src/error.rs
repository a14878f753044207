//! Error types for the node binary.
//!
//! [`NodeError`] is the top-level error type that wraps all possible
//! failure modes during node startup and serving.

/// Top-level error for the node binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: deltastream_core::ConfigError,
    },

    /// The engine refused to initialize the event bridge.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: deltastream_core::EngineError,
    },

    /// The gateway failed to bind or serve.
    #[error("gateway error: {source}")]
    Gateway {
        /// The underlying server error.
        #[from]
        source: deltastream_gateway::ServerError,
    },
}
