//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup, the run batch,
//! and report output, so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tradenet_core::config::ConfigError,
    },

    /// A network file could not be loaded.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: tradenet_world::WorldError,
    },

    /// A run failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: tradenet_core::runner::RunnerError,
    },

    /// Averaging the reports failed.
    #[error("report error: {source}")]
    Report {
        /// The underlying report error.
        #[from]
        source: tradenet_core::report::ReportError,
    },

    /// Writing an output file failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing a report failed.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The logging filter could not be built.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
