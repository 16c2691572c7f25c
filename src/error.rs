use thiserror::Error;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("State persistence error: {0}")]
    State(#[from] StateError),
}

/// Errors from the remote ledger node
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Node rejected {command}: {message}")]
    Api { command: String, message: String },

    #[error("Unexpected response shape from {command}: {message}")]
    BadResponse { command: String, message: String },
}

/// Errors from the durable bundle-state store
#[derive(Error, Debug)]
pub enum StateError {
    #[error("IO error on record {record}: {source}")]
    Io {
        record: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record {record}: {source}")]
    Corrupt {
        record: String,
        #[source]
        source: serde_json::Error,
    },
}

impl NodeError {
    /// The marker the node embeds in a promotion rejection when the
    /// referenced anchor has fallen out of the consensus view.
    pub fn is_inconsistent_subtangle(&self) -> bool {
        match self {
            NodeError::Api { message, .. } => message
                .to_ascii_lowercase()
                .contains("inconsistent subtangle"),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Node(NodeError::Http(error))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
