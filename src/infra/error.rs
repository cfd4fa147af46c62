use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("database error: {message}")]
    Database { message: String },
    #[error("cache error: {message}")]
    Cache { message: String },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn database(message: impl std::fmt::Display) -> Self {
        Self::Database {
            message: message.to_string(),
        }
    }

    pub fn cache(message: impl std::fmt::Display) -> Self {
        Self::Cache {
            message: message.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
