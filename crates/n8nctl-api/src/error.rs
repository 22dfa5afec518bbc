use thiserror::Error;

/// Result type for n8n API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error types for n8n API operations
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no API key configured (pass --api-key, set N8N_API_KEY, or add api_key to the config file)")]
    MissingApiKey,

    /// Non-2xx response from the server. The raw body is kept verbatim.
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let error = ApiError::Api {
            status: 404,
            message: "workflow not found".to_string(),
            body: "{\"message\":\"workflow not found\"}".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP 404: workflow not found");
    }

    #[test]
    fn test_missing_key_mentions_env_var() {
        assert!(ApiError::MissingApiKey.to_string().contains("N8N_API_KEY"));
    }
}
