use thiserror::Error;

use super::dto::ProviderName;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} API error: {status} {reason}")]
    Status {
        provider: ProviderName,
        status: u16,
        reason: String,
    },
    #[error("{provider} request timed out")]
    Timeout { provider: ProviderName },
    #[error("{provider} returned a malformed payload: {message}")]
    Malformed {
        provider: ProviderName,
        message: String,
    },
    #[error("{provider} GraphQL error: {message}")]
    GraphQl {
        provider: ProviderName,
        message: String,
    },
    #[error("{provider} transport error: {message}")]
    Transport {
        provider: ProviderName,
        message: String,
    },
    #[error("{provider} does not support {capability}")]
    Unsupported {
        provider: ProviderName,
        capability: &'static str,
    },
}

impl ProviderError {
    pub fn from_reqwest(provider: ProviderName, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout { provider }
        } else if err.is_decode() {
            ProviderError::Malformed {
                provider,
                message: err.to_string(),
            }
        } else {
            ProviderError::Transport {
                provider,
                message: err.to_string(),
            }
        }
    }

    pub fn status(provider: ProviderName, status: reqwest::StatusCode) -> Self {
        ProviderError::Status {
            provider,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        }
    }

    pub fn malformed(provider: ProviderName, message: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider,
            message: message.into(),
        }
    }

    /// Configuration errors exclude the provider from a run instead of
    /// counting as a reliability failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::Unsupported { .. })
    }
}
