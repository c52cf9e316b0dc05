//! Provider error types.

/// Errors from the external geocoding and routing providers.
///
/// The lookup facade never sees these: the capability trait impls log the
/// error and degrade to an absent result.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid or missing API credentials
    #[error("unauthorized: check the provider API key")]
    Unauthorized,

    /// Rate limited by the provider
    #[error("rate limited by the provider")]
    RateLimited,

    /// Provider returned an error status
    #[error("provider error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not parse as expected
    #[error("malformed provider response: {message}")]
    Json { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProviderError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "provider error 503: Service Unavailable");

        let err = ProviderError::RateLimited;
        assert_eq!(err.to_string(), "rate limited by the provider");
    }
}
