use thiserror::Error;

/// Errors raised by the HTTP-backed services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Blank or otherwise unusable user input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Geocoding returned no results for the requested location.
    #[error("no location found for '{location}'")]
    LocationNotFound { location: String },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("failed to parse response from {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The remote API answered, but reported a failure in its payload.
    #[error("{api} API returned {status}: {message}")]
    Api {
        api: &'static str,
        status: String,
        message: String,
    },

    #[error("missing credential: {0}")]
    MissingCredential(String),
}

impl ServiceError {
    /// True for errors caused by what the caller asked for rather than by the transport.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::LocationNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_not_found_is_invalid_argument() {
        let err = ServiceError::LocationNotFound { location: "Nowhere12345".into() };
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("Nowhere12345"));
    }

    #[test]
    fn status_error_is_not_invalid_argument() {
        let err = ServiceError::Status {
            url: "https://example.test".into(),
            status: 500,
            body: "boom".into(),
        };
        assert!(!err.is_invalid_argument());
        assert!(err.to_string().contains("500"));
    }
}
