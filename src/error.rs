use thiserror::Error;

/// Fallback when a failed response has no usable `error`/`detail` field.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Every failure the API client can hand back.
///
/// The variants only exist so the client can tell them apart in logs. Callers
/// get one thing out of this: a message fit for showing to a human. The HTTP
/// status is deliberately not kept around.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response at all. Offline, DNS, connection refused, take your pick.
    #[error("Network error occurred")]
    Network,

    /// The CSRF priming request itself blew up before a mutating call.
    #[error("Failed to get CSRF token")]
    CsrfToken,

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Response { message: String },

    /// A body (ours or theirs) that wouldn't go through serde_json.
    #[error("{message}")]
    Json { message: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Builds a `Response` error from a (possibly unparseable) error body.
    ///
    /// Mirrors `errorData.error || errorData.detail || fallback`, which means
    /// empty strings fall through just like missing fields do.
    pub fn from_body(body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                ["error", "detail"].iter().find_map(|key| {
                    json[*key]
                        .as_str()
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
            })
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());

        ApiError::Response { message }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
