use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("{0} is not set")]
    MissingCredential(&'static str),
}

impl RemoteError {
    /// Network failures and non-2xx answers are worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Http { .. } | RemoteError::Status { .. })
    }
}
