use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutyError {
    #[error("location not found: {query}")]
    LocationNotFound { query: String },

    #[error("route not found")]
    RouteNotFound,

    // network, timeout and decode failures from any upstream collaborator
    #[error("upstream transport failure: {0}")]
    Transport(String),

    #[error("fetch failed for {scope}: {source}")]
    PartialFetch {
        scope: String,
        #[source]
        source: Box<RoutyError>,
    },
}

impl RoutyError {
    pub fn partial(scope: impl Into<String>, source: RoutyError) -> Self {
        RoutyError::PartialFetch {
            scope: scope.into(),
            source: Box::new(source),
        }
    }

    /// True when the failure was caused by input the caller can fix.
    pub fn is_client_error(&self) -> bool {
        match self {
            RoutyError::LocationNotFound { .. } => true,
            RoutyError::PartialFetch { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RoutyError {
    fn from(err: reqwest::Error) -> Self {
        RoutyError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for RoutyError {
    fn from(err: serde_json::Error) -> Self {
        RoutyError::Transport(format!("failed to decode response: {}", err))
    }
}
