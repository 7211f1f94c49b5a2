use thiserror::Error;

/// Failure vocabulary shared by the connection provider and every
/// implementation function.
///
/// The dispatch layer in [`crate::core::dispatch`] is the only place these
/// are converted to user-visible strings; nothing below it formats errors
/// for the client.
#[derive(Debug, Error)]
pub enum AdoError {
    /// Missing or malformed credential/endpoint configuration. Raised before
    /// any network call is attempted.
    #[error("{0}")]
    Configuration(String),

    /// Domain client construction failed, or the remote call failed for a
    /// non-domain-specific reason (auth handshake, transport, malformed body).
    #[error("{0}")]
    Client(String),

    /// A caller-supplied argument failed a local precondition.
    #[error("{0}")]
    Validation(String),

    /// Anything else, including error envelopes returned by Azure DevOps.
    /// Only the message survives across the dispatch boundary.
    #[error("{0}")]
    Unclassified(anyhow::Error),
}

impl AdoError {
    /// An error reported by the remote service itself.
    pub fn remote(message: impl Into<String>) -> Self {
        AdoError::Unclassified(anyhow::anyhow!(message.into()))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AdoError::Validation(message.into())
    }
}

impl From<reqwest::Error> for AdoError {
    fn from(e: reqwest::Error) -> Self {
        AdoError::Client(e.to_string())
    }
}

impl From<anyhow::Error> for AdoError {
    fn from(e: anyhow::Error) -> Self {
        AdoError::Unclassified(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_displays_the_message_only() {
        let e = AdoError::Configuration("AZURE_DEVOPS_PAT is not set".into());
        assert_eq!(e.to_string(), "AZURE_DEVOPS_PAT is not set");

        let e = AdoError::remote("Not found");
        assert_eq!(e.to_string(), "Not found");
    }

    #[test]
    fn it_converts_from_anyhow() {
        let any: anyhow::Error = anyhow::anyhow!("boom");
        let e: AdoError = any.into();
        assert!(matches!(e, AdoError::Unclassified(_)));
        assert_eq!(e.to_string(), "boom");
    }
}
