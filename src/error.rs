use std::time::Duration;

/// The one failure kind a screen can observe. Transport errors, HTTP error
/// statuses, undecodable bodies and timeouts all collapse into it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("fetch failed: {reason}")]
    FetchFailed { reason: String },
}

impl FetchError {
    pub fn timed_out(after: Duration) -> Self {
        FetchError::FetchFailed {
            reason: format!("request timed out after {}s", after.as_secs_f32()),
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            FetchError::FetchFailed { reason } => reason,
        }
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        // Alternate formatting keeps the whole context chain.
        FetchError::FetchFailed {
            reason: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn keeps_context_chain_in_reason() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = err.context("request failed").unwrap_err();
        let fetch = FetchError::from(err);
        assert_eq!(fetch.reason(), "request failed: connection refused");
        assert_eq!(
            fetch.to_string(),
            "fetch failed: request failed: connection refused"
        );
    }

    #[test]
    fn timeout_reason_names_duration() {
        let err = FetchError::timed_out(Duration::from_millis(1500));
        assert_eq!(err.reason(), "request timed out after 1.5s");
    }
}
