use thiserror::Error;

/// Top-level error classes, each mapped to a process exit code
#[derive(Debug, Error)]
pub enum PilotError {
    /// Trigger carried no usable or permitted source URL (exit code 2)
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),
    /// A required destination-page element never appeared (exit code 3)
    #[error("Required element missing: {0}")]
    ElementNotFound(String),
    /// WebDriver connection failed (exit code 4)
    #[error("WebDriver connection failed: {0}")]
    WebDriverFailed(String),
    /// Operation timeout (exit code 5)
    #[error("Operation timed out: {0}")]
    Timeout(String),
    /// Generic error (exit code 1)
    #[error("{0}")]
    Other(anyhow::Error),
}

impl PilotError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PilotError::InvalidTrigger(_) => 2,
            PilotError::ElementNotFound(_) => 3,
            PilotError::WebDriverFailed(_) => 4,
            PilotError::Timeout(_) => 5,
            PilotError::Other(_) => 1,
        }
    }

    /// Best-effort classification of an error bubbled up through `anyhow`.
    pub fn classify(err: anyhow::Error) -> Self {
        let msg = err.to_string();

        if msg.contains("Invalid trigger") || msg.contains("Unsupported browser") {
            PilotError::InvalidTrigger(msg)
        } else if msg.contains("Required element never appeared")
            || msg.contains("Element not found")
        {
            PilotError::ElementNotFound(msg)
        } else if msg.contains("WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            PilotError::WebDriverFailed(msg)
        } else if msg.contains("timeout")
            || msg.contains("timed out")
            || msg.contains("did not finish loading")
        {
            PilotError::Timeout(msg)
        } else {
            PilotError::Other(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_and_exit_codes() {
        let err = PilotError::classify(anyhow::anyhow!(
            "Required element never appeared: button.create-new-button"
        ));
        assert!(matches!(err, PilotError::ElementNotFound(_)));
        assert_eq!(err.exit_code(), 3);

        let err = PilotError::classify(anyhow::anyhow!("geckodriver not found in PATH"));
        assert!(matches!(err, PilotError::WebDriverFailed(_)));
        assert_eq!(err.exit_code(), 4);

        let err = PilotError::classify(anyhow::anyhow!(
            "Destination page did not finish loading within 30s"
        ));
        assert!(matches!(err, PilotError::Timeout(_)));
        assert_eq!(err.exit_code(), 5);

        let err = PilotError::classify(anyhow::anyhow!("something else"));
        assert!(matches!(err, PilotError::Other(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
