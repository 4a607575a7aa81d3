use std::time::Duration;

/// How a command is registered when it is submitted.
///
/// Without an identifier every item is unique. `retention` keeps the
/// identifier reserved for that long after the item completes, which lets a
/// burst of identical requests collapse into one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    pub identifier: Option<String>,
    pub reject_if_duplicate: bool,
    pub retention: Duration,
}

impl SubmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tagged with `identifier`, rejected while another item holds it
    pub fn deduplicated(identifier: impl Into<String>, retention: Duration) -> Self {
        Self::new()
            .with_identifier(identifier)
            .reject_duplicates()
            .retain_for(retention)
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn reject_duplicates(mut self) -> Self {
        self.reject_if_duplicate = true;
        self
    }

    pub fn retain_for(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SubmitOptions::new();
        assert!(options.identifier.is_none());
        assert!(!options.reject_if_duplicate);
        assert!(options.retention.is_zero());
    }

    #[test]
    fn test_deduplicated() {
        let options = SubmitOptions::deduplicated("refresh", Duration::from_millis(500));
        assert_eq!(options.identifier.as_deref(), Some("refresh"));
        assert!(options.reject_if_duplicate);
        assert_eq!(options.retention, Duration::from_millis(500));
    }
}
