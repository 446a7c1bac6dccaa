use shared::EventFieldError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Caller supplied no identity or no event type.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A read against a collaborator failed. Wraps the original cause.
    #[error("aggregation failed: {0:#}")]
    Aggregation(#[source] anyhow::Error),

    /// An optional collaborator is not configured.
    #[error("{0} is not available")]
    NotAvailable(&'static str),
}

impl EngineError {
    pub fn aggregation(context: &'static str, error: anyhow::Error) -> Self {
        Self::Aggregation(error.context(context))
    }
}

impl From<EventFieldError> for EngineError {
    fn from(error: EventFieldError) -> Self {
        Self::InvalidInput(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_keeps_the_cause_chain() {
        let error = EngineError::aggregation(
            "failed to load event totals",
            anyhow::anyhow!("connection reset"),
        );

        assert_eq!(
            error.to_string(),
            "aggregation failed: failed to load event totals: connection reset"
        );
    }

    #[test]
    fn field_errors_are_invalid_input() {
        let error: EngineError = EventFieldError::MissingEventType.into();
        assert!(matches!(error, EngineError::InvalidInput(_)));
    }
}
