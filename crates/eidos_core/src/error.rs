//! Engine-boundary error taxonomy.
//!
//! Reads inside the engine prefer empty defaults over errors; this enum is
//! for the cases that must be surfaced: direct-by-id lookups that miss,
//! malformed imports, and failures from the persistence or completion
//! collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A direct lookup (user, profile, memory node) found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller-supplied data failed to parse or validate.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The persistence or completion collaborator failed.
    #[error("upstream failure: {0}")]
    Upstream(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = EngineError::NotFound("profile for user u1".to_string());
        assert_eq!(err.to_string(), "not found: profile for user u1");

        let err = EngineError::Malformed("not valid JSON".to_string());
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_upstream_wraps_anyhow() {
        let inner = anyhow::anyhow!("connection reset");
        let err = EngineError::from(inner);
        assert!(err.to_string().contains("connection reset"));
    }
}
