//! Result helpers for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Extension helpers for results carrying an [`ErrorEnvelope`].
pub trait ResultExt<T> {
    /// Convert the error into an envelope and attach a metadata entry.
    fn with_metadata(self, key: &str, value: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ErrorEnvelope>,
{
    fn with_metadata(self, key: &str, value: impl Into<String>) -> Result<T> {
        self.map_err(|error| error.into().with_metadata(key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn with_metadata_preserves_ok() {
        let value: Result<i32> = Ok(1);
        assert!(matches!(value.with_metadata("collection", "inputs"), Ok(1)));
    }

    #[test]
    fn with_metadata_annotates_errors() -> std::result::Result<(), &'static str> {
        let value: Result<i32> = Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "bad input",
        ));
        let error = value
            .with_metadata("collection", "inputs")
            .err()
            .ok_or("expected error")?;
        assert_eq!(
            error.metadata.get("collection").map(String::as_str),
            Some("inputs")
        );
        Ok(())
    }
}
