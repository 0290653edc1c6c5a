//! Fatal application errors.
//!
//! Only conditions that abort a command end up here. Recoverable outcomes
//! (`NoPriceMatch`, exchange-rate fetch failures) are ordinary values owned by
//! the modules that produce them.

/// Configuration problems and unreadable/malformed price sources.
pub const EXIT_DATA_LOAD: u8 = 2;
/// A one-shot quote found no price band for the stone.
pub const EXIT_NO_MATCH: u8 = 3;
/// Terminal / runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Price source missing, malformed, or missing required columns.
    pub fn data_load(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA_LOAD, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_load_errors_use_exit_code_two() {
        let err = AppError::data_load("Missing price source 'round.csv'.");
        assert_eq!(err.exit_code(), EXIT_DATA_LOAD);
        assert_eq!(err.to_string(), "Missing price source 'round.csv'.");
    }
}
