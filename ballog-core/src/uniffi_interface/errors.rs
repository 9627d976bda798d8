use thiserror::Error as ThisError;
use uniffi::Error;

use crate::error::{AccountError, CalendarError};

#[derive(Debug, ThisError, Error)]
#[non_exhaustive]
pub enum BallogError {
    #[error("error: {0}")]
    Common(String),
}

impl From<AccountError> for BallogError {
    fn from(e: AccountError) -> Self {
        BallogError::Common(e.to_string())
    }
}

impl From<CalendarError> for BallogError {
    fn from(e: CalendarError) -> Self {
        BallogError::Common(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_message() {
        let BallogError::Common(msg) = BallogError::from(AccountError::InvalidUsername);
        assert_eq!(msg, AccountError::InvalidUsername.to_string());

        let invalid = CalendarError::InvalidMonth {
            year: 2024,
            month: 13,
        };
        let BallogError::Common(msg) = BallogError::from(invalid.clone());
        assert_eq!(msg, invalid.to_string());
    }
}
