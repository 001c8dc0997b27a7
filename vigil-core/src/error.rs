use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Business errors raised by the guard and its callers.
///
/// These are always recoverable: the login boundary should translate them
/// into a generic failure response (redirect or 429-style), using the same
/// user-visible message as an ordinary bad-credential failure so an attacker
/// cannot distinguish "wrong password", "locked", and "rate limited".
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Too many login attempts")]
    TooManyAttempts,

    #[error("Account is locked")]
    AccountLocked,
}

/// Infrastructure errors from the ledger or lock storage.
///
/// These are not recoverable locally and propagate unchanged to the request
/// boundary. The pre-auth gate fails closed: a storage error is never treated
/// as approval.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Record not found")]
    NotFound,
}

impl Error {
    /// Whether this is a recoverable business error raised by the guard.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::Auth(AuthError::TooManyAttempts) | Error::Auth(AuthError::AccountLocked)
        )
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let auth_error = Error::Auth(AuthError::TooManyAttempts);
        assert_eq!(
            auth_error.to_string(),
            "Authentication error: Too many login attempts"
        );

        let locked_error = Error::Auth(AuthError::AccountLocked);
        assert_eq!(
            locked_error.to_string(),
            "Authentication error: Account is locked"
        );

        let storage_error = Error::Storage(StorageError::NotFound);
        assert_eq!(storage_error.to_string(), "Storage error: Record not found");
    }

    #[test]
    fn test_is_auth_error() {
        assert!(Error::Auth(AuthError::TooManyAttempts).is_auth_error());
        assert!(Error::Auth(AuthError::AccountLocked).is_auth_error());
        assert!(!Error::Storage(StorageError::NotFound).is_auth_error());
    }

    #[test]
    fn test_is_storage_error() {
        assert!(Error::Storage(StorageError::Database("oops".to_string())).is_storage_error());
        assert!(!Error::Auth(AuthError::TooManyAttempts).is_storage_error());
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = AuthError::TooManyAttempts.into();
        assert!(matches!(error, Error::Auth(AuthError::TooManyAttempts)));

        let error: Error = StorageError::Connection("refused".to_string()).into();
        assert!(matches!(
            error,
            Error::Storage(StorageError::Connection(_))
        ));
    }
}
