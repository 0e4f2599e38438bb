//! Storage error type and its mapping onto the core error.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use faire_sync_core::errors::{DatabaseError, Error};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Query(#[from] DieselError),

    #[error("Connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Writer unavailable: {0}")]
    Writer(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let db_error = match err {
            StorageError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => DatabaseError::UniqueViolation(info.message().to_string()),
            StorageError::Query(DieselError::NotFound) => {
                DatabaseError::QueryFailed("Record not found".to_string())
            }
            StorageError::Query(e) => DatabaseError::QueryFailed(e.to_string()),
            StorageError::Connection(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::Pool(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::Migration(message) => DatabaseError::MigrationFailed(message),
            StorageError::Writer(message) => DatabaseError::Internal(message),
        };
        Error::Database(db_error)
    }
}

/// Error carried through a diesel transaction closure.
///
/// Diesel requires the closure error to absorb `diesel::result::Error`; the
/// core error cannot implement that conversion here, so it is wrapped.
#[derive(Debug)]
pub(crate) enum TransactionError {
    Diesel(DieselError),
    Core(Error),
}

impl From<DieselError> for TransactionError {
    fn from(err: DieselError) -> Self {
        Self::Diesel(err)
    }
}

impl From<TransactionError> for Error {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Diesel(e) => StorageError::from(e).into(),
            TransactionError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_query_failed() {
        let err: Error = StorageError::from(DieselError::NotFound).into();
        assert!(matches!(err, Error::Database(DatabaseError::QueryFailed(_))));
    }

    #[test]
    fn transaction_error_preserves_core_error() {
        let err: Error = TransactionError::Core(Error::validation("bad row")).into();
        assert!(matches!(err, Error::Validation(ref m) if m == "bad row"));
    }
}
