//! Store error type.
//!
//! Repositories return [`StoreError`]. Business-rule failures pass through
//! unchanged as [`AppError`]. Driver failures are logged once, here, and leave
//! the crate as an opaque [`AppError::Internal`] carrying only a reference.

use finnit_shared::AppError;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// SQLSTATE / SQLite result codes worth retrying unchanged: serialization
/// failure, deadlock, lock timeout, busy and locked.
const RETRYABLE_CODES: &[&str] = &["40001", "40P01", "55P03", "5", "6"];

/// Error returned by every repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] AppError),

    /// The database failed.
    #[error("Storage failure (reference {reference})")]
    Storage {
        /// Reference logged alongside the driver error.
        reference: Uuid,
        /// Whether the same call may succeed if retried.
        retryable: bool,
        /// Driver error; never shown to callers.
        #[source]
        source: DbErr,
    },
}

impl StoreError {
    /// Shorthand for an ownership-scoped miss.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::Domain(AppError::NotFound(what.into()))
    }

    /// Maps a unique-index violation to `conflict`; anything else stays a
    /// storage failure.
    pub fn unique_or(err: DbErr, conflict: impl FnOnce() -> AppError) -> Self {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            Self::Domain(conflict())
        } else {
            err.into()
        }
    }

    /// The business error, if this is one.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&AppError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::Storage { .. } => None,
        }
    }
}

impl From<DbErr> for StoreError {
    fn from(source: DbErr) -> Self {
        let reference = Uuid::now_v7();
        let retryable = is_retryable(&source);
        tracing::error!(%reference, retryable, error = %source, "storage operation failed");
        Self::Storage {
            reference,
            retryable,
            source,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(err) => err,
            StoreError::Storage {
                reference,
                retryable,
                ..
            } => Self::Internal {
                reference,
                retryable,
            },
        }
    }
}

fn is_retryable(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(inner)) | DbErr::Query(RuntimeErr::SqlxError(inner)) => {
            inner
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| RETRYABLE_CODES.contains(&code.as_ref()))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnAcquireErr;

    #[test]
    fn test_domain_errors_pass_through() {
        let err: StoreError = AppError::NotFound("Goal not found".into()).into();
        assert_eq!(
            AppError::from(err),
            AppError::NotFound("Goal not found".into())
        );
    }

    #[test]
    fn test_storage_error_is_opaque() {
        let err = StoreError::from(DbErr::Custom("relation \"accounts\" missing".into()));
        let StoreError::Storage { reference, retryable, .. } = &err else {
            panic!("expected storage error");
        };
        let (reference, retryable) = (*reference, *retryable);
        assert!(!retryable);

        let app = AppError::from(err);
        assert_eq!(app.reference(), Some(reference));
        assert!(!app.to_string().contains("accounts"));
    }

    #[test]
    fn test_pool_exhaustion_is_retryable() {
        let err = StoreError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert!(AppError::from(err).is_retryable());
    }

    #[test]
    fn test_non_unique_error_is_not_conflict() {
        let err = StoreError::unique_or(DbErr::Custom("boom".into()), || {
            AppError::Conflict("dup".into())
        });
        assert!(err.as_domain().is_none());
    }
}
