//! # Database Error Types
//!
//! Error types for storage operations and for the transactional engines.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError (this module) ← spec taxonomy:                            │
//! │       │    Validation / Conflict / NotFound / Storage                  │
//! │       ▼                                                                 │
//! │  ApiError (in apps/server) ← serialized for the client                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cantina_core::ValidationError;
use thiserror::Error;

/// Storage operation errors.
///
/// These wrap sqlx errors and provide categorization the engines rely on
/// (unique violations carry the constraint name, for instance).
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// `field` is the constraint description SQLite reports, e.g.
    /// `sales.idempotency_key`.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation (e.g. deleting a product that is
    /// referenced by historical sale lines).
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True when this error is a unique violation on the named constraint.
    pub fn is_unique_violation_on(&self, needle: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field.contains(needle))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for plain storage operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Engine Error
// =============================================================================

/// Failure taxonomy of the transactional engines.
///
/// - `Validation` is reported before any storage mutation and is never
///   partially applied.
/// - The conflict variants carry the exact wire messages of the cash
///   endpoints.
/// - `Storage` means the whole atomic unit was rolled back; the caller may
///   retry (safe for sale processing only with an idempotency key).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before any storage mutation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A cash session is already open; the open call mutated nothing.
    #[error("Ya existe una caja abierta")]
    RegisterAlreadyOpen,

    /// No open cash session to close.
    #[error("No hay caja abierta")]
    NoOpenRegister,

    /// The referenced entity does not exist; the unit was rolled back.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Opaque storage failure; the whole atomic unit was rolled back.
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Storage(err.into())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_messages_match_wire_contract() {
        assert_eq!(
            EngineError::RegisterAlreadyOpen.to_string(),
            "Ya existe una caja abierta"
        );
        assert_eq!(
            EngineError::NoOpenRegister.to_string(),
            "No hay caja abierta"
        );
    }

    #[test]
    fn test_unique_violation_matcher() {
        let err = DbError::UniqueViolation {
            field: "sales.idempotency_key".to_string(),
            value: "unknown".to_string(),
        };
        assert!(err.is_unique_violation_on("idempotency_key"));
        assert!(!err.is_unique_violation_on("cash_sessions"));
    }

    #[test]
    fn test_validation_wraps_into_engine_error() {
        let err: EngineError = ValidationError::EmptyOrder.into();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
