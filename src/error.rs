use thiserror::Error;

/// Rejection of a mutation before anything was written to the store.
///
/// Persistence helpers return these unwrapped inside `anyhow::Error`, so
/// callers can tell a bad submission apart from a storage failure with
/// `err.downcast_ref::<ValidationError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required.")]
    Missing { field: &'static str },

    #[error("{field} must be at least {min}.")]
    BelowMinimum { field: &'static str, min: i64 },

    #[error("{field} must be a whole number.")]
    NotANumber { field: &'static str },

    #[error("{field} must be a date in YYYY-MM-DD format.")]
    InvalidDate { field: &'static str },

    #[error("{entity} #{id} does not exist.")]
    UnknownReference { entity: &'static str, id: i64 },
}
