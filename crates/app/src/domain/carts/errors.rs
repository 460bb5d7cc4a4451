//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart or item not found")]
    NotFound,

    #[error("product is out of stock")]
    Unavailable,

    #[error("requested quantity is not available")]
    InvalidQuantity,

    #[error("cart was modified concurrently")]
    Conflict,

    #[error("cart item already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            CartsServiceError::from(Error::RowNotFound),
            CartsServiceError::NotFound
        ));
    }

    #[test]
    fn non_database_errors_map_to_sql() {
        assert!(matches!(
            CartsServiceError::from(Error::PoolTimedOut),
            CartsServiceError::Sql(_)
        ));
    }
}
