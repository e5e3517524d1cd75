//! Conversions from external infrastructure errors into domain errors.

use pasalista_domain::PasaListaError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PasaListaError);

impl From<InfraError> for PasaListaError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PasaListaError> for InfraError {
    fn from(value: PasaListaError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPasaListaError {
    fn into_pasalista(self) -> PasaListaError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → PasaListaError */
/* -------------------------------------------------------------------------- */

impl IntoPasaListaError for SqlError {
    fn into_pasalista(self) -> PasaListaError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => PasaListaError::Storage("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        PasaListaError::Storage("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        PasaListaError::Storage(format!("constraint violation: {message}"))
                    }
                    _ => PasaListaError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => PasaListaError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                PasaListaError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                PasaListaError::Storage(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => PasaListaError::Storage("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidPath(path) => PasaListaError::Storage(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => PasaListaError::Storage("invalid SQL query".into()),
            other => PasaListaError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_pasalista())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → PasaListaError */
/* -------------------------------------------------------------------------- */

impl IntoPasaListaError for r2d2::Error {
    fn into_pasalista(self) -> PasaListaError {
        PasaListaError::Storage(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_pasalista())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → PasaListaError */
/* -------------------------------------------------------------------------- */

impl IntoPasaListaError for serde_json::Error {
    fn into_pasalista(self) -> PasaListaError {
        PasaListaError::Storage(format!("stored value is not valid JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_pasalista())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PasaListaError */
/* -------------------------------------------------------------------------- */

impl IntoPasaListaError for HttpError {
    fn into_pasalista(self) -> PasaListaError {
        if self.is_timeout() {
            return PasaListaError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return PasaListaError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => PasaListaError::Auth(message),
                404 => PasaListaError::NotFound(message),
                429 => PasaListaError::Network(message),
                400..=499 => PasaListaError::InvalidInput(message),
                _ => PasaListaError::Network(message),
            };
        }

        PasaListaError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_pasalista())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
