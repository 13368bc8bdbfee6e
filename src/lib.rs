//! Property Ledger is a web app for reviewing the payments, refunds,
//! commissions and withdrawals of a property marketplace.
//!
//! This library provides a REST API that directly serves HTML pages. Each
//! signed-in viewer sees the transactions scoped to their role: admins see
//! every transaction, sellers see their sales and buyers see their purchases.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod timezone;
mod transaction;
mod viewer;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    SQLiteTransactionStore, Transaction, TransactionBuilder, TransactionStatus, TransactionStore,
    TransactionType, create_transaction,
};
pub use viewer::{DEFAULT_COOKIE_DURATION, Role, UserId, Viewer, encode_viewer_cookie};

use crate::{
    alert::Alert,
    internal_server_error::{InternalServerErrorPage, render_internal_server_error},
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The viewer cookie is missing from the cookie jar in the request.
    #[error("no viewer cookie in the cookie jar")]
    CookieMissing,

    /// The viewer cookie could not be decoded or has expired.
    #[error("the viewer cookie is invalid or has expired")]
    InvalidViewer,

    /// There was an error formatting or parsing a date-time value.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not handle date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// A transaction in the store has a type that is not one of payment,
    /// refund, commission or withdrawal.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// A transaction in the store has a status that is not one of completed,
    /// pending or failed.
    #[error("\"{0}\" is not a valid transaction status")]
    InvalidTransactionStatus(String),

    /// A transaction amount was negative or not a finite number.
    #[error("{0} is not a valid transaction amount")]
    InvalidAmount(f64),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The filtered transactions could not be written as CSV.
    #[error("could not export transactions as CSV: {0}")]
    CsvExportError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", error);
        Error::SqlError(error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPage {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn sql_errors_are_kept_as_sql_errors() {
        let error = Error::from(rusqlite::Error::QueryReturnedNoRows);

        assert_eq!(error, Error::SqlError(rusqlite::Error::QueryReturnedNoRows));
    }

    #[test]
    fn sql_error_renders_internal_server_error_page() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn fetch_errors_render_generic_alert() {
        let response = Error::DatabaseLockError.into_alert_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
