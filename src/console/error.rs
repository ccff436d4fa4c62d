//! Console error types
//!
//! Validation problems never reach this type: they are shown as flash
//! messages on the re-rendered form. What remains are failures the operator
//! cannot fix from the form itself.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::store::StoreError;

use super::html::escape_html;

/// Result type for console handlers
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Console error types
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Record store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Session signing failure
    #[error("Session error: {0}")]
    Session(String),
}

impl ConsoleError {
    fn status(&self) -> StatusCode {
        match self {
            ConsoleError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Details go to the log; the page only carries a generic message.
        let message = match status {
            StatusCode::NOT_FOUND => "The requested resource was not found.".to_string(),
            _ => {
                log::error!("Console request failed: {}", self);
                "Something went wrong while handling the request.".to_string()
            }
        };

        let body = format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{code}</title></head>\
             <body><h1>{code}</h1><p>{message}</p></body></html>",
            code = status,
            message = escape_html(&message),
        );

        (status, Html(body)).into_response()
    }
}
