//! Error responses.
//!
//! Client-facing errors go back to the client through its response mode
//! with [`AuthorizationResponder::deliver_error`]. This JSON body is the
//! fallback for when that is not possible: the redirect target is unusable
//! or a server error occurred.
//!
//! [`AuthorizationResponder::deliver_error`]: crate::oauth::AuthorizationResponder::deliver_error

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);

        if self.is_server_error() {
            error!(error = %self, category = %self.category(), "Authorization request failed");
        }

        let body = json!({
            "error": self.oauth_error_code(),
            "error_description": self.description(),
        });

        let mut response = (status, Json(body)).into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}

fn status_code(error: &AuthError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
