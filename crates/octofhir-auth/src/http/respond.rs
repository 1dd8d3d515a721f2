//! `IntoResponse` for authorization response deliveries.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::http::form_post::render_form_post;
use crate::oauth::Delivery;

impl IntoResponse for Delivery {
    fn into_response(self) -> Response {
        let mut response = match self {
            Delivery::Redirect { location } => match HeaderValue::from_str(&location) {
                Ok(location) => {
                    (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
                }
                // Url output is always a valid header value
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            },
            Delivery::FormPost { action, fields } => {
                Html(render_form_post(&action, fields.iter())).into_response()
            }
        };

        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::ResponseParameters;

    #[test]
    fn test_redirect_response() {
        let response = Delivery::Redirect {
            location: "https://app.example.com/cb?code=xyz".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://app.example.com/cb?code=xyz"
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }

    #[test]
    fn test_form_post_response() {
        let response = Delivery::FormPost {
            action: "https://app.example.com/cb".to_string(),
            fields: ResponseParameters::new().with("code", "xyz"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }
}
