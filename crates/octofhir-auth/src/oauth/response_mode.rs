//! Response modes.
//!
//! The response mode selects how authorization response parameters travel
//! back to the client: in the redirect URI query, in its fragment, or in an
//! auto-submitted form. Each has a JWT-secured variant (JARM) where the
//! parameters are wrapped into a single signed `response` parameter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Response mode of an authorization response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseMode {
    /// Parameters in the redirect URI query component.
    #[serde(rename = "query")]
    Query,
    /// Parameters in the redirect URI fragment component.
    #[serde(rename = "fragment")]
    Fragment,
    /// Parameters posted by an auto-submitting HTML form.
    #[serde(rename = "form_post")]
    FormPost,
    /// Signed `response` parameter in the query component.
    #[serde(rename = "query.jwt")]
    QueryJwt,
    /// Signed `response` parameter in the fragment component.
    #[serde(rename = "fragment.jwt")]
    FragmentJwt,
    /// Signed `response` parameter posted by an auto-submitting form.
    #[serde(rename = "form_post.jwt")]
    FormPostJwt,
}

impl ResponseMode {
    /// Every supported response mode.
    pub const ALL: [ResponseMode; 6] = [
        Self::Query,
        Self::Fragment,
        Self::FormPost,
        Self::QueryJwt,
        Self::FragmentJwt,
        Self::FormPostJwt,
    ];

    /// Returns the `response_mode` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Fragment => "fragment",
            Self::FormPost => "form_post",
            Self::QueryJwt => "query.jwt",
            Self::FragmentJwt => "fragment.jwt",
            Self::FormPostJwt => "form_post.jwt",
        }
    }

    /// Returns `true` for JWT-secured modes.
    #[must_use]
    pub fn is_jwt(&self) -> bool {
        matches!(self, Self::QueryJwt | Self::FragmentJwt | Self::FormPostJwt)
    }

    /// Returns the plain encoding underneath a JWT-secured mode.
    #[must_use]
    pub fn encoding(&self) -> ResponseMode {
        match self {
            Self::Query | Self::QueryJwt => Self::Query,
            Self::Fragment | Self::FragmentJwt => Self::Fragment,
            Self::FormPost | Self::FormPostJwt => Self::FormPost,
        }
    }

    /// Returns the JWT-secured variant of this mode.
    #[must_use]
    pub fn secured(&self) -> ResponseMode {
        match self {
            Self::Query | Self::QueryJwt => Self::QueryJwt,
            Self::Fragment | Self::FragmentJwt => Self::FragmentJwt,
            Self::FormPost | Self::FormPostJwt => Self::FormPostJwt,
        }
    }

    /// Default mode for a response type.
    ///
    /// Responses carrying tokens (`token`, `id_token`) never travel in the
    /// query string, so they default to the fragment. Everything else
    /// (`code`, `none`) uses the query.
    #[must_use]
    pub fn default_for(response_type: &str) -> ResponseMode {
        let carries_token = response_type
            .split_whitespace()
            .any(|part| part == "token" || part == "id_token");

        if carries_token {
            Self::Fragment
        } else {
            Self::Query
        }
    }

    /// Resolves the requested `response_mode` against the response type.
    ///
    /// A bare `jwt` selects the JWT-secured variant of the default mode.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRequest` for an unknown mode name.
    pub fn resolve(requested: Option<&str>, response_type: &str) -> Result<ResponseMode, AuthError> {
        match requested {
            None => Ok(Self::default_for(response_type)),
            Some("jwt") => Ok(Self::default_for(response_type).secured()),
            Some(name) => name.parse(),
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResponseMode {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| AuthError::invalid_request(format!("unsupported response_mode '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for mode in ResponseMode::ALL {
            assert_eq!(mode.as_str().parse::<ResponseMode>().unwrap(), mode);
            assert_eq!(mode.to_string(), mode.as_str());

            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn test_unknown_mode() {
        let err = "web_message".parse::<ResponseMode>().unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_request");
    }

    #[test]
    fn test_is_jwt() {
        assert!(!ResponseMode::Query.is_jwt());
        assert!(!ResponseMode::FormPost.is_jwt());
        assert!(ResponseMode::QueryJwt.is_jwt());
        assert!(ResponseMode::FragmentJwt.is_jwt());
        assert!(ResponseMode::FormPostJwt.is_jwt());
    }

    #[test]
    fn test_encoding_and_secured() {
        assert_eq!(ResponseMode::FormPostJwt.encoding(), ResponseMode::FormPost);
        assert_eq!(ResponseMode::Fragment.encoding(), ResponseMode::Fragment);
        assert_eq!(ResponseMode::Query.secured(), ResponseMode::QueryJwt);
    }

    #[test]
    fn test_default_for_response_type() {
        assert_eq!(ResponseMode::default_for("code"), ResponseMode::Query);
        assert_eq!(ResponseMode::default_for("none"), ResponseMode::Query);
        assert_eq!(ResponseMode::default_for("id_token"), ResponseMode::Fragment);
        assert_eq!(
            ResponseMode::default_for("code id_token"),
            ResponseMode::Fragment
        );
        assert_eq!(
            ResponseMode::default_for("code token"),
            ResponseMode::Fragment
        );
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            ResponseMode::resolve(None, "code").unwrap(),
            ResponseMode::Query
        );
        assert_eq!(
            ResponseMode::resolve(Some("jwt"), "code").unwrap(),
            ResponseMode::QueryJwt
        );
        assert_eq!(
            ResponseMode::resolve(Some("jwt"), "code id_token").unwrap(),
            ResponseMode::FragmentJwt
        );
        assert_eq!(
            ResponseMode::resolve(Some("form_post"), "code").unwrap(),
            ResponseMode::FormPost
        );
        assert!(ResponseMode::resolve(Some("bogus"), "code").is_err());
    }
}
