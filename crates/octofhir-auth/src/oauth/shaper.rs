//! Authorization response shaping.
//!
//! Post-processing applied to the parameters produced upstream before they
//! are delivered: `state` echo and `iss` injection (RFC 9207).

use crate::oauth::params::ResponseParameters;
use crate::oauth::response_mode::ResponseMode;

/// Applies the response shaping rules in place.
///
/// - A `state` sent by the client is copied verbatim into the response.
/// - `iss` is set to `issuer` unless the response carries an `id_token` or
///   the mode is JWT-secured. Both already carry a signed issuer claim.
///
/// Nothing else is touched.
pub fn shape_response(
    params: &mut ResponseParameters,
    state: Option<&str>,
    response_mode: ResponseMode,
    issuer: &str,
) {
    if let Some(state) = state {
        params.insert("state", state);
    }

    if needs_issuer(params, response_mode) {
        params.insert("iss", issuer);
    }
}

/// Returns `true` if the response should carry a plain `iss` parameter.
#[must_use]
pub fn needs_issuer(params: &ResponseParameters, response_mode: ResponseMode) -> bool {
    !params.contains("id_token") && !response_mode.is_jwt()
}
