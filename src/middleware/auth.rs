use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::json;

use crate::AppState;

/// Marker inserted into request extensions once admin credentials are verified.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub String);

enum Credentials {
    Bearer(String),
    Basic(String, String),
}

fn unauthorized(error: &str, challenge: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, challenge)],
        Json(json!({ "error": error })),
    )
        .into_response()
}

/// Decodes the payload of a `Basic` authorization header into `(user, password)`.
pub fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let raw = BASE64.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(raw).ok()?;
    let (user, password) = text.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn credentials(headers: &HeaderMap) -> Result<Credentials, &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing_authorization")?
        .to_str()
        .map_err(|_| "bad_authorization")?;

    if let Some(token) = value.strip_prefix("Bearer ") {
        return Ok(Credentials::Bearer(token.trim().to_string()));
    }
    if let Some(encoded) = value.strip_prefix("Basic ") {
        let (user, password) = decode_basic(encoded).ok_or("bad_authorization")?;
        return Ok(Credentials::Basic(user, password));
    }
    Err("unsupported_scheme")
}

/// Admin endpoints: HTTP Basic against the configured admin identity.
pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match credentials(req.headers()) {
        Ok(Credentials::Basic(user, password)) => {
            if !state.auth_service.verify_admin(&user, &password) {
                tracing::warn!("admin authentication rejected");
                return unauthorized("Incorrect email or password", "Basic");
            }
            req.extensions_mut().insert(AdminIdentity(user));
            next.run(req).await
        }
        Ok(Credentials::Bearer(_)) => unauthorized("unsupported_scheme", "Basic"),
        Err(error) => unauthorized(error, "Basic"),
    }
}

/// Session endpoints: a valid, unexpired bearer token. Inserts the token `Claims`.
pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match credentials(req.headers()) {
        Ok(Credentials::Bearer(token)) => match state.auth_service.verify_session_token(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                next.run(req).await
            }
            Err(_) => unauthorized("invalid_token", "Bearer"),
        },
        Ok(Credentials::Basic(..)) => unauthorized("unsupported_scheme", "Bearer"),
        Err(error) => unauthorized(error, "Bearer"),
    }
}

/// Read-only endpoints shared by salespeople and administrators.
pub async fn require_user_or_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match credentials(req.headers()) {
        Ok(Credentials::Bearer(token)) => match state.auth_service.verify_session_token(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                next.run(req).await
            }
            Err(_) => unauthorized("invalid_token", "Bearer"),
        },
        Ok(Credentials::Basic(user, password)) => {
            if !state.auth_service.verify_admin(&user, &password) {
                return unauthorized("Incorrect email or password", "Basic");
            }
            req.extensions_mut().insert(AdminIdentity(user));
            next.run(req).await
        }
        Err(error) => unauthorized(error, "Bearer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_payload_splits_on_first_colon() {
        let encoded = BASE64.encode("admin@example.com:pa:ss");
        assert_eq!(
            decode_basic(&encoded),
            Some(("admin@example.com".to_string(), "pa:ss".to_string()))
        );
    }

    #[test]
    fn basic_payload_without_colon_is_rejected() {
        assert_eq!(decode_basic(&BASE64.encode("nocolon")), None);
        assert_eq!(decode_basic("%%%not-base64"), None);
    }

    #[test]
    fn scheme_is_detected() {
        let mut headers = HeaderMap::new();
        assert!(matches!(credentials(&headers), Err("missing_authorization")));

        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert!(matches!(credentials(&headers), Ok(Credentials::Bearer(t)) if t == "abc.def"));

        headers.insert(header::AUTHORIZATION, "Digest xyz".parse().unwrap());
        assert!(matches!(credentials(&headers), Err("unsupported_scheme")));
    }
}
