use crate::util::error::HandlerError;
use crate::util::jwt::{Claims, JwtTokenUtils, JwtTokenUtilsImpl};
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;

pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

/// Validate the Bearer access token on a request and return its claims.
pub(crate) fn authenticate(
    jwt_utils: &JwtTokenUtilsImpl,
    req: &Request<Body>,
) -> Result<Claims, HandlerError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("Missing authorization header"))?;

    let token = jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| HandlerError::unauthorized("Invalid authorization header"))?;

    jwt_utils
        .validate_access_token(&token)
        .map_err(|_| HandlerError::unauthorized("Invalid or expired token"))
}

/// Gate for routes any authenticated user may call. The validated claims are
/// attached to request extensions for the handler.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = authenticate(&state.jwt_utils, &req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
