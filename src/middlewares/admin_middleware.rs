use crate::middlewares::auth_middleware::{authenticate, AuthState};
use crate::model::user::UserRole;
use crate::util::error::HandlerError;
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;

/// Gate for admin-only routes: a valid token AND the admin role.
pub async fn require_admin(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = authenticate(&state.jwt_utils, &req)?;

    if claims.role != UserRole::Admin.as_str() {
        return Err(HandlerError::forbidden(
            "Not authorized to access this resource",
        ));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
