use crate::handler::user_handler::{
    delete_user_handler, login_handler, me_handler, refresh_token_handler, register_handler,
    update_profile_handler,
};
use crate::middlewares::admin_middleware::require_admin;
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::user_service::UserServiceImpl;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

pub fn user_router(service: Arc<UserServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Public routes
    let public = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh-token", post(refresh_token_handler));

    // Routes for any authenticated user
    let authed = Router::new()
        .route("/me", get(me_handler))
        .route("/profile", put(update_profile_handler))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_auth,
        ));

    // Admin-only routes
    let admin = Router::new()
        .route("/users/{id}", delete(delete_user_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public.merge(authed).merge(admin).with_state(service)
}
