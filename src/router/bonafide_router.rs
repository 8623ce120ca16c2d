use crate::handler::bonafide_handler::{
    all_requests_handler, approve_request_handler, certificate_handler, delete_request_handler,
    get_request_handler, my_requests_handler, reject_request_handler, stats_handler,
    submit_request_handler, update_request_handler,
};
use crate::middlewares::admin_middleware::require_admin;
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::bonafide_service::BonafideServiceImpl;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub fn bonafide_router(service: Arc<BonafideServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Routes for any authenticated user; record-level ownership is enforced
    // in the service.
    let authed = Router::new()
        .route("/request", post(submit_request_handler))
        .route("/my-requests", get(my_requests_handler))
        .route(
            "/request/{id}",
            get(get_request_handler)
                .put(update_request_handler)
                .delete(delete_request_handler),
        )
        .route("/certificate/{id}", get(certificate_handler))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_auth,
        ));

    // Admin-only routes
    let admin = Router::new()
        .route("/all-requests", get(all_requests_handler))
        .route("/approve/{id}", put(approve_request_handler))
        .route("/reject/{id}", put(reject_request_handler))
        .route("/stats", get(stats_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    authed.merge(admin).with_state(service)
}
