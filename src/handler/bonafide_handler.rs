use crate::dto::bonafide_dto::{
    CreateBonafideRequest, DecisionRequest, DecisionResponse, MessageResponse,
    RequestListResponse, RequestResponse, StatsResponse, SubmitResponse, UpdateBonafideRequest,
};
use crate::model::bonafide_request::RequestStatus;
use crate::service::bonafide_service::{actor_id, BonafideService, BonafideServiceImpl};
use crate::util::error::{validation_messages, HandlerError};
use crate::util::jwt::Claims;
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension,
};
use bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

fn parse_request_id(id: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(id).map_err(|_| HandlerError::bad_request("Invalid request id"))
}

pub async fn submit_request_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBonafideRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::validation(validation_messages(&e)));
    }
    let owner = actor_id(&claims)?;
    let request = service.submit(owner, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            message: "Bonafide request submitted successfully".to_string(),
            request,
        }),
    ))
}

pub async fn my_requests_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let owner = actor_id(&claims)?;
    let requests = service.my_requests(owner).await?;
    Ok(Json(RequestListResponse {
        success: true,
        count: requests.len(),
        requests,
    }))
}

pub async fn all_requests_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HandlerError> {
    let status = match params.get("status") {
        Some(raw) => Some(
            raw.parse::<RequestStatus>()
                .map_err(HandlerError::bad_request)?,
        ),
        None => None,
    };
    let requests = service.all_requests(status).await?;
    Ok(Json(RequestListResponse {
        success: true,
        count: requests.len(),
        requests,
    }))
}

pub async fn get_request_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_request_id(&id)?;
    let request = service.get_request(id, &claims).await?;
    Ok(Json(RequestResponse {
        success: true,
        request,
    }))
}

pub async fn update_request_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<UpdateBonafideRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_request_id(&id)?;
    let request = service.update_request(id, &claims, payload).await?;
    Ok(Json(SubmitResponse {
        success: true,
        message: "Request updated successfully".to_string(),
        request,
    }))
}

pub async fn approve_request_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_request_id(&id)?;
    let admin = actor_id(&claims)?;
    let request = service
        .approve(id, admin, payload.admin_notes.unwrap_or_default())
        .await?;
    Ok(Json(DecisionResponse {
        success: true,
        message: "Request approved successfully".to_string(),
        request,
    }))
}

pub async fn reject_request_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_request_id(&id)?;
    let admin = actor_id(&claims)?;
    let request = service
        .reject(id, admin, payload.admin_notes.unwrap_or_default())
        .await?;
    Ok(Json(DecisionResponse {
        success: true,
        message: "Request rejected".to_string(),
        request,
    }))
}

pub async fn delete_request_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_request_id(&id)?;
    service.delete_request(id, &claims).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Request deleted successfully".to_string(),
    }))
}

pub async fn certificate_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_request_id(&id)?;
    let document = service.render_certificate(id, &claims).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"Bonafide_Certificate.txt\"",
            ),
        ],
        document,
    ))
}

pub async fn stats_handler(
    State(service): State<Arc<BonafideServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let stats = service.stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}
