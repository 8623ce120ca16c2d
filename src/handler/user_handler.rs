use crate::dto::bonafide_dto::{not_blank, MessageResponse};
use crate::model::user::{User, UserRole, UserUpdate};
use crate::service::user_service::{
    AuthTokens, UserAuthResponse, UserProfile, UserService, UserServiceImpl,
};
use crate::util::error::{validation_messages, HandlerError};
use crate::util::jwt::Claims;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Please provide a name"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    // Optional student attributes, stored as empty strings when absent.
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub course: Option<String>,
    pub father_name: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide a password"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    #[validate(length(min = 10, message = "Please provide a refresh token"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub course: Option<String>,
    pub father_name: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserProfile,
    pub tokens: AuthTokens,
}

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub success: bool,
    pub tokens: AuthTokens,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}

impl From<UserAuthResponse> for AuthResponse {
    fn from(res: UserAuthResponse) -> Self {
        AuthResponse {
            success: true,
            user: res.user,
            tokens: res.tokens,
        }
    }
}

fn claims_user_id(claims: &Claims) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(&claims.sub)
        .map_err(|_| HandlerError::unauthorized("Invalid token subject"))
}

pub async fn register_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::validation(validation_messages(&e)));
    }
    let user = User {
        id: None,
        name: payload.name,
        email: payload.email,
        password_hash: String::new(),
        role: UserRole::User,
        roll_number: payload.roll_number.unwrap_or_default(),
        department: payload.department.unwrap_or_default(),
        course: payload.course.unwrap_or_default(),
        father_name: payload.father_name.unwrap_or_default(),
        date_of_birth: payload.date_of_birth.unwrap_or_default(),
        created_at: None,
        updated_at: None,
    };
    let res = service.register(user, payload.password).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(res))))
}

pub async fn login_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::validation(validation_messages(&e)));
    }
    let res = service.login(payload.email, payload.password).await?;
    Ok(Json(AuthResponse::from(res)))
}

pub async fn refresh_token_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::validation(validation_messages(&e)));
    }
    let tokens = service.refresh_token(payload.refresh_token).await?;
    Ok(Json(TokensResponse {
        success: true,
        tokens,
    }))
}

pub async fn me_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let user_id = claims_user_id(&claims)?;
    let user = service.get_profile(user_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}

pub async fn update_profile_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let user_id = claims_user_id(&claims)?;
    let update = UserUpdate {
        name: payload.name.map(|s| s.trim().to_string()),
        roll_number: payload.roll_number.map(|s| s.trim().to_string()),
        department: payload.department.map(|s| s.trim().to_string()),
        course: payload.course.map(|s| s.trim().to_string()),
        father_name: payload.father_name.map(|s| s.trim().to_string()),
        date_of_birth: payload.date_of_birth.map(|s| s.trim().to_string()),
    };
    if update.is_empty() {
        return Err(HandlerError::bad_request("No updatable fields provided"));
    }
    let user = service.update_profile(user_id, update).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}

pub async fn delete_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = ObjectId::parse_str(&id).map_err(|_| HandlerError::bad_request("Invalid user id"))?;
    service.delete_user(id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "User deleted successfully".to_string(),
    }))
}
