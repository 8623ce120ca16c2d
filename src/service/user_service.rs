use crate::model::user::{User, UserRole, UserUpdate};
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// Client-facing projection of an account; the password hash is not
/// representable here.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub roll_number: String,
    pub department: String,
    pub course: String,
    pub father_name: String,
    pub date_of_birth: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            roll_number: user.roll_number,
            department: user.department,
            course: user.course,
            father_name: user.father_name,
            date_of_birth: user.date_of_birth,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct UserAuthResponse {
    pub user: UserProfile,
    pub tokens: AuthTokens,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, user: User, password: String) -> Result<UserAuthResponse, ServiceError>;
    async fn login(&self, email: String, password: String) -> Result<UserAuthResponse, ServiceError>;
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthTokens, ServiceError>;
    async fn get_profile(&self, user_id: ObjectId) -> Result<UserProfile, ServiceError>;
    async fn update_profile(
        &self,
        user_id: ObjectId,
        update: UserUpdate,
    ) -> Result<UserProfile, ServiceError>;
    async fn delete_user(&self, user_id: ObjectId) -> Result<(), ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt_utils: Arc<JwtTokenUtilsImpl>) -> Self {
        Self {
            user_repo,
            jwt_utils,
        }
    }

    fn token_pair_for(&self, user: &User) -> Result<AuthTokens, ServiceError> {
        let tokens = self
            .jwt_utils
            .generate_token_pair(
                &user.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
                &user.email,
                user.role.as_str(),
            )
            .map_err(|e| ServiceError::Internal(format!("JWT error: {}", e)))?;
        Ok(AuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        })
    }
}

/// Canonical form of an account email: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, user, password), fields(email = %user.email))]
    async fn register(
        &self,
        mut user: User,
        password: String,
    ) -> Result<UserAuthResponse, ServiceError> {
        info!("Registering new user");
        user.name = user.name.trim().to_string();
        user.email = normalize_email(&user.email);

        // Friendly pre-check; the unique index is the actual guarantee and a
        // lost race still surfaces as Conflict from the insert below.
        if self.user_repo.find_by_email(&user.email).await?.is_some() {
            warn!("Registration attempted with existing email");
            return Err(ServiceError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }

        let hash = PasswordUtilsImpl::hash_password(&password)
            .map_err(|e| ServiceError::Internal(format!("Password hash error: {}", e)))?;
        user.password_hash = hash;

        let inserted = match self.user_repo.insert(user).await {
            Ok(u) => u,
            Err(e) => {
                error!("Failed to insert user: {e}");
                return Err(e.into());
            }
        };
        let tokens = self.token_pair_for(&inserted)?;
        info!("User registered successfully");
        Ok(UserAuthResponse {
            user: inserted.into(),
            tokens,
        })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> Result<UserAuthResponse, ServiceError> {
        info!("User login attempt");
        let user = self
            .user_repo
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        // Fails closed: a verification error counts as not authenticated.
        let valid = PasswordUtilsImpl::verify_password(&password, &user.password_hash)
            .unwrap_or(false);
        if !valid {
            warn!("Invalid credentials for user: {}", email);
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }

        let tokens = self.token_pair_for(&user)?;
        info!("User logged in successfully");
        Ok(UserAuthResponse {
            user: user.into(),
            tokens,
        })
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthTokens, ServiceError> {
        let claims = self
            .jwt_utils
            .validate_refresh_token(&refresh_token)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid refresh token: {}", e)))?;
        let tokens = self
            .jwt_utils
            .generate_token_pair(&claims.sub, &claims.email, &claims.role)
            .map_err(|e| ServiceError::Internal(format!("JWT error: {}", e)))?;
        Ok(AuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        })
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn get_profile(&self, user_id: ObjectId) -> Result<UserProfile, ServiceError> {
        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }

    #[instrument(skip(self, update), fields(user_id = %user_id))]
    async fn update_profile(
        &self,
        user_id: ObjectId,
        update: UserUpdate,
    ) -> Result<UserProfile, ServiceError> {
        info!("Updating user profile");
        let updated = self.user_repo.update(user_id, update).await?;
        Ok(updated.into())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn delete_user(&self, user_id: ObjectId) -> Result<(), ServiceError> {
        info!("Deleting user");
        self.user_repo.delete(user_id).await?;
        Ok(())
    }
}
