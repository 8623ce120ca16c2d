#![allow(dead_code)]

use async_trait::async_trait;
use bonafide_backend::config::{InstitutionConfig, JwtConfig};
use bonafide_backend::middlewares::auth_middleware::AuthState;
use bonafide_backend::model::bonafide_request::{
    BonafideRequest, BonafideUpdate, Decision, RequestStatus,
};
use bonafide_backend::model::user::{User, UserRole, UserUpdate};
use bonafide_backend::repository::bonafide_repo::BonafideRepository;
use bonafide_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use bonafide_backend::repository::user_repo::UserRepository;
use bonafide_backend::router::bonafide_router::bonafide_router;
use bonafide_backend::router::user_router::user_router;
use bonafide_backend::service::bonafide_service::BonafideServiceImpl;
use bonafide_backend::service::user_service::{UserService, UserServiceImpl};
use bonafide_backend::util::certificate::PlainTextCertificateRenderer;
use bonafide_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the Mongo user collection, including the unique
/// email guarantee.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<ObjectId, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists(format!(
                "Duplicate key: {}",
                user.email
            )));
        }
        let id = ObjectId::new();
        user.id = Some(id);
        let now = chrono::Utc::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, update: UserUpdate) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("No user found for ID: {}", id)))?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(roll_number) = update.roll_number {
            user.roll_number = roll_number;
        }
        if let Some(department) = update.department {
            user.department = department;
        }
        if let Some(course) = update.course {
            user.course = course;
        }
        if let Some(father_name) = update.father_name {
            user.father_name = father_name;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            user.date_of_birth = date_of_birth;
        }
        user.updated_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.get(id).cloned())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(format!("No user found for ID: {}", id)))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.users.lock().unwrap().len() as u64)
    }
}

/// In-memory stand-in for the Mongo request collection, including the
/// conditional decision write and the version check.
#[derive(Default)]
pub struct InMemoryBonafideRepository {
    requests: Mutex<HashMap<ObjectId, BonafideRequest>>,
}

fn sorted_desc(mut requests: Vec<BonafideRequest>) -> Vec<BonafideRequest> {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests
}

#[async_trait]
impl BonafideRepository for InMemoryBonafideRepository {
    async fn create(&self, mut request: BonafideRequest) -> RepositoryResult<BonafideRequest> {
        let mut requests = self.requests.lock().unwrap();
        let id = ObjectId::new();
        request.id = Some(id);
        request.version = 1;
        let now = chrono::Utc::now().to_rfc3339();
        request.created_at = Some(now.clone());
        request.updated_at = Some(now);
        requests.insert(id, request.clone());
        Ok(request)
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<BonafideRequest> {
        let requests = self.requests.lock().unwrap();
        requests
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Request not found for ID: {}", id)))
    }

    async fn find_by_user(&self, user_id: ObjectId) -> RepositoryResult<Vec<BonafideRequest>> {
        let requests = self.requests.lock().unwrap();
        Ok(sorted_desc(
            requests
                .values()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_status(
        &self,
        status: RequestStatus,
    ) -> RepositoryResult<Vec<BonafideRequest>> {
        let requests = self.requests.lock().unwrap();
        Ok(sorted_desc(
            requests
                .values()
                .filter(|r| r.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> RepositoryResult<Vec<BonafideRequest>> {
        let requests = self.requests.lock().unwrap();
        Ok(sorted_desc(requests.values().cloned().collect()))
    }

    async fn update(
        &self,
        id: ObjectId,
        expected_version: i64,
        update: BonafideUpdate,
    ) -> RepositoryResult<BonafideRequest> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("Request not found for ID: {}", id)))?;
        if request.version != expected_version {
            return Err(RepositoryError::conflict(format!(
                "Request was modified concurrently (ID: {})",
                id
            )));
        }
        if let Some(student_name) = update.student_name {
            request.student_name = student_name;
        }
        if let Some(roll_number) = update.roll_number {
            request.roll_number = roll_number;
        }
        if let Some(father_name) = update.father_name {
            request.father_name = father_name;
        }
        if let Some(department) = update.department {
            request.department = department;
        }
        if let Some(course) = update.course {
            request.course = course;
        }
        if let Some(academic_year) = update.academic_year {
            request.academic_year = academic_year;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            request.date_of_birth = date_of_birth;
        }
        if let Some(purpose) = update.purpose {
            request.purpose = purpose;
        }
        if let Some(conduct) = update.conduct {
            request.conduct = conduct;
        }
        if let Some(admin_notes) = update.admin_notes {
            request.admin_notes = admin_notes;
        }
        request.version += 1;
        request.updated_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(request.clone())
    }

    async fn decide(&self, id: ObjectId, decision: Decision) -> RepositoryResult<BonafideRequest> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("Request not found for ID: {}", id)))?;
        if request.status != RequestStatus::Pending {
            return Err(RepositoryError::conflict(format!(
                "Request has already been decided (ID: {})",
                id
            )));
        }
        let now = chrono::Utc::now().to_rfc3339();
        request.status = decision.status;
        request.approved_by = Some(decision.admin_id);
        request.approved_at = Some(now.clone());
        request.admin_notes = decision.notes;
        request.updated_at = Some(now);
        request.version += 1;
        Ok(request.clone())
    }

    async fn set_pdf_generated(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(format!("Request not found for ID: {}", id)))?;
        request.pdf_generated = true;
        request.updated_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut requests = self.requests.lock().unwrap();
        requests
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(format!("Request not found for ID: {}", id)))
    }

    async fn count(&self, status: Option<RequestStatus>) -> RepositoryResult<u64> {
        let requests = self.requests.lock().unwrap();
        Ok(match status {
            Some(status) => requests.values().filter(|r| r.status == status).count() as u64,
            None => requests.len() as u64,
        })
    }
}

/// Fully wired services over the in-memory repositories.
pub struct TestEnv {
    pub user_repo: Arc<InMemoryUserRepository>,
    pub request_repo: Arc<InMemoryBonafideRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub auth_state: Arc<AuthState>,
    pub user_service: Arc<UserServiceImpl>,
    pub bonafide_service: Arc<BonafideServiceImpl>,
}

pub fn setup() -> TestEnv {
    let user_repo = Arc::new(InMemoryUserRepository::default());
    let request_repo = Arc::new(InMemoryBonafideRepository::default());
    let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));
    let auth_state = Arc::new(AuthState {
        jwt_utils: jwt_utils.clone(),
    });
    let user_service = Arc::new(UserServiceImpl::new(user_repo.clone(), jwt_utils.clone()));
    let bonafide_service = Arc::new(BonafideServiceImpl {
        request_repo: request_repo.clone(),
        user_repo: user_repo.clone(),
        renderer: Arc::new(PlainTextCertificateRenderer),
        institution: InstitutionConfig::default(),
    });
    TestEnv {
        user_repo,
        request_repo,
        jwt_utils,
        auth_state,
        user_service,
        bonafide_service,
    }
}

impl TestEnv {
    /// Router with the same shape the application serves.
    pub fn app(&self) -> axum::Router {
        axum::Router::new()
            .nest(
                "/api/auth",
                user_router(self.user_service.clone(), self.auth_state.clone()),
            )
            .nest(
                "/api/bonafide",
                bonafide_router(self.bonafide_service.clone(), self.auth_state.clone()),
            )
    }

    /// Register an account through the service and return the stored user.
    pub async fn register_user(&self, name: &str, email: &str, role: UserRole) -> User {
        let user = User {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            role,
            roll_number: "20R01A0501".to_string(),
            department: "CSE".to_string(),
            course: "B.Tech".to_string(),
            father_name: "Suresh Kumar".to_string(),
            date_of_birth: "2002-06-14".to_string(),
            created_at: None,
            updated_at: None,
        };
        let res = self
            .user_service
            .register(user, "changeme123".to_string())
            .await
            .expect("Failed to register test user");
        self.user_repo
            .find_by_id(&res.user.id.expect("registered user has an id"))
            .await
            .unwrap()
            .unwrap()
    }

    pub fn access_token_for(&self, user: &User) -> String {
        self.jwt_utils
            .generate_access_token(
                &user.id.unwrap().to_string(),
                &user.email,
                user.role.as_str(),
            )
            .expect("Failed to generate access token")
    }
}

pub fn sample_request_body() -> serde_json::Value {
    serde_json::json!({
        "studentName": "Ravi Kumar",
        "rollNumber": "20R01A0501",
        "fatherName": "Suresh Kumar",
        "department": "CSE",
        "course": "B.Tech",
        "academicYear": "2023-2024",
        "dateOfBirth": "2002-06-14",
        "purpose": "Passport application",
        "conduct": "Good"
    })
}
