use crate::config::InstitutionConfig;
use crate::dto::bonafide_dto::{
    ApproverInfo, BonafideRequestView, CreateBonafideRequest, RequestStats, UpdateBonafideRequest,
    UserInfo,
};
use crate::model::bonafide_request::{BonafideRequest, Decision, RequestStatus};
use crate::model::user::UserRole;
use crate::repository::bonafide_repo::BonafideRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::certificate::{CertificateData, CertificateRenderer};
use crate::util::error::ServiceError;
use crate::util::jwt::Claims;
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[async_trait]
pub trait BonafideService: Send + Sync {
    /// Create a new request for `owner`, always pending. The owner reference
    /// comes from the authenticated session, never from the payload.
    async fn submit(
        &self,
        owner: ObjectId,
        dto: CreateBonafideRequest,
    ) -> Result<BonafideRequest, ServiceError>;
    async fn my_requests(&self, owner: ObjectId) -> Result<Vec<BonafideRequestView>, ServiceError>;
    async fn all_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<BonafideRequestView>, ServiceError>;
    async fn get_request(
        &self,
        id: ObjectId,
        actor: &Claims,
    ) -> Result<BonafideRequestView, ServiceError>;
    async fn update_request(
        &self,
        id: ObjectId,
        actor: &Claims,
        dto: UpdateBonafideRequest,
    ) -> Result<BonafideRequest, ServiceError>;
    async fn approve(
        &self,
        id: ObjectId,
        admin_id: ObjectId,
        notes: String,
    ) -> Result<BonafideRequest, ServiceError>;
    async fn reject(
        &self,
        id: ObjectId,
        admin_id: ObjectId,
        notes: String,
    ) -> Result<BonafideRequest, ServiceError>;
    async fn delete_request(&self, id: ObjectId, actor: &Claims) -> Result<(), ServiceError>;
    /// Render the certificate document for an approved request and mark it
    /// as generated.
    async fn render_certificate(
        &self,
        id: ObjectId,
        actor: &Claims,
    ) -> Result<Vec<u8>, ServiceError>;
    async fn stats(&self) -> Result<RequestStats, ServiceError>;
}

pub struct BonafideServiceImpl {
    pub request_repo: Arc<dyn BonafideRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub renderer: Arc<dyn CertificateRenderer>,
    pub institution: InstitutionConfig,
}

/// The authenticated actor's user id, parsed from the token subject.
pub fn actor_id(claims: &Claims) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(&claims.sub)
        .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))
}

pub fn is_admin(claims: &Claims) -> bool {
    claims.role == UserRole::Admin.as_str()
}

impl BonafideServiceImpl {
    /// Owner-or-admin gate for single-record access.
    fn authorize_record_access(
        &self,
        request: &BonafideRequest,
        actor: &Claims,
        action: &str,
    ) -> Result<(), ServiceError> {
        if is_admin(actor) {
            return Ok(());
        }
        let actor_oid = actor_id(actor)?;
        if request.user_id == actor_oid {
            return Ok(());
        }
        warn!(
            request_id = %request.id.map(|id| id.to_string()).unwrap_or_default(),
            actor = %actor.sub,
            "Unauthorized attempt to {} request", action
        );
        Err(ServiceError::Forbidden(format!(
            "Not authorized to {} this request",
            action
        )))
    }

    /// Explicit join step: resolve owner and approver display info after
    /// fetching the base record.
    async fn attach_info(
        &self,
        request: BonafideRequest,
        include_owner: bool,
    ) -> Result<BonafideRequestView, ServiceError> {
        let user_info = if include_owner {
            self.user_repo
                .find_by_id(&request.user_id)
                .await?
                .map(|user| UserInfo {
                    name: user.name,
                    email: user.email,
                    roll_number: user.roll_number,
                    department: user.department,
                })
        } else {
            None
        };

        let approver_info = match request.approved_by {
            Some(admin_id) => {
                self.user_repo
                    .find_by_id(&admin_id)
                    .await?
                    .map(|admin| ApproverInfo {
                        name: admin.name,
                        email: admin.email,
                    })
            }
            None => None,
        };

        Ok(BonafideRequestView {
            request,
            user_info,
            approver_info,
        })
    }

    async fn attach_info_all(
        &self,
        requests: Vec<BonafideRequest>,
        include_owner: bool,
    ) -> Result<Vec<BonafideRequestView>, ServiceError> {
        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            views.push(self.attach_info(request, include_owner).await?);
        }
        Ok(views)
    }

    async fn decide(
        &self,
        id: ObjectId,
        decision: Decision,
    ) -> Result<BonafideRequest, ServiceError> {
        // Existence check first, so a missing id is NotFound before any
        // state change is attempted.
        self.request_repo.get_by_id(id).await?;
        let decided = self.request_repo.decide(id, decision).await?;
        Ok(decided)
    }
}

#[async_trait]
impl BonafideService for BonafideServiceImpl {
    #[instrument(skip(self, dto), fields(owner = %owner))]
    async fn submit(
        &self,
        owner: ObjectId,
        dto: CreateBonafideRequest,
    ) -> Result<BonafideRequest, ServiceError> {
        info!("Submitting new bonafide request");
        let request = BonafideRequest {
            id: None,
            user_id: owner,
            student_name: dto.student_name.trim().to_string(),
            roll_number: dto.roll_number.trim().to_string(),
            father_name: dto.father_name.trim().to_string(),
            department: dto.department.trim().to_string(),
            course: dto.course.trim().to_string(),
            academic_year: dto.academic_year.trim().to_string(),
            date_of_birth: dto.date_of_birth.trim().to_string(),
            purpose: dto.purpose.trim().to_string(),
            conduct: dto.conduct.trim().to_string(),
            status: RequestStatus::Pending,
            admin_notes: String::new(),
            approved_by: None,
            approved_at: None,
            pdf_generated: false,
            version: 1,
            created_at: None,
            updated_at: None,
        };
        let created = self.request_repo.create(request).await?;
        Ok(created)
    }

    #[instrument(skip(self), fields(owner = %owner))]
    async fn my_requests(&self, owner: ObjectId) -> Result<Vec<BonafideRequestView>, ServiceError> {
        let requests = self.request_repo.find_by_user(owner).await?;
        self.attach_info_all(requests, false).await
    }

    #[instrument(skip(self))]
    async fn all_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<BonafideRequestView>, ServiceError> {
        let requests = match status {
            Some(status) => self.request_repo.find_by_status(status).await?,
            None => self.request_repo.list_all().await?,
        };
        self.attach_info_all(requests, true).await
    }

    #[instrument(skip(self, actor), fields(id = %id, actor = %actor.sub))]
    async fn get_request(
        &self,
        id: ObjectId,
        actor: &Claims,
    ) -> Result<BonafideRequestView, ServiceError> {
        let request = self.request_repo.get_by_id(id).await?;
        self.authorize_record_access(&request, actor, "access")?;
        self.attach_info(request, true).await
    }

    #[instrument(skip(self, actor, dto), fields(id = %id, actor = %actor.sub))]
    async fn update_request(
        &self,
        id: ObjectId,
        actor: &Claims,
        dto: UpdateBonafideRequest,
    ) -> Result<BonafideRequest, ServiceError> {
        let request = self.request_repo.get_by_id(id).await?;
        self.authorize_record_access(&request, actor, "update")?;

        let version = dto.version.ok_or_else(|| {
            ServiceError::Validation(vec!["version is required".to_string()])
        })?;

        let mut update = dto.into_update();
        if !is_admin(actor) {
            // Owners may only revise while the request is undecided, and
            // admin notes are not theirs to write.
            if request.status != RequestStatus::Pending {
                return Err(ServiceError::Conflict(
                    "Request has already been decided".to_string(),
                ));
            }
            update.admin_notes = None;
        }

        let updated = self.request_repo.update(id, version, update).await?;
        info!("Request updated successfully");
        Ok(updated)
    }

    #[instrument(skip(self, notes), fields(id = %id, admin = %admin_id))]
    async fn approve(
        &self,
        id: ObjectId,
        admin_id: ObjectId,
        notes: String,
    ) -> Result<BonafideRequest, ServiceError> {
        info!("Approving bonafide request");
        self.decide(
            id,
            Decision {
                status: RequestStatus::Approved,
                admin_id,
                notes,
            },
        )
        .await
    }

    #[instrument(skip(self, notes), fields(id = %id, admin = %admin_id))]
    async fn reject(
        &self,
        id: ObjectId,
        admin_id: ObjectId,
        notes: String,
    ) -> Result<BonafideRequest, ServiceError> {
        info!("Rejecting bonafide request");
        self.decide(
            id,
            Decision {
                status: RequestStatus::Rejected,
                admin_id,
                notes,
            },
        )
        .await
    }

    #[instrument(skip(self, actor), fields(id = %id, actor = %actor.sub))]
    async fn delete_request(&self, id: ObjectId, actor: &Claims) -> Result<(), ServiceError> {
        let request = self.request_repo.get_by_id(id).await?;
        self.authorize_record_access(&request, actor, "delete")?;
        self.request_repo.delete(id).await?;
        info!("Request deleted");
        Ok(())
    }

    #[instrument(skip(self, actor), fields(id = %id, actor = %actor.sub))]
    async fn render_certificate(
        &self,
        id: ObjectId,
        actor: &Claims,
    ) -> Result<Vec<u8>, ServiceError> {
        let request = self.request_repo.get_by_id(id).await?;
        self.authorize_record_access(&request, actor, "access")?;
        if request.status != RequestStatus::Approved {
            return Err(ServiceError::Conflict(
                "Certificate is only available for approved requests".to_string(),
            ));
        }

        let issue_date = chrono::Utc::now().format("%d/%m/%Y").to_string();
        let data = CertificateData::from_request(&request, issue_date);
        let document = self
            .renderer
            .render(&data, &self.institution)
            .map_err(|e| ServiceError::Internal(format!("Certificate render error: {}", e)))?;

        self.request_repo.set_pdf_generated(id).await?;
        info!("Certificate rendered");
        Ok(document)
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<RequestStats, ServiceError> {
        let total = self.request_repo.count(None).await?;
        let pending = self
            .request_repo
            .count(Some(RequestStatus::Pending))
            .await?;
        let approved = self
            .request_repo
            .count(Some(RequestStatus::Approved))
            .await?;
        let rejected = self
            .request_repo
            .count(Some(RequestStatus::Rejected))
            .await?;
        Ok(RequestStats {
            total,
            pending,
            approved,
            rejected,
        })
    }
}
