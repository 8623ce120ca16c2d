use crate::model::bonafide_request::{BonafideRequest, BonafideUpdate};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Submission payload: the nine student-supplied fields. Ownership and status
/// are never client-supplied; they come from the session and the lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBonafideRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "studentName is required"))]
    pub student_name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "rollNumber is required"))]
    pub roll_number: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "fatherName is required"))]
    pub father_name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "department is required"))]
    pub department: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "course is required"))]
    pub course: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "academicYear is required"))]
    pub academic_year: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "dateOfBirth is required"))]
    pub date_of_birth: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "purpose is required"))]
    pub purpose: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "conduct is required"))]
    pub conduct: String,
}

/// Update payload: the typed allow-list of mutable fields plus the client's
/// optimistic-concurrency version. Unknown JSON keys are dropped on
/// deserialization, so fields like `userId` can never reach the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBonafideRequest {
    pub version: Option<i64>,
    pub student_name: Option<String>,
    pub roll_number: Option<String>,
    pub father_name: Option<String>,
    pub department: Option<String>,
    pub course: Option<String>,
    pub academic_year: Option<String>,
    pub date_of_birth: Option<String>,
    pub purpose: Option<String>,
    pub conduct: Option<String>,
    pub admin_notes: Option<String>,
}

impl UpdateBonafideRequest {
    pub fn into_update(self) -> BonafideUpdate {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        BonafideUpdate {
            student_name: trim(self.student_name),
            roll_number: trim(self.roll_number),
            father_name: trim(self.father_name),
            department: trim(self.department),
            course: trim(self.course),
            academic_year: trim(self.academic_year),
            date_of_birth: trim(self.date_of_birth),
            purpose: trim(self.purpose),
            conduct: trim(self.conduct),
            admin_notes: trim(self.admin_notes),
        }
    }
}

/// Approve/reject payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// Display info of the owning student, resolved by an explicit join.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub department: String,
}

/// Display info of the deciding admin, resolved by an explicit join.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproverInfo {
    pub name: String,
    pub email: String,
}

/// A request with its resolved display info attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BonafideRequestView {
    #[serde(flatten)]
    pub request: BonafideRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver_info: Option<ApproverInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub request: BonafideRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestListResponse {
    pub success: bool,
    pub count: usize,
    pub requests: Vec<BonafideRequestView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestResponse {
    pub success: bool,
    pub request: BonafideRequestView,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionResponse {
    pub success: bool,
    pub message: String,
    pub request: BonafideRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: RequestStats,
}
