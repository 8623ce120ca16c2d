use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a bonafide request. Pending is the only initial state;
/// approved and rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("Invalid status value: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonafideRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Owning user; always taken from the authenticated session at creation.
    pub user_id: ObjectId,
    pub student_name: String,
    pub roll_number: String,
    pub father_name: String,
    pub department: String,
    pub course: String,
    pub academic_year: String,
    pub date_of_birth: String,
    pub purpose: String,
    pub conduct: String,
    pub status: RequestStatus,
    pub admin_notes: String,
    pub approved_by: Option<ObjectId>,
    pub approved_at: Option<String>,
    pub pdf_generated: bool,
    /// Optimistic-concurrency token, incremented on every write.
    pub version: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Allow-list for request updates: the student-supplied fields plus admin
/// notes. Status, approval stamps and ownership are not representable here;
/// decisions go through the dedicated transition instead.
#[derive(Debug, Clone, Default)]
pub struct BonafideUpdate {
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

/// An admin's decision on a pending request. Both outcomes stamp the acting
/// admin and the decision time.
#[derive(Debug, Clone)]
pub struct Decision {
    pub status: RequestStatus,
    pub admin_id: ObjectId,
    pub notes: String,
}
