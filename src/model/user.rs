use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Account role. Admins may review any request; users only their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Stored trimmed and lower-cased; unique index enforced at the store.
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    // Student attributes; empty strings when not provided at registration.
    pub roll_number: String,
    pub department: String,
    pub course: String,
    pub father_name: String,
    pub date_of_birth: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Allow-list for profile updates. Password, email and role are not
/// representable here and therefore immutable through the update path.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub course: Option<String>,
    pub father_name: Option<String>,
    pub date_of_birth: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.roll_number.is_none()
            && self.department.is_none()
            && self.course.is_none()
            && self.father_name.is_none()
            && self.date_of_birth.is_none()
    }
}
