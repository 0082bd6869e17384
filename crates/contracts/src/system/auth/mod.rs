use serde::{Deserialize, Serialize};

use crate::domain::a004_user::aggregate::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub access_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub session: Session,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // user_id
    pub sid: String, // session_id
    pub role: Role,
    pub school: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Signed-in context handed to every dashboard operation.
/// Created at login, discarded at logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub role: Role,
    pub school_name: Option<String>,
}

impl Session {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}
