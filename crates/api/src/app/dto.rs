use serde::{Deserialize, Serialize};

use bayu_auth::{LoginSuccess, Role};
use bayu_core::{RoleId, SessionLogId, UserId};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role_id: RoleId,
    pub roles: Vec<Role>,
    /// Must be echoed back at logout. `null` if the login could not be recorded.
    pub last_login_log_id: Option<SessionLogId>,
}

impl From<LoginSuccess> for LoginResponse {
    fn from(ok: LoginSuccess) -> Self {
        Self {
            status: "success",
            token: ok.token,
            user_id: ok.credential.id,
            username: ok.credential.username,
            email: ok.credential.email,
            role_id: ok.credential.role_id,
            roles: ok.roles,
            last_login_log_id: ok.session_log_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub last_login_log_id: Option<SessionLogId>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<Role>,
}

/// `{"status":"success","data":...}` envelope for listings.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub status: &'static str,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
