//! `UserAuthentication` aggregate shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub user: String,
    pub old_password: String,
    pub new_password: String,
}

/// Body for endpoints addressing a single user by id.
#[derive(Debug, Clone, Serialize)]
pub struct UserRequest {
    pub user: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAdminRequest {
    pub target_user: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub user_to_delete: String,
}

/// `authenticate` / `register` both answer with the user's id.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub user: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePasswordResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsAdminResponse {
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersResponse {
    #[serde(default, deserialize_with = "crate::de::id_list")]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminCountResponse {
    #[serde(default)]
    pub admins: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsernameResponse {
    pub username: String,
}
