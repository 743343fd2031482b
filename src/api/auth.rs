//! `UserAuthentication` aggregate service.

use std::sync::Arc;

use larder_api_types::EmptyRequest;
use larder_api_types::auth::{
    AdminCountResponse, CredentialsRequest, DeleteUserRequest, GrantAdminRequest, IsAdminResponse,
    UpdatePasswordRequest, UpdatePasswordResponse, UserRequest, UserResponse, UsernameResponse,
    UsersResponse,
};
use tracing::{debug, warn};

use crate::rpc::{ApiError, RpcClient};

pub struct AuthApi {
    rpc: Arc<RpcClient>,
}

impl AuthApi {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Returns the authenticated user's id.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let request = CredentialsRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let response: UserResponse = self
            .rpc
            .call("UserAuthentication/authenticate", &request)
            .await
            .inspect_err(|error| warn!(username, %error, "authenticate failed"))?;
        Ok(response.user)
    }

    /// Returns the newly registered user's id.
    pub async fn register(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let request = CredentialsRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let response: UserResponse = self
            .rpc
            .call("UserAuthentication/register", &request)
            .await
            .inspect_err(|error| warn!(username, %error, "register failed"))?;
        Ok(response.user)
    }

    pub async fn update_password(
        &self,
        user: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<bool, ApiError> {
        let request = UpdatePasswordRequest {
            user: user.to_owned(),
            old_password: old_password.to_owned(),
            new_password: new_password.to_owned(),
        };
        let response: UpdatePasswordResponse = self
            .rpc
            .call("UserAuthentication/updatePassword", &request)
            .await
            .inspect_err(|error| warn!(user, %error, "password update failed"))?;
        Ok(response.success)
    }

    pub async fn is_user_admin(&self, user: &str) -> Result<bool, ApiError> {
        let request = UserRequest {
            user: user.to_owned(),
        };
        let response: IsAdminResponse = self
            .rpc
            .call("UserAuthentication/_getIsUserAdmin", &request)
            .await
            .inspect_err(|error| warn!(user, %error, "admin status lookup failed"))?;
        Ok(response.is_admin)
    }

    pub async fn list_users(&self) -> Result<Vec<String>, ApiError> {
        let response: UsersResponse = self
            .rpc
            .call("UserAuthentication/_getListOfUsers", &EmptyRequest::default())
            .await
            .inspect_err(|error| warn!(%error, "user list lookup failed"))?;
        Ok(response.users)
    }

    pub async fn admin_count(&self) -> Result<u64, ApiError> {
        let response: AdminCountResponse = self
            .rpc
            .call(
                "UserAuthentication/_getNumberOfAdmins",
                &EmptyRequest::default(),
            )
            .await
            .inspect_err(|error| warn!(%error, "admin count lookup failed"))?;
        Ok(response.admins)
    }

    pub async fn grant_admin(&self, target_user: &str) -> Result<(), ApiError> {
        let request = GrantAdminRequest {
            target_user: target_user.to_owned(),
        };
        self.rpc
            .call_ack("UserAuthentication/grantAdmin", &request)
            .await
            .inspect_err(|error| warn!(target_user, %error, "grant admin failed"))
    }

    pub async fn delete_user(&self, user: &str) -> Result<(), ApiError> {
        let request = DeleteUserRequest {
            user_to_delete: user.to_owned(),
        };
        self.rpc
            .call_ack("UserAuthentication/deleteUser", &request)
            .await
            .inspect_err(|error| warn!(user, %error, "delete user failed"))
    }

    /// Display name for a user id. Fallback behavior on failure belongs to
    /// the username cache, not here.
    pub async fn username(&self, user: &str) -> Result<String, ApiError> {
        let request = UserRequest {
            user: user.to_owned(),
        };
        let response: UsernameResponse = self
            .rpc
            .call("UserAuthentication/_getUsername", &request)
            .await
            .inspect_err(|error| warn!(user, %error, "username lookup failed"))?;
        Ok(response.username)
    }

    /// Connectivity probe; never fails.
    pub async fn test_connection(&self) -> bool {
        match self.list_users().await {
            Ok(_) => true,
            Err(error) => {
                debug!(%error, "connection test failed");
                false
            }
        }
    }
}
