//! User service trait definition.

use crate::dto::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse};
use async_trait::async_trait;
use scribe_core::{Interface, ScribeResult, UserId};

/// Account use-cases.
///
/// Every operation except `register`, `login` and `get_user_by_name`
/// requires a live session for the acting user.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Creates an account and opens its session.
    async fn register(&self, request: RegisterRequest) -> ScribeResult<AuthResponse>;

    /// Verifies credentials and opens a session.
    async fn login(&self, request: LoginRequest) -> ScribeResult<AuthResponse>;

    /// Closes the user's session.
    async fn logout(&self, user_id: UserId) -> ScribeResult<()>;

    /// Returns the acting user's profile.
    async fn get_user(&self, user_id: UserId) -> ScribeResult<UserResponse>;

    /// Looks up an author by display name. Public.
    async fn get_user_by_name(&self, name: &str) -> ScribeResult<UserResponse>;

    /// Applies a partial profile update.
    async fn update_user(&self, user_id: UserId, request: UpdateUserRequest) -> ScribeResult<UserResponse>;

    /// Soft-deletes the account and closes its session.
    async fn delete_account(&self, user_id: UserId) -> ScribeResult<()>;
}
