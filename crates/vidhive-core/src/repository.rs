//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The session state lives on the
//! user record itself (one refresh token per user), so the refresh
//! token operations are part of the user repository.

use uuid::Uuid;

use crate::error::VidhiveResult;
use crate::models::user::{CreateUser, UpdateUser, User};

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = VidhiveResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VidhiveResult<User>> + Send;
    fn get_by_username(&self, username: &str) -> impl Future<Output = VidhiveResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = VidhiveResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = VidhiveResult<User>> + Send;

    /// Replace the stored password digest.
    fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> impl Future<Output = VidhiveResult<()>> + Send;

    /// Unconditionally overwrite the stored refresh token (login).
    fn set_refresh_token(
        &self,
        id: Uuid,
        token: String,
    ) -> impl Future<Output = VidhiveResult<()>> + Send;

    /// Clear the stored refresh token (logout).
    fn clear_refresh_token(&self, id: Uuid) -> impl Future<Output = VidhiveResult<()>> + Send;

    /// Atomically swap `expected` for `next`.
    ///
    /// Must be a single conditional store operation: if the stored
    /// token does not equal `expected` the swap does not happen and
    /// `NotFound` is returned. Of two concurrent calls presenting the
    /// same token, exactly one wins.
    fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        next: String,
    ) -> impl Future<Output = VidhiveResult<()>> + Send;
}
