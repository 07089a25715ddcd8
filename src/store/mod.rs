//!
//! # Store boundaries
//!
//! The identity and task stores are trait objects injected through
//! `web::Data`, so handlers and middleware never name a concrete backend.
//! `PgIdentityStore` is the production implementation; `MemoryIdentityStore`
//! and `MemoryTaskStore` back the integration tests and local runs without a
//! database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskStatus, User};

pub use memory::{MemoryIdentityStore, MemoryTaskStore};
pub use postgres::PgIdentityStore;

/// Persistence boundary for user records.
///
/// Username and email uniqueness is case-insensitive: implementations store
/// both lowercased and compare lowercased.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Creates a user. Fails with `Conflict` if the username or email is
    /// already taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Looks a user up by username or email; either identifier matches.
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError>;

    /// Unconditionally overwrites the stored refresh token. Used at login,
    /// where any previous session is superseded.
    async fn set_refresh_token(&self, id: Uuid, token: &str) -> Result<(), AppError>;

    /// Atomically replaces the stored refresh token only if the current value
    /// equals `current`. Returns `false` when it does not (stale token,
    /// cleared slot, or unknown user), which is what makes rotation single-use
    /// under concurrent refresh requests.
    async fn swap_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        new: &str,
    ) -> Result<bool, AppError>;

    /// Clears the stored refresh token, ending the user's session server-side.
    async fn clear_refresh_token(&self, id: Uuid) -> Result<(), AppError>;
}

/// Persistence boundary for task records.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task. Fails with `BadRequest` if a task with the same id
    /// already exists.
    async fn create(&self, task: Task) -> Result<Task, AppError>;

    async fn list(&self) -> Result<Vec<Task>, AppError>;

    async fn get(&self, id: &str) -> Result<Option<Task>, AppError>;

    /// Updates a task's status, returning the updated task, or `None` if no
    /// task with that id exists.
    async fn update_status(&self, id: &str, status: TaskStatus)
        -> Result<Option<Task>, AppError>;

    /// Deletes a task, returning whether anything was removed.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}
