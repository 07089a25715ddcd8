use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskStatus, User};
use crate::store::{IdentityStore, TaskStore};

/// In-memory identity store. The `Mutex` is held across the compare and the
/// write in `swap_refresh_token`, giving the same atomicity as the
/// conditional UPDATE in the Postgres implementation.
#[derive(Default)]
pub struct MemoryIdentityStore {
    users: Mutex<Vec<User>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> AppError {
    AppError::InternalServerError("store lock poisoned".into())
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let username = new_user.username.to_lowercase();
        let email = new_user.email.to_lowercase();

        let mut users = self.users.lock().map_err(poisoned)?;
        if users
            .iter()
            .any(|u| u.username == username || u.email == email)
        {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            full_name: new_user.full_name,
            password_hash: new_user.password_hash,
            refresh_token: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let username = username.map(str::to_lowercase);
        let email = email.map(str::to_lowercase);
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .iter()
            .find(|u| {
                username.as_deref() == Some(u.username.as_str())
                    || email.as_deref() == Some(u.email.as_str())
            })
            .cloned())
    }

    async fn set_refresh_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.refresh_token = Some(token.to_string());
                Ok(())
            }
            None => Err(AppError::NotFound("User not found".into())),
        }
    }

    async fn swap_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        new: &str,
    ) -> Result<bool, AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) if user.refresh_token.as_deref() == Some(current) => {
                user.refresh_token = Some(new.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_refresh_token(&self, id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.refresh_token = None;
        }
        Ok(())
    }
}

/// In-memory task store, insertion-ordered like the original in-process list.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, task: Task) -> Result<Task, AppError> {
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(AppError::BadRequest(
                "Task with the given ID already exists".into(),
            ));
        }
        tasks.push(task.clone());
        Ok(task)
    }

    async fn list(&self) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.lock().map_err(poisoned)?;
        Ok(tasks.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.lock().map_err(poisoned)?;
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: TaskStatus,
    ) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.status = status;
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            full_name: "Test User".into(),
            password_hash: "hash".into(),
        }
    }

    #[actix_rt::test]
    async fn test_duplicate_user_is_conflict_case_insensitive() {
        let store = MemoryIdentityStore::new();
        store.create(new_user("alice", "a@x.com")).await.unwrap();

        let err = store.create(new_user("ALICE", "other@x.com")).await;
        assert!(matches!(err, Err(AppError::Conflict(_))));

        let err = store.create(new_user("bob", "A@X.COM")).await;
        assert!(matches!(err, Err(AppError::Conflict(_))));
    }

    #[actix_rt::test]
    async fn test_find_by_username_or_email() {
        let store = MemoryIdentityStore::new();
        let created = store.create(new_user("alice", "a@x.com")).await.unwrap();

        let by_name = store
            .find_by_username_or_email(Some("Alice"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, created.id);

        let by_email = store
            .find_by_username_or_email(None, Some("A@X.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);

        let none = store
            .find_by_username_or_email(Some("nobody"), None)
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[actix_rt::test]
    async fn test_swap_refresh_token_is_single_use() {
        let store = MemoryIdentityStore::new();
        let user = store.create(new_user("alice", "a@x.com")).await.unwrap();

        store.set_refresh_token(user.id, "r1").await.unwrap();

        // First rotation succeeds, second presentation of r1 does not.
        assert!(store.swap_refresh_token(user.id, "r1", "r2").await.unwrap());
        assert!(!store.swap_refresh_token(user.id, "r1", "r3").await.unwrap());
        assert!(store.swap_refresh_token(user.id, "r2", "r3").await.unwrap());

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("r3"));
    }

    #[actix_rt::test]
    async fn test_clear_refresh_token_blocks_swap() {
        let store = MemoryIdentityStore::new();
        let user = store.create(new_user("alice", "a@x.com")).await.unwrap();

        store.set_refresh_token(user.id, "r1").await.unwrap();
        store.clear_refresh_token(user.id).await.unwrap();

        assert!(!store.swap_refresh_token(user.id, "r1", "r2").await.unwrap());
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());
    }

    #[actix_rt::test]
    async fn test_task_store_crud() {
        let store = MemoryTaskStore::new();
        let task = Task::new(NewTask {
            id: "t-1".into(),
            title: "First".into(),
            description: "desc".into(),
        });
        store.create(task.clone()).await.unwrap();

        let dup = store.create(task.clone()).await;
        assert!(matches!(dup, Err(AppError::BadRequest(_))));

        let updated = store
            .update_status("t-1", TaskStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);

        assert!(store.update_status("missing", TaskStatus::Pending).await.unwrap().is_none());

        assert!(store.delete("t-1").await.unwrap());
        assert!(!store.delete("t-1").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }
}
