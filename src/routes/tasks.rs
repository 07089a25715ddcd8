use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{NewTask, Task, TaskStatus, TaskStatusUpdate},
    store::TaskStore,
};

/// Creates a task. Task ids are chosen by the client and must be unique.
///
/// ## Responses:
/// - `201 Created`: the new task, with status defaulting to `pending`.
/// - `400 Bad Request`: missing fields or duplicate id.
/// - `401 Unauthorized`: no valid access token.
#[post("")]
pub async fn create_task(
    store: web::Data<dyn TaskStore>,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = store.create(Task::new(task_data.into_inner())).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Lists all tasks in creation order.
#[get("")]
pub async fn get_tasks(store: web::Data<dyn TaskStore>) -> Result<impl Responder, AppError> {
    let tasks = store.list().await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Fetches a single task by id.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `404 Not Found`: no task with that id.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    match store.get(&task_id).await? {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Moves a task to a new status.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: unknown status value; the message lists the valid ones.
/// - `404 Not Found`: no task with that id.
#[put("/{id}/status")]
pub async fn update_task_status(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<String>,
    update: web::Json<TaskStatusUpdate>,
) -> Result<impl Responder, AppError> {
    let status = TaskStatus::from_name(&update.status).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid status. Valid statuses are: {}",
            TaskStatus::VALID.join(", ")
        ))
    })?;

    match store.update_status(&task_id, status).await? {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task by id.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    if store.delete(&task_id).await? {
        Ok(HttpResponse::Ok().json(json!({ "message": "Task successfully deleted." })))
    } else {
        Err(AppError::NotFound("Task not found".into()))
    }
}
