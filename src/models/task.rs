use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Workflow state of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet. Default for new tasks.
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Accepted values, in the order they are reported in validation errors.
    pub const VALID: [&'static str; 3] = ["pending", "in-progress", "completed"];

    /// Parses the wire form of a status, e.g. `"in-progress"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(TaskStatus::Pending),
            "in-progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// A task record. Task ids are client-supplied opaque strings and must be
/// unique within the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

/// Input payload for creating a task.
#[derive(Debug, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
}

/// Input payload for updating a task's status. The status arrives as a raw
/// string so an unknown value can be answered with the list of valid ones
/// instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct TaskStatusUpdate {
    pub status: String,
}

impl Task {
    pub fn new(input: NewTask) -> Self {
        Self {
            id: input.id.trim().to_string(),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"pending\"").unwrap(),
            TaskStatus::Pending
        );
        assert!(serde_json::from_str::<TaskStatus>("\"archived\"").is_err());
    }

    #[test]
    fn test_new_task_defaults_to_pending() {
        let task = Task::new(NewTask {
            id: " t-1 ".into(),
            title: "Write docs".into(),
            description: "Cover the refresh flow".into(),
        });
        assert_eq!(task.id, "t-1");
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_new_task_validation() {
        let input = NewTask {
            id: "".into(),
            title: "Write docs".into(),
            description: "x".into(),
        };
        assert!(input.validate().is_err());
    }
}
