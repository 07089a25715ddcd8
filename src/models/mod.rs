pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskStatus, TaskStatusUpdate};
pub use user::{NewUser, User, UserProfile};
