//! Study planner core: local task storage, a single-account login, and
//! due-date reminder scheduling against a pluggable notification backend.

pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::planner::Planner;
pub use application::reminder_scheduler::{ReminderMode, ReminderScheduler};
pub use application::task_service::{Agenda, TaskService};
pub use domain::error::DomainError;
pub use domain::task::{NewTask, NotificationId, Task, TaskPatch, TaskType};
pub use domain::user::User;
