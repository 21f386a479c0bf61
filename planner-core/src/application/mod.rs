pub mod auth_service;
pub mod planner;
pub mod reminder_scheduler;
pub mod task_service;
