use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of study task. Labels outside the known set fall back to `Assignment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskType {
    #[default]
    Assignment,
    Exam,
    Class,
    StudySession,
    Project,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Assignment,
        TaskType::Exam,
        TaskType::Class,
        TaskType::StudySession,
        TaskType::Project,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Assignment => "Assignment",
            TaskType::Exam => "Exam",
            TaskType::Class => "Class",
            TaskType::StudySession => "Study Session",
            TaskType::Project => "Project",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for TaskType {
    fn from(value: &str) -> Self {
        let wanted = value.trim();
        TaskType::ALL
            .into_iter()
            .find(|t| {
                t.label().eq_ignore_ascii_case(wanted)
                    || t.label().replace(' ', "").eq_ignore_ascii_case(wanted)
            })
            .unwrap_or_default()
    }
}

impl From<String> for TaskType {
    fn from(value: String) -> Self {
        TaskType::from(value.as_str())
    }
}

impl From<TaskType> for String {
    fn from(value: TaskType) -> Self {
        value.label().to_string()
    }
}

impl FromStr for TaskType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TaskType::from(s))
    }
}

/// Opaque handle returned by a notification backend for a scheduled alarm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    pub due_date: NaiveDate,
    #[serde(with = "hour_minute")]
    pub due_time: NaiveTime,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notification_id: Option<NotificationId>,
}

/// Fields supplied by the caller when creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub due_date: NaiveDate,
    pub due_time: NaiveTime,
}

/// Partial update merged field by field onto an existing task.
///
/// `notification_id` is doubly optional: `None` leaves the handle alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub task_type: Option<TaskType>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub completed: Option<bool>,
    pub notification_id: Option<Option<NotificationId>>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn notification(id: Option<NotificationId>) -> Self {
        Self {
            notification_id: Some(id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Task {
    pub fn new(fields: NewTask) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: fields.title,
            description: fields.description,
            task_type: fields.task_type,
            due_date: fields.due_date,
            due_time: truncate_to_minute(fields.due_time),
            completed: false,
            created_at: Utc::now(),
            notification_id: None,
        }
    }

    /// Local instant the task falls due.
    pub fn due_at(&self) -> NaiveDateTime {
        self.due_date.and_time(self.due_time)
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.completed && self.due_at() < now
    }

    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(task_type) = patch.task_type {
            self.task_type = task_type;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(due_time) = patch.due_time {
            self.due_time = truncate_to_minute(due_time);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(notification_id) = patch.notification_id {
            self.notification_id = notification_id;
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.completed { "x" } else { " " };
        write!(
            f,
            "[{mark}] {} {} {} ({}) {}",
            self.due_date,
            self.due_time.format("%H:%M"),
            self.title,
            self.task_type,
            self.id
        )
    }
}

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Serializes a `NaiveTime` as a 24h `"HH:MM"` string.
pub mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
    }
}
