//! Input shapes collected by a front end, with the checks a form performs
//! before anything reaches the core.

use chrono::{NaiveDate, NaiveTime};

use crate::domain::error::DomainError;
use crate::domain::task::{NewTask, TaskPatch, TaskType};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            &self.name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(DomainError::validation("Please fill in all fields"));
        }
        if !looks_like_email(&self.email) {
            return Err(DomainError::validation("Please enter a valid email address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        if self.password != self.confirm_password {
            return Err(DomainError::validation("Passwords do not match"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(DomainError::validation("Please fill in all fields"));
        }
        Ok(())
    }
}

/// Task form as entered by the user. Date and time are raw text.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub task_type: TaskType,
    pub due_date: String,
    pub due_time: String,
}

impl TaskForm {
    pub fn validate(self) -> Result<NewTask, DomainError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("Please enter a task title"));
        }
        let (due_date, due_time) = parse_manual_due(&self.due_date, &self.due_time)?;
        Ok(NewTask {
            title: title.to_string(),
            description: non_empty(&self.description),
            task_type: self.task_type,
            due_date,
            due_time,
        })
    }
}

/// Edit form: absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskEditForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub task_type: Option<TaskType>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
}

impl TaskEditForm {
    pub fn validate(self) -> Result<TaskPatch, DomainError> {
        let title = match self.title {
            Some(t) if t.trim().is_empty() => {
                return Err(DomainError::validation("Please enter a task title"));
            }
            Some(t) => Some(t.trim().to_string()),
            None => None,
        };
        let patch = TaskPatch {
            title,
            description: self.description.as_deref().map(non_empty),
            task_type: self.task_type,
            due_date: self.due_date.as_deref().map(parse_date).transpose()?,
            due_time: self.due_time.as_deref().map(parse_time).transpose()?,
            ..TaskPatch::default()
        };
        if patch.is_empty() {
            return Err(DomainError::validation("Nothing to update"));
        }
        Ok(patch)
    }
}

/// Parses manually typed due date and time. Both must be present.
pub fn parse_manual_due(date: &str, time: &str) -> Result<(NaiveDate, NaiveTime), DomainError> {
    if date.trim().is_empty() || time.trim().is_empty() {
        return Err(DomainError::validation(
            "Please enter both manual date and time",
        ));
    }
    Ok((parse_date(date)?, parse_time(time)?))
}

/// Accepts `MM/DD/YYYY` or ISO `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, DomainError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| DomainError::validation(format!("Invalid date '{raw}', expected MM/DD/YYYY")))
}

/// Accepts `H:MM` or `HH:MM` on a 24h clock.
pub fn parse_time(raw: &str) -> Result<NaiveTime, DomainError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| DomainError::validation(format!("Invalid time '{raw}', expected HH:MM")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            name: "A".into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    fn message(err: DomainError) -> String {
        err.to_string()
    }

    #[test]
    fn register_validation_messages() {
        assert!(register("a@x.com", "abcdef", "abcdef").validate().is_ok());
        assert_eq!(
            message(register("a@x", "abcdef", "abcdef").validate().unwrap_err()),
            "Please enter a valid email address"
        );
        assert_eq!(
            message(register("a@x.com", "abc", "abc").validate().unwrap_err()),
            "Password must be at least 6 characters long"
        );
        assert_eq!(
            message(register("a@x.com", "abcdef", "abcdeg").validate().unwrap_err()),
            "Passwords do not match"
        );
        assert_eq!(
            message(register(" ", "abcdef", "abcdef").validate().unwrap_err()),
            "Please fill in all fields"
        );
    }

    #[test]
    fn manual_due_parsing() {
        let (date, time) = parse_manual_due("10/17/2026", "9:05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(9, 5, 0).unwrap());

        assert!(parse_manual_due("", "09:00").is_err());
        assert!(parse_manual_due("13/40/2026", "09:00").is_err());
        assert!(parse_manual_due("10/17/2026", "25:00").is_err());
        assert_eq!(parse_date("2026-10-17").unwrap(), date);
    }

    #[test]
    fn task_form_trims_and_requires_title() {
        let form = TaskForm {
            title: "  Essay ".into(),
            description: "   ".into(),
            task_type: TaskType::Assignment,
            due_date: "10/20/2026".into(),
            due_time: "23:59".into(),
        };
        let task = form.validate().unwrap();
        assert_eq!(task.title, "Essay");
        assert_eq!(task.description, None);

        let empty = TaskForm {
            due_date: "10/20/2026".into(),
            due_time: "23:59".into(),
            ..TaskForm::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn edit_form_rejects_empty_patch() {
        assert!(TaskEditForm::default().validate().is_err());
        let patch = TaskEditForm {
            due_time: Some("07:30".into()),
            ..TaskEditForm::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.due_time, NaiveTime::from_hms_opt(7, 30, 0));
    }

    #[test]
    fn display_formatting() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(format_date(date), "Sat, Oct 17, 2026");
        assert_eq!(format_time(NaiveTime::from_hms_opt(0, 5, 0).unwrap()), "12:05 AM");
        assert_eq!(format_time(NaiveTime::from_hms_opt(14, 30, 0).unwrap()), "2:30 PM");
    }
}
