use std::path::PathBuf;

use crate::application::reminder_scheduler::ReminderMode;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub reminder_mode: ReminderMode,
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("PLANNER_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| ".planner".into())
            .into();
        let reminder_mode = lookup("PLANNER_REMINDER_MODE")
            .unwrap_or_else(|| "daily".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PLANNER_REMINDER_MODE: {}", e))?;
        let log_json = match lookup("PLANNER_LOG_JSON") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow::anyhow!("invalid PLANNER_LOG_JSON: {}", raw))?,
            None => false,
        };

        Ok(Self {
            data_dir,
            reminder_mode,
            log_json,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".planner"));
        assert_eq!(config.reminder_mode, ReminderMode::Daily);
        assert!(!config.log_json);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PLANNER_DATA_DIR", "/tmp/planner"),
            ("PLANNER_REMINDER_MODE", "once"),
            ("PLANNER_LOG_JSON", "true"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/planner"));
        assert_eq!(config.reminder_mode, ReminderMode::Once);
        assert!(config.log_json);
    }

    #[test]
    fn rejects_unknown_reminder_mode() {
        let err = AppConfig::from_lookup(lookup(&[("PLANNER_REMINDER_MODE", "hourly")]))
            .unwrap_err();
        assert!(err.to_string().contains("PLANNER_REMINDER_MODE"));
    }
}
