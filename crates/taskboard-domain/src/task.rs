use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use taskboard_core::{TaskboardError, TaskboardResult};
use uuid::Uuid;

const TEMPORARY_PREFIX: &str = "tmp-";

/// Identifier of a task, unique within one user's task set.
///
/// Store-assigned ids are numeric strings; ids created on the client before the
/// store has answered carry a `tmp-` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn temporary() -> Self {
        Self(format!("{}{}", TEMPORARY_PREFIX, Uuid::new_v4()))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            due_date: None,
        }
    }

    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
        }
    }

    /// Overwrite the user-editable content, keeping the identifier.
    pub fn apply_draft(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.due_date = draft.due_date;
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
        }
    }
}

/// User-editable task content as submitted by a form or the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Normalize and check the draft: the title is trimmed and must not be
    /// empty, a blank description becomes `None`.
    pub fn validate(self) -> TaskboardResult<Self> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TaskboardError::Validation("Title is required".to_string()));
        }
        let description = self.description.filter(|d| !d.trim().is_empty());
        Ok(Self {
            title,
            description,
            due_date: self.due_date,
        })
    }
}

/// Due dates arrive as `YYYY-MM-DD`; web forms send `""` for no date.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Parse a `YYYY-MM-DD` due date.
pub fn parse_due_date(value: &str) -> TaskboardResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| TaskboardError::Validation(format!("Invalid due date '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_ids() {
        let id = TaskId::temporary();
        assert!(id.is_temporary());
        assert!(!TaskId::from(42).is_temporary());
        assert_ne!(TaskId::temporary(), TaskId::temporary());
    }

    #[test]
    fn test_validate_trims_title_and_drops_blank_description() {
        let draft = TaskDraft::new("  Write report ").with_description("   ");
        let draft = draft.validate().unwrap();
        assert_eq!(draft.title, "Write report");
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let err = TaskDraft::new("   ").validate().unwrap_err();
        assert!(matches!(err, TaskboardError::Validation(_)));
    }

    #[test]
    fn test_task_wire_format() {
        let task = Task {
            id: TaskId::from(7),
            title: "Ship".to_string(),
            description: None,
            due_date: Some(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["dueDate"], "2025-03-09");

        let parsed: Task = serde_json::from_str(r#"{"id":"3","title":"Read"}"#).unwrap();
        assert_eq!(parsed.description, None);
        assert_eq!(parsed.due_date, None);
    }

    #[test]
    fn test_blank_due_date_means_none() {
        let draft: TaskDraft = serde_json::from_str(r#"{"title":"x","dueDate":""}"#).unwrap();
        assert_eq!(draft.due_date, None);
        let draft: TaskDraft = serde_json::from_str(r#"{"title":"x","dueDate":null}"#).unwrap();
        assert_eq!(draft.due_date, None);
        let task: Task = serde_json::from_str(r#"{"id":"1","title":"x","dueDate":" "}"#).unwrap();
        assert_eq!(task.due_date, None);

        let draft: TaskDraft =
            serde_json::from_str(r#"{"title":"x","dueDate":"2025-03-09"}"#).unwrap();
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2025, 3, 9));
        assert!(serde_json::from_str::<TaskDraft>(r#"{"title":"x","dueDate":"soon"}"#).is_err());
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(
            parse_due_date("2024-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
        assert!(parse_due_date("31/12/2024").is_err());
    }
}
