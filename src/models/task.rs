use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::not_blank;

/// Status assigned to every newly created task.
pub const DEFAULT_TASK_STATUS: &str = "pending";

/// Payload accepted by `POST /tasks`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. Required, and not just whitespace.
    #[validate(custom = "not_blank", length(max = 255, message = "must be at most 255 characters"))]
    pub title: String,

    /// An optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Database-assigned identifier.
    pub id: i32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status, `"pending"` on creation.
    pub status: String,
    /// Identifier of the user who owns the task.
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_input_validation() {
        let valid = TaskInput {
            title: "buy milk".to_string(),
            description: None,
        };
        assert!(valid.validate().is_ok());

        let empty = TaskInput {
            title: "".to_string(),
            description: Some("2%".to_string()),
        };
        assert!(empty.validate().is_err());

        let whitespace = TaskInput {
            title: "   ".to_string(),
            description: None,
        };
        assert!(whitespace.validate().is_err());

        let too_long = TaskInput {
            title: "a".repeat(256),
            description: None,
        };
        let message = too_long.validate().unwrap_err().to_string();
        assert!(message.contains("at most 255 characters"));
        assert!(!message.contains(&"a".repeat(256)));
    }

    #[test]
    fn test_task_input_description_is_optional() {
        let input: TaskInput = serde_json::from_str(r#"{"title": "buy milk"}"#).unwrap();
        assert_eq!(input.title, "buy milk");
        assert!(input.description.is_none());

        let missing_title = serde_json::from_str::<TaskInput>(r#"{"description": "x"}"#);
        assert!(missing_title.is_err());
    }

    #[test]
    fn test_task_serialization_skips_missing_description() {
        let task = Task {
            id: 1,
            title: "buy milk".to_string(),
            description: None,
            status: DEFAULT_TASK_STATUS.to_string(),
            owner_id: 3,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["owner_id"], 3);
        assert!(json.get("description").is_none());
    }
}
