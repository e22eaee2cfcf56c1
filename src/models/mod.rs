pub mod task;
pub mod user;

pub use task::{Task, TaskInput, DEFAULT_TASK_STATUS};
pub use user::User;

use validator::ValidationError;

/// Rejects strings that are empty or contain only whitespace.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be empty".into());
        return Err(error);
    }
    Ok(())
}
