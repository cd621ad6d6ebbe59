pub mod assessment_dto;
pub mod auth_dto;
pub mod question_dto;
pub mod settings_dto;
pub mod task_dto;
pub mod user_dto;
pub mod worker_dto;

use serde::{Deserialize, Deserializer};

/// Trims an optional string field and turns empty strings into `None`.
pub fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }))
}
