use serde::Deserialize;

/// Timestamps arrive as strings so that unparseable values map to the
/// `invalid_start_at` / `invalid_end_at` keys instead of a generic body error.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsPayload {
    pub question_count: i32,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub start_at: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub end_at: Option<String>,
    pub frequency_months: Option<i32>,
}
