pub mod assessment_service;
pub mod question_service;
pub mod settings_service;
pub mod task_service;
pub mod user_service;
pub mod worker_schema;
pub mod worker_service;

const DEFAULT_PAGE_LIMIT: i64 = 50;
const MAX_PAGE_LIMIT: i64 = 200;

/// Clamps caller-supplied pagination to sane bounds.
pub(crate) fn page_window(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
