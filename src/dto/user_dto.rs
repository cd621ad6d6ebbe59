use crate::dto::auth_dto::UserView;
use crate::models::user::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(length(min = 8, max = 15))]
    pub phone: String,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
    pub status: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    pub phone: Option<String>,
    // Present-but-empty clears the email; absent leaves it alone.
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub status: Option<String>,
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedUsers {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<UserView>,
}

#[derive(Debug, Deserialize)]
pub struct RoleKeyPayload {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone: String,
}
