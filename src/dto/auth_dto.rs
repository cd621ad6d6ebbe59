use crate::models::user::{Role, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupPayload {
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(length(min = 8, max = 15))]
    pub phone: String,
    #[serde(default, deserialize_with = "crate::dto::trim_optional_string")]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 3, max = 15))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub status: String,
    pub roles: Vec<Role>,
}

impl UserView {
    pub fn from_user(user: User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            phone: user.phone,
            email: user.email,
            status: user.status,
            roles,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}
