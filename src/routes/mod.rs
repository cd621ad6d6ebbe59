pub mod assessments;
pub mod auth;
pub mod health;
pub mod questions;
pub mod settings;
pub mod tasks;
pub mod users;
pub mod workers;
