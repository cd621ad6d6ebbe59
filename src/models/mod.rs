pub mod assessment;
pub mod question;
pub mod settings;
pub mod task;
pub mod user;
