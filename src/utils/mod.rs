pub mod crypto;
pub mod phone;
