pub mod address;
pub mod admin;
pub mod user;
