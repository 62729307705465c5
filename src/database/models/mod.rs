pub mod address;
pub mod session;
pub mod user;
