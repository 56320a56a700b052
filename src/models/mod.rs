pub mod health_log;
pub mod mood;
pub mod reminder;
pub mod user;
