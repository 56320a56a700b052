pub mod auth;
pub mod health;
pub mod health_logs;
pub mod moods;
pub mod reminders;
