pub mod connection;
pub mod migrations;
pub mod task_repo;
pub mod daily_plan_repo;
pub mod record_repo;
pub mod auth_repo;

pub use connection::*;
