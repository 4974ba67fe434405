pub mod task;
pub mod daily;
pub mod record;
pub mod auth;

pub use task::*;
pub use daily::*;
pub use record::*;
pub use auth::*;
