use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordWork {
    pub id: String,
    pub task_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub progress_value: Option<f64>,
    pub work_time: Option<i64>,
    pub note: Option<String>,
    pub created_by: String,
    pub last_updated_user: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
