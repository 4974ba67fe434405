use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Study,
    Creation,
    Other,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Study => "study",
            Self::Creation => "creation",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "study" => Some(Self::Study),
            "creation" => Some(Self::Creation),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "paused" => Some(Self::Paused),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub content: String,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_time: i64,
    pub comment: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Writable task fields, as submitted on create or update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFields {
    pub name: String,
    #[serde(default)]
    pub content: String,
    pub category: TaskCategory,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_time: i64,
    pub comment: Option<String>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Active
}

impl From<&Task> for TaskFields {
    fn from(t: &Task) -> Self {
        Self {
            name: t.name.clone(),
            content: t.content.clone(),
            category: t.category,
            status: t.status,
            start_date: Some(t.start_date),
            end_date: Some(t.end_date),
            target_time: t.target_time,
            comment: t.comment.clone(),
        }
    }
}
