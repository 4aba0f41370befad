use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub url: String,
    pub created_at: DateTime<Utc>,
}
