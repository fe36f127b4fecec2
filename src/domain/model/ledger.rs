use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A row of the `points` ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PointEntry {
    pub id: i64,
    pub account_id: String,
    pub amount: i64,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPointEntry {
    pub account_id: String,
    pub amount: i64,
    pub note: String,
}

impl NewPointEntry {
    pub fn new(account_id: impl Into<String>, amount: i64, note: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            amount,
            note: note.into(),
        }
    }
}
