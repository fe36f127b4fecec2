use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A row of `accounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: String,
    pub email: Option<String>,
    pub twitter_handle: Option<String>,
    /// This account's own referral code.
    pub invitation_code: String,
    pub invited_by_account_id: Option<String>,
    pub invited_accounts_count: i32,
    pub total_points: i64,
    /// Connected wallet identifier, set at most once.
    pub principal_id: Option<String>,
    /// Last observed token balance, kept as a decimal string.
    pub last_token_balance: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Parsed `last_token_balance`; absent or unparsable values count as zero.
    pub fn last_balance(&self) -> f64 {
        self.last_token_balance
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|b| b.is_finite())
            .unwrap_or(0.0)
    }
}

/// Values for inserting a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: String,
    pub email: Option<String>,
    pub twitter_handle: String,
    pub invitation_code: String,
    pub invited_by_account_id: Option<String>,
    pub total_points: i64,
}

/// Partial update of an account. Numeric fields are applied as increments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub add_points: i64,
    pub add_invited: i32,
    pub principal_id: Option<String>,
    pub last_token_balance: Option<String>,
}

impl AccountPatch {
    pub fn points(amount: i64) -> Self {
        Self {
            add_points: amount,
            ..Self::default()
        }
    }
}

/// A row of `blacklistedacc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BlacklistEntry {
    pub email: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position within the visible leaderboard.
    pub rank: i64,
    pub id: String,
    pub twitter_handle: Option<String>,
    pub total_points: i64,
    pub invited_accounts_count: i32,
}

/// The caller's standing across all accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub rank: i64,
    pub total_points: i64,
}
