//! Generic relational client used by the waitlist service.
//!
//! `PgStore` talks to PostgreSQL; `MemoryStore` keeps the same tables in
//! process memory for tests and local development.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::domain::model::{
    Account, AccountPatch, BlacklistEntry, InvitationCode, LeaderboardEntry, NewAccount,
    NewPointEntry, PointEntry, Position,
};
use async_trait::async_trait;

/// Row-level access to `accounts`, `points`, `invitation_codes` and `blacklistedacc`.
///
/// Every method is a single query; callers compose them without transactions.
/// Leaderboard ordering is `total_points DESC, created_at ASC, id ASC`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;

    async fn account_by_id(&self, id: &str) -> anyhow::Result<Option<Account>>;

    async fn account_by_invitation_code(&self, code: &str) -> anyhow::Result<Option<Account>>;

    async fn insert_account(&self, account: NewAccount) -> anyhow::Result<Account>;

    /// Applies `patch` and returns the updated row, or `None` if `id` is unknown.
    async fn update_account(
        &self,
        id: &str,
        patch: &AccountPatch,
    ) -> anyhow::Result<Option<Account>>;

    async fn blacklisted(&self, email: &str) -> anyhow::Result<Option<BlacklistEntry>>;

    async fn insert_blacklist(
        &self,
        email: &str,
        reason: Option<&str>,
    ) -> anyhow::Result<BlacklistEntry>;

    async fn insert_points(&self, entries: &[NewPointEntry]) -> anyhow::Result<()>;

    async fn points_for_account(&self, account_id: &str) -> anyhow::Result<Vec<PointEntry>>;

    async fn has_points_note(&self, account_id: &str, note: &str) -> anyhow::Result<bool>;

    async fn invitation_code(&self, code: &str) -> anyhow::Result<Option<InvitationCode>>;

    async fn insert_invitation_code(
        &self,
        code: &str,
        generated_by: &str,
    ) -> anyhow::Result<InvitationCode>;

    /// Flips `is_used`; returns false when the code is unknown or already used.
    async fn mark_invitation_code_used(&self, code: &str) -> anyhow::Result<bool>;

    /// Clears `is_used` so the code can be redeemed again.
    async fn release_invitation_code(&self, code: &str) -> anyhow::Result<()>;

    /// Accounts whose handle differs from `hidden_handle`.
    async fn count_accounts(&self, hidden_handle: &str) -> anyhow::Result<i64>;

    /// Rank over all accounts (no handle is hidden).
    async fn position_of(&self, account_id: &str) -> anyhow::Result<Option<Position>>;

    async fn leaderboard(
        &self,
        hidden_handle: &str,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<LeaderboardEntry>>;
}
