//! PostgreSQL store.

use crate::domain::model::{
    Account, AccountPatch, BlacklistEntry, InvitationCode, LeaderboardEntry, NewAccount,
    NewPointEntry, PointEntry, Position,
};
use crate::storage::Store;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, QueryBuilder, Row};

const ACCOUNT_COLUMNS: &str = "id, email, twitter_handle, invitation_code, invited_by_account_id, \
     invited_accounts_count, total_points, principal_id, last_token_balance, created_at";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        id TEXT PRIMARY KEY,
        email TEXT,
        twitter_handle TEXT,
        invitation_code TEXT NOT NULL UNIQUE,
        invited_by_account_id TEXT REFERENCES accounts(id),
        invited_accounts_count INTEGER NOT NULL DEFAULT 0,
        total_points BIGINT NOT NULL DEFAULT 0,
        principal_id TEXT,
        last_token_balance TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS accounts_leaderboard_idx
        ON accounts (total_points DESC, created_at ASC, id ASC)",
    "CREATE TABLE IF NOT EXISTS points (
        id BIGSERIAL PRIMARY KEY,
        account_id TEXT NOT NULL REFERENCES accounts(id),
        amount BIGINT NOT NULL,
        note TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS points_account_note_idx ON points (account_id, note)",
    "CREATE TABLE IF NOT EXISTS invitation_codes (
        code TEXT PRIMARY KEY,
        generated_by TEXT NOT NULL,
        is_used BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS blacklistedacc (
        email TEXT PRIMARY KEY,
        reason TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and creates the waitlist tables if they are missing.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        twitter_handle: row.try_get("twitter_handle")?,
        invitation_code: row.try_get("invitation_code")?,
        invited_by_account_id: row.try_get("invited_by_account_id")?,
        invited_accounts_count: row.try_get("invited_accounts_count")?,
        total_points: row.try_get("total_points")?,
        principal_id: row.try_get("principal_id")?,
        last_token_balance: row.try_get("last_token_balance")?,
        created_at: row.try_get("created_at")?,
    })
}

fn invitation_from_row(row: &PgRow) -> Result<InvitationCode, sqlx::Error> {
    Ok(InvitationCode {
        code: row.try_get("code")?,
        generated_by: row.try_get("generated_by")?,
        is_used: row.try_get("is_used")?,
        created_at: row.try_get("created_at")?,
    })
}

fn blacklist_from_row(row: &PgRow) -> Result<BlacklistEntry, sqlx::Error> {
    Ok(BlacklistEntry {
        email: row.try_get("email")?,
        reason: row.try_get("reason")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn account_by_id(&self, id: &str) -> anyhow::Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn account_by_invitation_code(&self, code: &str) -> anyhow::Result<Option<Account>> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE invitation_code = $1",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn insert_account(&self, account: NewAccount) -> anyhow::Result<Account> {
        let sql = format!(
            "INSERT INTO accounts (id, email, twitter_handle, invitation_code, invited_by_account_id, total_points)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&account.id)
            .bind(&account.email)
            .bind(&account.twitter_handle)
            .bind(&account.invitation_code)
            .bind(&account.invited_by_account_id)
            .bind(account.total_points)
            .fetch_one(&self.pool)
            .await?;
        Ok(account_from_row(&row)?)
    }

    async fn update_account(
        &self,
        id: &str,
        patch: &AccountPatch,
    ) -> anyhow::Result<Option<Account>> {
        // Numeric fields are increments; wallet fields only change when set.
        let sql = format!(
            "UPDATE accounts SET
                total_points = total_points + $2,
                invited_accounts_count = invited_accounts_count + $3,
                principal_id = COALESCE($4::text, principal_id),
                last_token_balance = COALESCE($5::text, last_token_balance)
             WHERE id = $1
             RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.add_points)
            .bind(patch.add_invited)
            .bind(&patch.principal_id)
            .bind(&patch.last_token_balance)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn blacklisted(&self, email: &str) -> anyhow::Result<Option<BlacklistEntry>> {
        let row = sqlx::query(
            "SELECT email, reason, created_at FROM blacklistedacc WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(blacklist_from_row).transpose()?)
    }

    async fn insert_blacklist(
        &self,
        email: &str,
        reason: Option<&str>,
    ) -> anyhow::Result<BlacklistEntry> {
        let row = sqlx::query(
            "INSERT INTO blacklistedacc (email, reason) VALUES ($1, $2)
             ON CONFLICT (email) DO UPDATE SET reason = EXCLUDED.reason
             RETURNING email, reason, created_at",
        )
        .bind(email)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(blacklist_from_row(&row)?)
    }

    async fn insert_points(&self, entries: &[NewPointEntry]) -> anyhow::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("INSERT INTO points (account_id, amount, note) ");
        qb.push_values(entries, |mut b, entry| {
            b.push_bind(&entry.account_id)
                .push_bind(entry.amount)
                .push_bind(&entry.note);
        });
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn points_for_account(&self, account_id: &str) -> anyhow::Result<Vec<PointEntry>> {
        let rows = sqlx::query(
            "SELECT id, account_id, amount, note, created_at FROM points
             WHERE account_id = $1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(PointEntry {
                id: row.try_get("id")?,
                account_id: row.try_get("account_id")?,
                amount: row.try_get("amount")?,
                note: row.try_get("note")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(entries)
    }

    async fn has_points_note(&self, account_id: &str, note: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM points WHERE account_id = $1 AND note = $2)",
        )
        .bind(account_id)
        .bind(note)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn invitation_code(&self, code: &str) -> anyhow::Result<Option<InvitationCode>> {
        let row = sqlx::query(
            "SELECT code, generated_by, is_used, created_at FROM invitation_codes WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(invitation_from_row).transpose()?)
    }

    async fn insert_invitation_code(
        &self,
        code: &str,
        generated_by: &str,
    ) -> anyhow::Result<InvitationCode> {
        let row = sqlx::query(
            "INSERT INTO invitation_codes (code, generated_by) VALUES ($1, $2)
             RETURNING code, generated_by, is_used, created_at",
        )
        .bind(code)
        .bind(generated_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(invitation_from_row(&row)?)
    }

    async fn mark_invitation_code_used(&self, code: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE invitation_codes SET is_used = true WHERE code = $1 AND is_used = false",
        )
        .bind(code)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_invitation_code(&self, code: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE invitation_codes SET is_used = false WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_accounts(&self, hidden_handle: &str) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM accounts WHERE twitter_handle IS DISTINCT FROM $1",
        )
        .bind(hidden_handle)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn position_of(&self, account_id: &str) -> anyhow::Result<Option<Position>> {
        let row = sqlx::query(
            "SELECT rank, total_points FROM (
                SELECT id, total_points,
                       ROW_NUMBER() OVER (ORDER BY total_points DESC, created_at ASC, id ASC) AS rank
                FROM accounts
             ) ranked
             WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Position {
                rank: row.try_get("rank")?,
                total_points: row.try_get("total_points")?,
            })),
            None => Ok(None),
        }
    }

    async fn leaderboard(
        &self,
        hidden_handle: &str,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query(
            "SELECT id, twitter_handle, total_points, invited_accounts_count FROM accounts
             WHERE twitter_handle IS DISTINCT FROM $1
             ORDER BY total_points DESC, created_at ASC, id ASC
             OFFSET $2 LIMIT $3",
        )
        .bind(hidden_handle)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            entries.push(LeaderboardEntry {
                rank: offset + idx as i64 + 1,
                id: row.try_get("id")?,
                twitter_handle: row.try_get("twitter_handle")?,
                total_points: row.try_get("total_points")?,
                invited_accounts_count: row.try_get("invited_accounts_count")?,
            });
        }
        Ok(entries)
    }
}
