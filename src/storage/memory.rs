//! In-process store with the same semantics as `PgStore`.

use crate::domain::model::{
    Account, AccountPatch, BlacklistEntry, InvitationCode, LeaderboardEntry, NewAccount,
    NewPointEntry, PointEntry, Position,
};
use crate::storage::Store;
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    points: Vec<PointEntry>,
    invitation_codes: HashMap<String, InvitationCode>,
    blacklist: HashMap<String, BlacklistEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn leaderboard_order(a: &Account, b: &Account) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then(a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn ranked(accounts: &[Account]) -> Vec<&Account> {
    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| leaderboard_order(a, b));
    sorted
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn account_by_id(&self, id: &str) -> anyhow::Result<Option<Account>> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn account_by_invitation_code(&self, code: &str) -> anyhow::Result<Option<Account>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.invitation_code == code)
            .cloned())
    }

    async fn insert_account(&self, account: NewAccount) -> anyhow::Result<Account> {
        let mut tables = self.tables.lock().await;
        if tables.accounts.iter().any(|a| a.id == account.id) {
            anyhow::bail!("duplicate key value violates unique constraint \"accounts_pkey\"");
        }
        if tables
            .accounts
            .iter()
            .any(|a| a.invitation_code == account.invitation_code)
        {
            anyhow::bail!(
                "duplicate key value violates unique constraint \"accounts_invitation_code_key\""
            );
        }
        if let Some(referrer) = account.invited_by_account_id.as_deref() {
            if !tables.accounts.iter().any(|a| a.id == referrer) {
                anyhow::bail!("invited_by_account_id references unknown account {}", referrer);
            }
        }

        let row = Account {
            id: account.id,
            email: account.email,
            twitter_handle: Some(account.twitter_handle),
            invitation_code: account.invitation_code,
            invited_by_account_id: account.invited_by_account_id,
            invited_accounts_count: 0,
            total_points: account.total_points,
            principal_id: None,
            last_token_balance: None,
            created_at: Utc::now(),
        };
        tables.accounts.push(row.clone());
        Ok(row)
    }

    async fn update_account(
        &self,
        id: &str,
        patch: &AccountPatch,
    ) -> anyhow::Result<Option<Account>> {
        let mut tables = self.tables.lock().await;
        let Some(account) = tables.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        account.total_points += patch.add_points;
        account.invited_accounts_count += patch.add_invited;
        if let Some(principal) = &patch.principal_id {
            account.principal_id = Some(principal.clone());
        }
        if let Some(balance) = &patch.last_token_balance {
            account.last_token_balance = Some(balance.clone());
        }
        Ok(Some(account.clone()))
    }

    async fn blacklisted(&self, email: &str) -> anyhow::Result<Option<BlacklistEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables.blacklist.get(&email.to_lowercase()).cloned())
    }

    async fn insert_blacklist(
        &self,
        email: &str,
        reason: Option<&str>,
    ) -> anyhow::Result<BlacklistEntry> {
        let mut tables = self.tables.lock().await;
        let entry = tables
            .blacklist
            .entry(email.to_lowercase())
            .or_insert_with(|| BlacklistEntry {
                email: email.to_string(),
                reason: None,
                created_at: Utc::now(),
            });
        entry.reason = reason.map(str::to_string);
        Ok(entry.clone())
    }

    async fn insert_points(&self, entries: &[NewPointEntry]) -> anyhow::Result<()> {
        let mut tables = self.tables.lock().await;
        for entry in entries {
            if !tables.accounts.iter().any(|a| a.id == entry.account_id) {
                anyhow::bail!("points.account_id references unknown account {}", entry.account_id);
            }
        }
        for entry in entries {
            let id = tables.points.len() as i64 + 1;
            tables.points.push(PointEntry {
                id,
                account_id: entry.account_id.clone(),
                amount: entry.amount,
                note: entry.note.clone(),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn points_for_account(&self, account_id: &str) -> anyhow::Result<Vec<PointEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .points
            .iter()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn has_points_note(&self, account_id: &str, note: &str) -> anyhow::Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .points
            .iter()
            .any(|p| p.account_id == account_id && p.note == note))
    }

    async fn invitation_code(&self, code: &str) -> anyhow::Result<Option<InvitationCode>> {
        let tables = self.tables.lock().await;
        Ok(tables.invitation_codes.get(code).cloned())
    }

    async fn insert_invitation_code(
        &self,
        code: &str,
        generated_by: &str,
    ) -> anyhow::Result<InvitationCode> {
        let mut tables = self.tables.lock().await;
        if tables.invitation_codes.contains_key(code) {
            anyhow::bail!("duplicate key value violates unique constraint \"invitation_codes_pkey\"");
        }
        let row = InvitationCode {
            code: code.to_string(),
            generated_by: generated_by.to_string(),
            is_used: false,
            created_at: Utc::now(),
        };
        tables.invitation_codes.insert(code.to_string(), row.clone());
        Ok(row)
    }

    async fn mark_invitation_code_used(&self, code: &str) -> anyhow::Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.invitation_codes.get_mut(code) {
            Some(row) if !row.is_used => {
                row.is_used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_invitation_code(&self, code: &str) -> anyhow::Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(row) = tables.invitation_codes.get_mut(code) {
            row.is_used = false;
        }
        Ok(())
    }

    async fn count_accounts(&self, hidden_handle: &str) -> anyhow::Result<i64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .accounts
            .iter()
            .filter(|a| a.twitter_handle.as_deref() != Some(hidden_handle))
            .count() as i64)
    }

    async fn position_of(&self, account_id: &str) -> anyhow::Result<Option<Position>> {
        let tables = self.tables.lock().await;
        let ranked = ranked(&tables.accounts);
        Ok(ranked
            .iter()
            .position(|a| a.id == account_id)
            .map(|idx| Position {
                rank: idx as i64 + 1,
                total_points: ranked[idx].total_points,
            }))
    }

    async fn leaderboard(
        &self,
        hidden_handle: &str,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let tables = self.tables.lock().await;
        let offset = offset.max(0);
        Ok(ranked(&tables.accounts)
            .into_iter()
            .filter(|a| a.twitter_handle.as_deref() != Some(hidden_handle))
            .enumerate()
            .skip(offset as usize)
            .take(limit.max(0) as usize)
            .map(|(idx, a)| LeaderboardEntry {
                rank: idx as i64 + 1,
                id: a.id.clone(),
                twitter_handle: a.twitter_handle.clone(),
                total_points: a.total_points,
                invited_accounts_count: a.invited_accounts_count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(id: &str, code: &str, points: i64) -> NewAccount {
        NewAccount {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            twitter_handle: format!("@{id}"),
            invitation_code: code.to_string(),
            invited_by_account_id: None,
            total_points: points,
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_accounts_and_codes() {
        let store = MemoryStore::new();
        store.insert_account(new_account("a", "code-a", 10)).await.unwrap();
        assert!(store.insert_account(new_account("a", "code-b", 10)).await.is_err());
        assert!(store.insert_account(new_account("b", "code-a", 10)).await.is_err());
    }

    #[tokio::test]
    async fn patch_applies_increments() {
        let store = MemoryStore::new();
        store.insert_account(new_account("a", "code-a", 10)).await.unwrap();
        let patch = AccountPatch {
            add_points: 5,
            add_invited: 1,
            principal_id: Some("wallet".to_string()),
            last_token_balance: None,
        };
        let updated = store.update_account("a", &patch).await.unwrap().unwrap();
        assert_eq!(updated.total_points, 15);
        assert_eq!(updated.invited_accounts_count, 1);
        assert_eq!(updated.principal_id.as_deref(), Some("wallet"));
        assert!(store.update_account("missing", &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invitation_codes_are_single_use() {
        let store = MemoryStore::new();
        store.insert_invitation_code("abc123", "discord-1").await.unwrap();
        assert!(store.mark_invitation_code_used("abc123").await.unwrap());
        assert!(!store.mark_invitation_code_used("abc123").await.unwrap());
        assert!(!store.mark_invitation_code_used("nope").await.unwrap());

        store.release_invitation_code("abc123").await.unwrap();
        assert!(store.mark_invitation_code_used("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn leaderboard_hides_handle_and_ranks_by_points() {
        let store = MemoryStore::new();
        store.insert_account(new_account("low", "c1", 10)).await.unwrap();
        store.insert_account(new_account("sprout", "c2", 1_000)).await.unwrap();
        store.insert_account(new_account("high", "c3", 500)).await.unwrap();

        let page = store.leaderboard("@sprout", 0, 10).await.unwrap();
        let ids: Vec<_> = page.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["high", "low"]);
        assert_eq!(page[1].rank, 2);
        assert_eq!(store.count_accounts("@sprout").await.unwrap(), 2);

        let pos = store.position_of("high").await.unwrap().unwrap();
        assert_eq!(pos, Position { rank: 2, total_points: 500 });
    }
}
