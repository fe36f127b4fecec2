//! The waitlist procedures: code redemption, referral accounting, wallet
//! tiers, tasks and the leaderboard.
//!
//! Every procedure is a plain sequence of `Store` calls. Business rejections
//! come back as outcome enums; `Err` is reserved for store/RPC failures.

use crate::domain::model::{
    generate_invitation_code, Account, AccountPatch, BlacklistEntry, LeaderboardEntry,
    NewAccount, NewPointEntry, PointEntry, Position, User,
};
use crate::domain::points::{
    format_balance, incremental_points, referral_share, sign_up_points, tier_for_balance,
    wallet_connect_points, REFERRAL_POINTS,
};
use crate::domain::tasks::Task;
use crate::infra::balance::{BalanceInputError, BalanceSource};
use crate::storage::Store;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Largest leaderboard page served at once.
pub const MAX_PAGE_SIZE: i64 = 100;

const CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Handle left out of the public leaderboard and its count.
    pub hidden_handle: String,
    /// Base of referral links, e.g. `https://example.xyz`.
    pub share_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Created {
        account: Account,
        sign_up_points: i64,
    },
    AlreadyRegistered,
    Banned,
    UnknownCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WalletOutcome {
    Connected { points_awarded: i64, balance: f64 },
    AlreadyConnected,
    NoAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct BalanceUpdate {
    pub points_awarded: i64,
    pub new_total_points: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Awarded { points: i64 },
    AlreadyCompleted,
    NoAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShareText {
    pub text: String,
    pub link: String,
    pub invitation_code: String,
}

/// How a redeemed code resolved.
enum Redemption {
    /// Another account's reusable referral code.
    Referral(Account),
    /// A single-use code, already marked used; the issuer may own an account.
    SingleUse { issuer: Option<Account> },
}

pub struct WaitlistService {
    store: Arc<dyn Store>,
    balances: Arc<dyn BalanceSource>,
    settings: ServiceSettings,
}

impl WaitlistService {
    pub fn new(
        store: Arc<dyn Store>,
        balances: Arc<dyn BalanceSource>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            balances,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub async fn fetch_account(&self, user: &User) -> anyhow::Result<Option<Account>> {
        self.store.account_by_id(&user.id).await
    }

    pub async fn fetch_banned_account(&self, user: &User) -> anyhow::Result<Option<BlacklistEntry>> {
        match user.email.as_deref() {
            Some(email) => self.store.blacklisted(email).await,
            None => Ok(None),
        }
    }

    // ---------------------------------------------------------------------
    // Invitation codes
    // ---------------------------------------------------------------------

    /// Redeems `code` for `user`, creating their account and crediting the referrer.
    pub async fn claim_code(&self, user: &User, code: &str) -> anyhow::Result<ClaimOutcome> {
        let code = code.trim();

        if self.fetch_account(user).await?.is_some() {
            tracing::info!(user_id = %user.id, "account already exists");
            return Ok(ClaimOutcome::AlreadyRegistered);
        }

        if self.fetch_banned_account(user).await?.is_some() {
            tracing::warn!(user_id = %user.id, "banned account tried to redeem a code");
            return Ok(ClaimOutcome::Banned);
        }

        if code.is_empty() {
            return Ok(ClaimOutcome::UnknownCode);
        }

        let redemption = match self.resolve_code(code).await? {
            Some(r) => r,
            None => {
                tracing::info!(user_id = %user.id, code, "no account found with that code");
                return Ok(ClaimOutcome::UnknownCode);
            }
        };
        let (referrer, single_use) = match redemption {
            Redemption::Referral(account) => (Some(account), false),
            Redemption::SingleUse { issuer } => (issuer, true),
        };

        let points = sign_up_points(code);
        let handle = user.handle();

        let created = match self.fresh_invitation_code().await {
            Ok(invitation_code) => {
                self.store
                    .insert_account(NewAccount {
                        id: user.id.clone(),
                        email: user.email.clone(),
                        twitter_handle: handle.clone(),
                        invitation_code,
                        invited_by_account_id: referrer.as_ref().map(|r| r.id.clone()),
                        total_points: points,
                    })
                    .await
            }
            Err(e) => Err(e),
        };
        let account = match created {
            Ok(account) => account,
            Err(e) => {
                if single_use {
                    self.release_code(code).await;
                }
                return Err(e);
            }
        };

        let mut ledger = vec![NewPointEntry::new(&account.id, points, "Sign Up")];

        if let Some(referrer) = &referrer {
            let patch = AccountPatch {
                add_points: REFERRAL_POINTS,
                add_invited: 1,
                ..AccountPatch::default()
            };
            self.store.update_account(&referrer.id, &patch).await?;
            ledger.push(NewPointEntry::new(
                &referrer.id,
                REFERRAL_POINTS,
                format!("Referral of {}", handle),
            ));
        }

        self.store.insert_points(&ledger).await?;

        tracing::info!(
            user_id = %account.id,
            referrer = referrer.as_ref().map(|r| r.id.as_str()),
            points,
            "account created from invitation code"
        );

        Ok(ClaimOutcome::Created {
            account,
            sign_up_points: points,
        })
    }

    async fn resolve_code(&self, code: &str) -> anyhow::Result<Option<Redemption>> {
        if let Some(account) = self.store.account_by_invitation_code(code).await? {
            return Ok(Some(Redemption::Referral(account)));
        }

        match self.store.invitation_code(code).await? {
            Some(row) if !row.is_used => {
                // Losing the race for a single-use code reads as an unknown code.
                if !self.store.mark_invitation_code_used(code).await? {
                    return Ok(None);
                }
                let issuer = self.store.account_by_id(&row.generated_by).await?;
                Ok(Some(Redemption::SingleUse { issuer }))
            }
            _ => Ok(None),
        }
    }

    /// Makes a single-use code redeemable again after a failed account insert.
    async fn release_code(&self, code: &str) {
        if let Err(e) = self.store.release_invitation_code(code).await {
            tracing::error!(code, "single-use code left marked used: {e:#}");
        }
    }

    async fn fresh_invitation_code(&self) -> anyhow::Result<String> {
        for _ in 0..CODE_ATTEMPTS {
            let candidate = generate_invitation_code();
            let taken = self
                .store
                .account_by_invitation_code(&candidate)
                .await?
                .is_some()
                || self.store.invitation_code(&candidate).await?.is_some();
            if !taken {
                return Ok(candidate);
            }
        }
        anyhow::bail!("could not generate a unique invitation code")
    }

    /// Issues a single-use invitation code on behalf of `generated_by`.
    pub async fn issue_invitation_code(
        &self,
        generated_by: &str,
    ) -> anyhow::Result<crate::domain::model::InvitationCode> {
        let code = self.fresh_invitation_code().await?;
        self.store.insert_invitation_code(&code, generated_by).await
    }

    // ---------------------------------------------------------------------
    // Wallet
    // ---------------------------------------------------------------------

    pub async fn has_connected_wallet(&self, user: &User) -> anyhow::Result<bool> {
        Ok(self
            .fetch_account(user)
            .await?
            .is_some_and(|a| a.principal_id.is_some()))
    }

    /// Links a wallet to the caller's account once and awards the holdings tier.
    pub async fn connect_wallet(
        &self,
        user: &User,
        principal_id: &str,
        reported_balance: Option<f64>,
    ) -> anyhow::Result<WalletOutcome> {
        let principal_id = principal_id.trim();
        if principal_id.is_empty() {
            return Err(BalanceInputError::InvalidWallet(
                "principal_id must not be empty".to_string(),
            )
            .into());
        }

        let Some(account) = self.fetch_account(user).await? else {
            return Ok(WalletOutcome::NoAccount);
        };

        if account.principal_id.is_some() {
            tracing::info!(user_id = %account.id, "wallet already connected, skipping award");
            return Ok(WalletOutcome::AlreadyConnected);
        }

        let balance = self
            .balances
            .balance_of(principal_id, reported_balance)
            .await?;
        let tier_points = tier_for_balance(balance).points;
        let award = wallet_connect_points(balance);

        let patch = AccountPatch {
            add_points: award,
            principal_id: Some(principal_id.to_string()),
            last_token_balance: Some(balance.to_string()),
            ..AccountPatch::default()
        };
        self.store.update_account(&account.id, &patch).await?;

        let note = if tier_points > 0 {
            format!(
                "Connected wallet with {} HODI ({} points)",
                format_balance(balance),
                tier_points
            )
        } else {
            "Wallet Connection".to_string()
        };
        self.store
            .insert_points(&[NewPointEntry::new(&account.id, award, note)])
            .await?;

        if let Some(referrer_id) = account.invited_by_account_id.as_deref() {
            if let Err(e) = self
                .credit_referrer(referrer_id, referral_share(award), "Referral HODI Holdings Bonus")
                .await
            {
                tracing::warn!(referrer_id, "referrer wallet bonus not credited: {e:#}");
            }
        }

        tracing::info!(user_id = %account.id, balance, award, "wallet connected");
        Ok(WalletOutcome::Connected {
            points_awarded: award,
            balance,
        })
    }

    /// Records a new token balance for `account_id`, paying out upward tier crossings.
    ///
    /// Returns `None` when the account does not exist.
    pub async fn update_wallet_balance(
        &self,
        account_id: &str,
        new_balance: f64,
    ) -> anyhow::Result<Option<BalanceUpdate>> {
        if !new_balance.is_finite() || new_balance < 0.0 {
            return Err(BalanceInputError::InvalidBalance(new_balance).into());
        }

        let Some(account) = self.store.account_by_id(account_id).await? else {
            return Ok(None);
        };

        let previous = account.last_balance();
        let award = incremental_points(previous, new_balance);

        let patch = AccountPatch {
            add_points: award,
            last_token_balance: Some(new_balance.to_string()),
            ..AccountPatch::default()
        };
        let updated = self
            .store
            .update_account(account_id, &patch)
            .await?
            .ok_or_else(|| anyhow::anyhow!("account {} vanished during balance update", account_id))?;

        if award > 0 {
            let note = format!(
                "HODI Token Balance Increase ({} → {})",
                format_balance(previous),
                format_balance(new_balance)
            );
            if let Err(e) = self
                .store
                .insert_points(&[NewPointEntry::new(account_id, award, note)])
                .await
            {
                // The account total already includes the award.
                tracing::error!(account_id, "balance increase not written to ledger: {e:#}");
            }
        }

        Ok(Some(BalanceUpdate {
            points_awarded: award,
            new_total_points: updated.total_points,
        }))
    }

    /// Re-reads the caller's wallet balance and applies `update_wallet_balance`.
    pub async fn refresh_wallet_balance(
        &self,
        user: &User,
        reported_balance: Option<f64>,
    ) -> anyhow::Result<Option<BalanceUpdate>> {
        let Some(account) = self.fetch_account(user).await? else {
            return Ok(None);
        };
        let Some(wallet) = account.principal_id.as_deref() else {
            return Ok(None);
        };
        let balance = self.balances.balance_of(wallet, reported_balance).await?;
        self.update_wallet_balance(&account.id, balance).await
    }

    // ---------------------------------------------------------------------
    // Tasks
    // ---------------------------------------------------------------------

    pub async fn task_completed(&self, user: &User, task: Task) -> anyhow::Result<bool> {
        self.store.has_points_note(&user.id, task.note()).await
    }

    pub async fn complete_task(&self, user: &User, task: Task) -> anyhow::Result<TaskOutcome> {
        if self.task_completed(user, task).await? {
            tracing::info!(user_id = %user.id, %task, "task points already added");
            return Ok(TaskOutcome::AlreadyCompleted);
        }

        let Some(account) = self.fetch_account(user).await? else {
            return Ok(TaskOutcome::NoAccount);
        };

        let points = task.points();
        self.store
            .insert_points(&[NewPointEntry::new(&account.id, points, task.note())])
            .await?;
        self.store
            .update_account(&account.id, &AccountPatch::points(points))
            .await?;

        if let Some(referrer_id) = account.invited_by_account_id.as_deref() {
            self.credit_referrer(referrer_id, referral_share(points), task.referral_note())
                .await?;
        }

        Ok(TaskOutcome::Awarded { points })
    }

    async fn credit_referrer(&self, referrer_id: &str, amount: i64, note: &str) -> anyhow::Result<()> {
        if amount <= 0 {
            return Ok(());
        }
        if self
            .store
            .update_account(referrer_id, &AccountPatch::points(amount))
            .await?
            .is_none()
        {
            tracing::warn!(referrer_id, "referrer account not found");
            return Ok(());
        }
        self.store
            .insert_points(&[NewPointEntry::new(referrer_id, amount, note)])
            .await
    }

    // ---------------------------------------------------------------------
    // Points and leaderboard
    // ---------------------------------------------------------------------

    pub async fn points_history(&self, user: &User) -> anyhow::Result<Vec<PointEntry>> {
        self.store.points_for_account(&user.id).await
    }

    pub async fn leaderboard_count(&self) -> anyhow::Result<i64> {
        self.store.count_accounts(&self.settings.hidden_handle).await
    }

    pub async fn leaderboard_position(&self, user: &User) -> anyhow::Result<Option<Position>> {
        self.store.position_of(&user.id).await
    }

    /// Entries `start..=end` of the visible leaderboard (0-based, inclusive).
    pub async fn leaderboard_page(
        &self,
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let start = start.max(0);
        if end < start {
            return Ok(Vec::new());
        }
        let limit = end.saturating_sub(start).saturating_add(1).min(MAX_PAGE_SIZE);
        self.store
            .leaderboard(&self.settings.hidden_handle, start, limit)
            .await
    }

    /// Referral message carrying the caller's invitation link.
    pub async fn share_text(&self, user: &User) -> anyhow::Result<Option<ShareText>> {
        let Some(account) = self.fetch_account(user).await? else {
            return Ok(None);
        };
        Ok(Some(ShareText {
            text: self.share_message(&account.invitation_code),
            link: self.referral_link(&account.invitation_code),
            invitation_code: account.invitation_code,
        }))
    }

    fn share_message(&self, invitation_code: &str) -> String {
        format!(
            "I just signed up for the waitlist!\n\n\
             Use my referral code to join the waitlist & earn bonus points for an airdrop: {}",
            self.referral_link(invitation_code)
        )
    }

    fn referral_link(&self, invitation_code: &str) -> String {
        format!(
            "{}/?ref={}",
            self.settings.share_base_url.trim_end_matches('/'),
            invitation_code
        )
    }
}
