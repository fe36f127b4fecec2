//! Centralized configuration (environment variables + defaults).

use anyhow::Context;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_HIDDEN_HANDLE: &str = "@sprout";
pub const DEFAULT_SHARE_BASE_URL: &str = "https://nft.xyz";

/// Which `Store` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Solana settings used to read wallet token balances on-chain.
#[derive(Debug, Clone)]
pub struct SolanaConfig {
    pub rpc_url: String,
    pub token_mint: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub hidden_handle: String,
    pub share_base_url: String,
    pub solana: Option<SolanaConfig>,
}

impl Config {
    /// Reads the configuration from the process environment (after `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let store = match non_empty("STORE").as_deref() {
            None | Some("postgres") => StoreKind::Postgres,
            Some("memory") => StoreKind::Memory,
            Some(other) => anyhow::bail!("STORE must be `postgres` or `memory`, got `{other}`"),
        };

        let database_url = non_empty("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set (or STORE=memory)");
        }

        let jwt_secret = non_empty("JWT_SECRET").context("JWT_SECRET must be set")?;

        let solana = match (non_empty("SOLANA_RPC_URL"), non_empty("HODI_TOKEN_MINT")) {
            (Some(rpc_url), Some(token_mint)) => Some(SolanaConfig { rpc_url, token_mint }),
            _ => None,
        };

        Ok(Self {
            store,
            database_url,
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            hidden_handle: non_empty("LEADERBOARD_HIDDEN_HANDLE")
                .unwrap_or_else(|| DEFAULT_HIDDEN_HANDLE.to_string()),
            share_base_url: non_empty("SHARE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.to_string()),
            solana,
        })
    }

    /// Database URL, required for the Postgres store.
    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set")
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
