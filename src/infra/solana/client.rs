// Reads SPL token balances from a Solana RPC node.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::str::FromStr;

use crate::infra::balance::{BalanceInputError, BalanceSource};
use crate::infra::config::SolanaConfig;

/// Sums the holdings of one mint across every token account of a wallet.
pub struct SolanaTokenBalance {
    client: RpcClient,
    mint: Pubkey,
}

impl SolanaTokenBalance {
    pub fn new(config: &SolanaConfig) -> anyhow::Result<Self> {
        let mint = Pubkey::from_str(&config.token_mint)
            .map_err(|e| anyhow::anyhow!("HODI_TOKEN_MINT is not a valid pubkey: {}", e))?;
        let client =
            RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed());
        Ok(Self { client, mint })
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    /// Version string reported by the RPC node.
    pub async fn node_version(&self) -> anyhow::Result<String> {
        Ok(self.client.get_version().await?.solana_core)
    }

    pub async fn token_balance(&self, owner: &Pubkey) -> anyhow::Result<f64> {
        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::Mint(self.mint))
            .await?;

        let mut total = 0.0;
        for keyed in accounts {
            let token_account = Pubkey::from_str(&keyed.pubkey)
                .map_err(|e| anyhow::anyhow!("RPC returned invalid token account: {}", e))?;
            let amount = self.client.get_token_account_balance(&token_account).await?;
            total += match amount.ui_amount {
                Some(v) => v,
                None => amount.ui_amount_string.parse::<f64>().unwrap_or(0.0),
            };
        }
        Ok(total)
    }
}

#[async_trait]
impl BalanceSource for SolanaTokenBalance {
    async fn balance_of(&self, wallet: &str, reported: Option<f64>) -> anyhow::Result<f64> {
        let owner = Pubkey::from_str(wallet.trim()).map_err(|e| {
            BalanceInputError::InvalidWallet(format!("`{}` is not a Solana address: {}", wallet, e))
        })?;
        let on_chain = self.token_balance(&owner).await?;
        if let Some(claimed) = reported {
            if (claimed - on_chain).abs() > f64::EPSILON {
                tracing::debug!(wallet, claimed, on_chain, "reported balance differs from chain");
            }
        }
        Ok(on_chain)
    }
}
