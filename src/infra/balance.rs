//! Where wallet token balances come from.

use async_trait::async_trait;
use std::fmt;

/// A balance or wallet supplied by the client that cannot be used.
///
/// Carried inside `anyhow::Error`; the HTTP layer answers it with 400.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceInputError {
    InvalidBalance(f64),
    InvalidWallet(String),
}

impl fmt::Display for BalanceInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceInputError::InvalidBalance(b) => write!(f, "invalid token balance: {}", b),
            BalanceInputError::InvalidWallet(reason) => write!(f, "invalid wallet: {}", reason),
        }
    }
}

impl std::error::Error for BalanceInputError {}

/// True when `err` was caused by client input rather than a store or RPC failure.
pub fn is_input_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<BalanceInputError>().is_some()
}

#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Token balance held by `wallet`. `reported` is the figure the client sent.
    async fn balance_of(&self, wallet: &str, reported: Option<f64>) -> anyhow::Result<f64>;
}

/// Trusts the balance reported by the wallet adapter.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportedBalance;

#[async_trait]
impl BalanceSource for ReportedBalance {
    async fn balance_of(&self, _wallet: &str, reported: Option<f64>) -> anyhow::Result<f64> {
        match reported {
            Some(b) if b.is_finite() && b >= 0.0 => Ok(b),
            Some(b) => Err(BalanceInputError::InvalidBalance(b).into()),
            None => Ok(0.0),
        }
    }
}
