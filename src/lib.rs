pub mod app;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::waitlist_service::{ServiceSettings, WaitlistService};
pub use domain::model::User;
pub use infra::balance::{BalanceSource, ReportedBalance};
pub use infra::config::Config;
pub use infra::solana;
pub use storage::{MemoryStore, PgStore, Store};

use std::sync::Arc;

/// Builds the service and HTTP state described by `config`.
pub async fn build_state(config: &Config) -> anyhow::Result<transport::http::AppState> {
    let store: Arc<dyn Store> = match config.store {
        infra::config::StoreKind::Postgres => {
            Arc::new(PgStore::connect(config.database_url()?).await?)
        }
        infra::config::StoreKind::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let balances: Arc<dyn BalanceSource> = match &config.solana {
        Some(solana_config) => {
            let source = solana::SolanaTokenBalance::new(solana_config)?;
            tracing::info!(mint = %source.mint(), "reading wallet balances from Solana RPC");
            Arc::new(source)
        }
        None => Arc::new(ReportedBalance),
    };

    let service = WaitlistService::new(
        store,
        balances,
        ServiceSettings {
            hidden_handle: config.hidden_handle.clone(),
            share_base_url: config.share_base_url.clone(),
        },
    );

    Ok(transport::http::AppState {
        service: Arc::new(service),
        jwt_secret: Arc::from(config.jwt_secret.as_str()),
    })
}
