use std::sync::Arc;

use waitlist_points::crypto::jwt::sign_token;
use waitlist_points::infra::config::StoreKind;
use waitlist_points::solana::SolanaTokenBalance;
use waitlist_points::{
    Config, MemoryStore, PgStore, ReportedBalance, ServiceSettings, Store, User, WaitlistService,
};

const TOKEN_TTL_SECS: u64 = 24 * 3600;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--issue-code <generated_by>] [--ban <email>] [--mint-token <user_id>]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL (or STORE=memory), JWT_SECRET\n\
         Optional:\n\
           SOLANA_RPC_URL, HODI_TOKEN_MINT, LEADERBOARD_HIDDEN_HANDLE, SHARE_BASE_URL\n"
    );
    std::process::exit(2);
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == flag)?;
    match args.get(idx + 1) {
        Some(v) if !v.starts_with("--") => Some(v.clone()),
        _ => usage_and_exit(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waitlist_points=info,preflight=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let issue_for = flag_value(&args, "--issue-code");
    let ban_email = flag_value(&args, "--ban");
    let token_for = flag_value(&args, "--mint-token");

    let config = Config::from_env()?;

    println!("> Preflight:");
    println!("  STORE={:?}", config.store);
    println!("  BIND_ADDR={}", config.bind_addr);
    println!("  LEADERBOARD_HIDDEN_HANDLE={}", config.hidden_handle);
    println!("  SHARE_BASE_URL={}", config.share_base_url);

    let store: Arc<dyn Store> = match config.store {
        StoreKind::Postgres => {
            let store = PgStore::connect(config.database_url()?).await?;
            println!("  Database: connected, schema ensured");
            Arc::new(store)
        }
        StoreKind::Memory => {
            println!("  Database: in-memory (nothing persisted)");
            Arc::new(MemoryStore::new())
        }
    };
    store.ping().await?;
    println!("  Accounts: {}", store.count_accounts(&config.hidden_handle).await?);

    match &config.solana {
        Some(solana_config) => {
            let source = SolanaTokenBalance::new(solana_config)?;
            let version = source.node_version().await?;
            println!("  Solana RPC: {} (version {})", solana_config.rpc_url, version);
            println!("  HODI mint: {}", source.mint());
        }
        None => println!("  Solana RPC: not configured (client-reported balances)"),
    }

    let service = WaitlistService::new(
        store.clone(),
        Arc::new(ReportedBalance),
        ServiceSettings {
            hidden_handle: config.hidden_handle.clone(),
            share_base_url: config.share_base_url.clone(),
        },
    );

    if let Some(generated_by) = issue_for {
        let code = service.issue_invitation_code(&generated_by).await?;
        println!("> Issued invitation code {} for {}", code.code, code.generated_by);
    }

    if let Some(email) = ban_email {
        store.insert_blacklist(&email, Some("preflight")).await?;
        println!("> Blacklisted {}", email);
    }

    if let Some(user_id) = token_for {
        let user = User {
            id: user_id,
            email: None,
            preferred_username: None,
        };
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let token = sign_token(&user, &config.jwt_secret, now, TOKEN_TTL_SECS)?;
        println!("> Bearer token for {} (valid 24h):\n{}", user.id, token);
    }

    println!("> Preflight OK");
    Ok(())
}
