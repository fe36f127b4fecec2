pub mod auth;
pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod account;
    pub mod common;
    pub mod health;
    pub mod invitation;
    pub mod leaderboard;
    pub mod tasks;
    pub mod wallet;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
