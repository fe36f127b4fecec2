pub mod client;

pub use client::SolanaTokenBalance;
