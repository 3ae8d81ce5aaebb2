pub mod client;

pub use client::{CoinGeckoClient, DEFAULT_BASE_URL};
