//! Leaderboard service
//!
//! Keeps the best score per wallet address:
//! - `store`: JSON score file with save-if-higher updates
//! - `server`: HTTP API over the store (native only)

pub mod store;

#[cfg(not(target_arch = "wasm32"))]
pub mod server;

pub use store::{ScoreBook, StoreError};
