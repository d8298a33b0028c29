//! Leaderboard HTTP service
//!
//! Configured through `LEADERBOARD_BIND_ADDR`, `LEADERBOARD_SCORES_FILE`
//! and `LEADERBOARD_JSON_LIMIT`.

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use dog_runner::leaderboard::server::{self, ServerConfig};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    server::run(ServerConfig::from_env()).await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The service only runs natively
}
