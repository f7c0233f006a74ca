//! Admin server: loads configuration, prepares the store, and serves the admin API.
//!
//! Run from repo root: `cargo run -p admin-server`
//! Set `STORE_BACKEND=memory` to run without PostgreSQL.

use tutor_admin::{apply_migrations, app, ensure_database_exists, init_tracing, AppConfig, AppState, StoreBackend};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing();

    let state = match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            AppState::in_memory(config)
        }
        StoreBackend::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            apply_migrations(&pool, &config.schema).await?;
            AppState::postgres(pool, config)
        }
    };

    let listener = TcpListener::bind(&state.config.bind_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Admin server listening on http://{}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
