// src/main.rs

use dotenvy::dotenv;
use quiz_backend::config::{Config, TokenScheme};
use quiz_backend::routes;
use quiz_backend::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if config.token_scheme == TokenScheme::Mock {
        tracing::warn!("JWT_SECRET not set; issuing unsigned mock tokens");
    }
    if !config.hash_passwords {
        tracing::warn!("HASH_PASSWORDS is off; passwords are stored in plaintext");
    }

    // Build the in-memory store and seed it
    let state = match AppState::in_memory(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to seed store: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Store ready (demo data: {})", config.seed_demo_data);

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {}", config.bind_addr);

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
