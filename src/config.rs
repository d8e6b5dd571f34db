// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

/// How session tokens are minted and checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenScheme {
    /// Opaque `mock-token-<id>` tokens, no signature or expiry.
    Mock,
    /// HS256 JWTs carrying the user id and role.
    Jwt { secret: String, expiration: u64 },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    pub token_scheme: TokenScheme,
    pub admin_username: String,
    pub admin_password: String,
    pub seed_demo_data: bool,
    pub hash_passwords: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|addr| addr.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let token_scheme = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => TokenScheme::Jwt {
                secret,
                expiration: env::var("JWT_EXPIRATION")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(86_400),
            },
            _ => TokenScheme::Mock,
        };

        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password =
            env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        Self {
            bind_addr,
            rust_log,
            token_scheme,
            admin_username,
            admin_password,
            seed_demo_data: env_flag("SEED_DEMO_DATA", true),
            hash_passwords: env_flag("HASH_PASSWORDS", true),
        }
    }
}

impl Default for Config {
    /// Mock tokens, plaintext passwords and the demo data set; what the tests run against.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            rust_log: "error".to_string(),
            token_scheme: TokenScheme::Mock,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            seed_demo_data: true,
            hash_passwords: false,
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
