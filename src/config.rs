use std::net::SocketAddr;

use anyhow::Context;
use axum_extra::extract::cookie::Key;

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub session_key: Key,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://moviebook.db?mode=rwc".to_string());

        // Key::derive_from needs at least 32 bytes of secret material.
        let secret = std::env::var("SESSION_SECRET").context("SESSION_SECRET is required")?;
        anyhow::ensure!(
            secret.len() >= 32,
            "SESSION_SECRET must be at least 32 characters long"
        );
        let session_key = Key::derive_from(secret.as_bytes());

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            session_key,
            cookie_secure,
        })
    }
}
