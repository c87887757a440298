use std::env;

use anyhow::{anyhow, bail, Context};
use chrono::{FixedOffset, NaiveTime};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,

    // Daily reset job
    pub daily_reset_time: NaiveTime,
    pub daily_reset_offset: FixedOffset,
    pub daily_reset_concurrency: usize,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let port = var_or("PORT", "8080")
            .parse()
            .context("PORT must be a number")?;
        let database_max_connections = var_or("DATABASE_MAX_CONNECTIONS", "20")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a number")?;

        let daily_reset_time = parse_reset_time(&var_or("DAILY_RESET_TIME", "00:00"))?;
        let daily_reset_offset =
            parse_utc_offset(&var_or("DAILY_RESET_UTC_OFFSET_MINUTES", "0"))?;
        let daily_reset_concurrency: usize = var_or("DAILY_RESET_CONCURRENCY", "8")
            .parse()
            .context("DAILY_RESET_CONCURRENCY must be a number")?;
        if daily_reset_concurrency == 0 {
            bail!("DAILY_RESET_CONCURRENCY must be at least 1");
        }

        Ok(Self {
            database_url,
            database_max_connections,
            host: var_or("HOST", "0.0.0.0"),
            port,
            frontend_url: var_or("FRONTEND_URL", "http://localhost:3000"),
            jwt_secret,
            daily_reset_time,
            daily_reset_offset,
            daily_reset_concurrency,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `HH:MM` wall-clock time.
pub fn parse_reset_time(value: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("DAILY_RESET_TIME must be HH:MM, got {value:?}"))
}

/// Minutes east of UTC, e.g. `-300` for UTC-05:00.
pub fn parse_utc_offset(value: &str) -> anyhow::Result<FixedOffset> {
    let minutes: i32 = value
        .trim()
        .parse()
        .context("DAILY_RESET_UTC_OFFSET_MINUTES must be a number")?;
    if minutes.abs() >= 24 * 60 {
        bail!("DAILY_RESET_UTC_OFFSET_MINUTES must be within one day, got {minutes}");
    }
    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| anyhow!("invalid UTC offset of {minutes} minutes"))
}
