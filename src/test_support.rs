use std::sync::Arc;

use chrono::{Duration, FixedOffset, NaiveTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::auth::jwt::{Claims, TokenType};
use crate::config::Config;
use crate::jobs::DailySchedule;
use crate::AppState;

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://127.0.0.1:1/habitstreak_test".into(),
        database_max_connections: 1,
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3000".into(),
        jwt_secret: "test-secret".into(),
        daily_reset_time: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        daily_reset_offset: FixedOffset::east_opt(0).unwrap(),
        daily_reset_concurrency: 2,
    }
}

/// State backed by a pool that never connects unless a query runs.
pub fn test_state() -> AppState {
    let config = test_config();
    let db = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy(&config.database_url)
        .unwrap();
    AppState {
        db,
        schedule: DailySchedule::from_config(&config),
        config: Arc::new(config),
    }
}

pub fn token(user_id: Uuid, token_type: TokenType, secret: &str, ttl: Duration) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: "someone@example.com".into(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        token_type,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn access_token(user_id: Uuid) -> String {
    token(user_id, TokenType::Access, "test-secret", Duration::minutes(5))
}
