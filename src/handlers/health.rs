use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "habitstreak-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness: database reachable. Also reports when the daily reset fires next.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    let now = Utc::now();
    let daily_reset = json!({
        "today": state.schedule.today(now),
        "next_run": state.schedule.next_trigger_after(now),
    });

    let (status, label, database) = if db_ok {
        (StatusCode::OK, "ready", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready", "failed")
    };

    (
        status,
        Json(json!({
            "status": label,
            "checks": { "database": database },
            "daily_reset": daily_reset,
        })),
    )
}
