use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::habit::{
    is_reset_for, Habit, HabitResponse, StreakInfo, TrackMode, TrackRequest,
};
use crate::tracking::CheckIn;
use crate::AppState;

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<HabitResponse>>> {
    let today = state.schedule.today(Utc::now());

    let habits = sqlx::query_as::<_, Habit>(
        r#"
        SELECT * FROM habits
        WHERE user_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(
        habits
            .into_iter()
            .map(|habit| HabitResponse::new(habit, today))
            .collect(),
    ))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<HabitResponse>> {
    let habit = find_owned_habit(&state, habit_id, auth_user.id).await?;
    Ok(Json(HabitResponse::new(habit, state.schedule.today(Utc::now()))))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<StreakInfo>> {
    let habit = find_owned_habit(&state, habit_id, auth_user.id).await?;
    let response = HabitResponse::new(habit, state.schedule.today(Utc::now()));
    Ok(Json(response.streak()))
}

/// Record today's progress. A habit the daily reset has not reached yet for
/// today is rolled over first, so yesterday's progress reaches the streaks.
pub async fn track_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<TrackRequest>,
) -> AppResult<Json<HabitResponse>> {
    let check_in = check_in_from_request(&body)?;
    let today = state.schedule.today(Utc::now());

    let mut tx = state.db.begin().await?;

    // Row lock keeps a concurrent reset from interleaving with this update
    let mut habit = sqlx::query_as::<_, Habit>(
        "SELECT * FROM habits WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(habit_id)
    .bind(auth_user.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Habit not found".into()))?;

    if !habit.is_active {
        return Err(AppError::Conflict("Habit is inactive".into()));
    }

    let pending_reset = !is_reset_for(habit.last_reset_on, today);
    habit.check_in(today, check_in)?;

    let habit = sqlx::query_as::<_, Habit>(
        r#"
        UPDATE habits SET
            last_tracked_date = $2,
            today_completed = $3,
            today_quantity = $4,
            current_streak = $5,
            best_streak = $6,
            last_reset_on = $7,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(habit.id)
    .bind(habit.last_tracked_date)
    .bind(habit.today_completed)
    .bind(habit.today_quantity)
    .bind(habit.current_streak)
    .bind(habit.best_streak)
    .bind(habit.last_reset_on)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        habit_id = %habit.id,
        user_id = %auth_user.id,
        %today,
        pending_reset,
        "Habit progress recorded"
    );

    Ok(Json(HabitResponse::new(habit, today)))
}

async fn find_owned_habit(state: &AppState, habit_id: Uuid, user_id: Uuid) -> AppResult<Habit> {
    sqlx::query_as::<_, Habit>("SELECT * FROM habits WHERE id = $1 AND user_id = $2")
        .bind(habit_id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))
}

fn check_in_from_request(body: &TrackRequest) -> AppResult<CheckIn> {
    body.validate()?;

    match (body.completed, body.quantity) {
        (Some(done), None) => Ok(CheckIn::Done(done)),
        (None, Some(quantity)) => {
            let quantity = u32::try_from(quantity)
                .map_err(|_| AppError::Validation("Quantity must not be negative".into()))?;
            Ok(match body.mode {
                TrackMode::Add => CheckIn::Add(quantity),
                TrackMode::Set => CheckIn::SetQuantity(quantity),
            })
        }
        _ => Err(AppError::Validation(
            "Provide exactly one of completed or quantity".into(),
        )),
    }
}
