use crate::errors::AppError;
use crate::identity::UserId;
use crate::models::{
    CreateHabitRequest, DashboardResponse, HabitView, SuccessResponse, ToggleRequest,
    ToggleResponse,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};

pub async fn health() -> &'static str {
    "OK"
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<DashboardResponse>, AppError> {
    Ok(Json(state.habits.get_dashboard(user.as_str()).await?))
}

pub async fn list_habits(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<Vec<HabitView>>, AppError> {
    Ok(Json(state.habits.list_habits(user.as_str()).await?))
}

pub async fn create_habit(
    State(state): State<AppState>,
    user: UserId,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<Json<HabitView>, AppError> {
    let name = payload.name.unwrap_or_default();
    let habit = state
        .habits
        .create_habit(user.as_str(), &name, payload.icon.as_deref())
        .await?;
    Ok(Json(state.habits.habit_view(habit)))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.habits.delete_habit(user.as_str(), &id).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let response = state
        .habits
        .toggle_completion(user.as_str(), &id, payload.is_completed)
        .await?;
    Ok(Json(response))
}

pub async fn reset_profile(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<SuccessResponse>, AppError> {
    state.habits.reset_profile(user.as_str()).await?;
    Ok(Json(SuccessResponse::ok()))
}
