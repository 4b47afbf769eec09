use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    extract::Payload,
    state::AppState,
    users::{
        dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        password::{hash_password_blocking, verify_password_blocking},
        repo_types::UserProfile,
        services::{validate_password, validate_registration},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/:id", get(get_user))
}

#[instrument(skip(state, id))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let Path(id) = id.map_err(|e| {
        warn!(reason = %e.body_text(), "rejected user id");
        AppError::BadRequest("Invalid user id".into())
    })?;

    let rows = state.store.find_profiles(id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Payload(payload): Payload<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let email = validate_registration(&payload.email, &payload.password).map_err(|e| {
        warn!(email = %payload.email, reason = %e, "registration rejected");
        e
    })?;

    // No write happens unless hashing succeeded.
    let hash = hash_password_blocking(state.passwords.clone(), payload.password).await?;

    let result = state.store.insert(&email, &hash).await.map_err(|e| {
        warn!(email = %email, error = %e, "insert user failed");
        AppError::from(e)
    })?;

    info!(user_id = result.insert_id, email = %email, "user registered");
    Ok(Json(result.into()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Payload(payload): Payload<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_password(&payload.password)?;

    let Some(creds) = state.store.find_credentials(payload.id).await? else {
        warn!(user_id = payload.id, "login unknown user");
        return Err(AppError::UserNotFound(payload.id));
    };

    let ok = verify_password_blocking(state.passwords.clone(), payload.password, creds.password_hash)
        .await?;
    if !ok {
        warn!(user_id = creds.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = creds.id, "user logged in");
    Ok(Json(LoginResponse {
        id: creds.id,
        email: creds.email,
        authenticated: true,
    }))
}
