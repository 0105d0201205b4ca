use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde_json::json;

use crate::{
    AppState, auth,
    error::{ApiError, ApiResult},
    models::{LoginRequest, RegisterRequest},
    session::{self, SessionUser},
};

use super::ApiJson;

pub async fn register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let new = req.validate()?;

    // The unique index still backstops this pre-check under concurrency.
    if state.store.find_user_by_email(&new.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered"));
    }

    let hash = auth::hash_password(&new.password)?;
    let user = state.store.create_user(&new.name, &new.email, &hash).await?;

    let session_user =
        SessionUser { id: user.id, email: user.email.clone(), name: user.name.clone() };
    let jar = session::insert(jar, &session_user, state.config.cookie_secure)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user": { "id": user.id, "name": user.name, "email": user.email },
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (email, password) = req.validate()?;

    // Same response for unknown email and wrong password.
    let Some(user) = state.store.find_user_by_email(&email).await? else {
        return Err(ApiError::InvalidCredentials);
    };
    if !auth::verify_password(&password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let session_user =
        SessionUser { id: user.id, email: user.email.clone(), name: user.name.clone() };
    let jar = session::insert(jar, &session_user, state.config.cookie_secure)?;

    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "user": { "id": user.id, "name": user.name, "email": user.email },
        })),
    ))
}

pub async fn logout(jar: PrivateCookieJar) -> impl IntoResponse {
    let jar = session::destroy(jar);
    (jar, Json(json!({ "success": true, "message": "Logout successful" })))
}
