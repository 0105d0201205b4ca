use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde_json::json;

use crate::{
    AppState, auth,
    error::{ApiError, ApiResult},
    models::{UserProfileJson, UserUpdateRequest},
    session,
};

use super::ApiJson;

pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = state.store.find_user(id).await?.ok_or(ApiError::NotFound("User"))?;
    let rating = state.store.rating_for_user(user.id).await?;
    Ok(Json(json!({ "success": true, "user": UserProfileJson::new(user, rating) })))
}

pub async fn update(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(id): Path<i32>,
    ApiJson(req): ApiJson<UserUpdateRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let current = auth::require_user(&jar)?;
    let target = state.store.find_user(id).await?.ok_or(ApiError::NotFound("User"))?;
    auth::authorize(
        &current,
        auth::Resource::Account { owner: target.id },
        "Not authorized to update this profile",
    )?;

    let (name, email) = req.validate()?;
    let user = state.store.update_user(target, name, email).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "createdAt": user.created_at,
            "updatedAt": user.updated_at,
        },
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let current = auth::require_user(&jar)?;
    let target = state.store.find_user(id).await?.ok_or(ApiError::NotFound("User"))?;
    auth::authorize(
        &current,
        auth::Resource::Account { owner: target.id },
        "Not authorized to delete this account",
    )?;

    state.store.delete_user(target.id).await?;

    // The deleted account's session cookie must not outlive the account.
    let jar = session::destroy(jar);
    Ok((jar, Json(json!({ "success": true, "message": "Account deleted successfully" }))))
}
