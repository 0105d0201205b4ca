use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde_json::json;

use crate::{
    AppState, auth,
    error::{ApiError, ApiResult},
    models::{MovieReviewJson, ReviewCreateRequest, ReviewJson, ReviewUpdateRequest, UserReviewJson},
};

use super::ApiJson;

pub async fn create(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    ApiJson(req): ApiJson<ReviewCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::require_user(&jar)?;
    let new = req.validate()?;

    if state.store.find_movie(new.movie_id).await?.is_none() {
        return Err(ApiError::NotFound("Movie"));
    }

    let review = state.store.create_review(user.id, new).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Review created successfully",
            "review": ReviewJson::from(review),
        })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(id): Path<i32>,
    ApiJson(req): ApiJson<ReviewUpdateRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = auth::require_user(&jar)?;
    let review = state.store.find_review(id).await?.ok_or(ApiError::NotFound("Review"))?;
    auth::authorize(
        &user,
        auth::Resource::Review { owner: review.user_id },
        "Not authorized to update this review",
    )?;

    let (rating, comment) = req.validate()?;
    let review = state.store.update_review(review, rating, comment).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Review updated successfully",
        "review": ReviewJson::from(review),
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(id): Path<i32>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = auth::require_user(&jar)?;
    let review = state.store.find_review(id).await?.ok_or(ApiError::NotFound("Review"))?;
    auth::authorize(
        &user,
        auth::Resource::Review { owner: review.user_id },
        "Not authorized to delete this review",
    )?;

    state.store.delete_review(review.id).await?;
    Ok(Json(json!({ "success": true, "message": "Review deleted successfully" })))
}

pub async fn for_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> ApiResult<Json<serde_json::Value>> {
    let reviews: Vec<MovieReviewJson> = state
        .store
        .reviews_for_movie(movie_id)
        .await?
        .into_iter()
        .map(|(review, author)| MovieReviewJson::new(review, author))
        .collect();

    Ok(Json(json!({ "success": true, "count": reviews.len(), "reviews": reviews })))
}

pub async fn for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<serde_json::Value>> {
    let reviews: Vec<UserReviewJson> = state
        .store
        .reviews_for_user(user_id)
        .await?
        .into_iter()
        .map(|(review, movie)| UserReviewJson::new(review, movie))
        .collect();

    Ok(Json(json!({ "success": true, "count": reviews.len(), "reviews": reviews })))
}
