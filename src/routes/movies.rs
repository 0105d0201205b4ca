use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde_json::json;

use crate::{
    AppState, auth,
    error::{ApiError, ApiResult},
    models::{MovieJson, MovieQuery, MovieRequest},
};

use super::ApiJson;

fn current_year() -> i32 {
    let today: jiff::civil::Date = jiff::Zoned::now().into();
    i32::from(today.year())
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let movies = state
        .store
        .search_movies(query.q.as_deref(), query.genre.as_deref(), query.year)
        .await?;

    let mut payload = Vec::with_capacity(movies.len());
    for movie in movies {
        let rating = state.store.rating_for_movie(movie.id).await?;
        payload.push(MovieJson::new(movie, rating));
    }

    Ok(Json(json!({ "success": true, "count": payload.len(), "movies": payload })))
}

pub async fn create(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    ApiJson(req): ApiJson<MovieRequest>,
) -> ApiResult<impl IntoResponse> {
    auth::require_user(&jar)?;
    let new = req.validate(current_year())?;
    let movie = state.store.create_movie(new).await?;

    let rating = state.store.rating_for_movie(movie.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Movie created successfully",
            "movie": MovieJson::new(movie, rating),
        })),
    ))
}

pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<serde_json::Value>> {
    let movie = state.store.find_movie(id).await?.ok_or(ApiError::NotFound("Movie"))?;
    let rating = state.store.rating_for_movie(movie.id).await?;
    Ok(Json(json!({ "success": true, "movie": MovieJson::new(movie, rating) })))
}

pub async fn update(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(id): Path<i32>,
    ApiJson(req): ApiJson<MovieRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = auth::require_user(&jar)?;
    let movie = state.store.find_movie(id).await?.ok_or(ApiError::NotFound("Movie"))?;
    auth::authorize(&user, auth::Resource::Movie, "Not authorized to update this movie")?;

    let new = req.validate(current_year())?;
    let movie = state.store.update_movie(movie, new).await?;

    let rating = state.store.rating_for_movie(movie.id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Movie updated successfully",
        "movie": MovieJson::new(movie, rating),
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(id): Path<i32>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = auth::require_user(&jar)?;
    let movie = state.store.find_movie(id).await?.ok_or(ApiError::NotFound("Movie"))?;
    auth::authorize(&user, auth::Resource::Movie, "Not authorized to delete this movie")?;

    state.store.delete_movie(movie.id).await?;
    Ok(Json(json!({ "success": true, "message": "Movie deleted successfully" })))
}
