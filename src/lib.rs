pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post, put},
};
use axum_extra::extract::cookie::Key;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.config.session_key.clone()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/movies", get(routes::movies::list).post(routes::movies::create))
        .route(
            "/movies/{id}",
            get(routes::movies::fetch).put(routes::movies::update).delete(routes::movies::remove),
        )
        .route("/reviews", post(routes::reviews::create))
        .route("/reviews/{id}", put(routes::reviews::update).delete(routes::reviews::remove))
        .route("/reviews/movie/{movie_id}", get(routes::reviews::for_movie))
        .route("/reviews/user/{user_id}", get(routes::reviews::for_user))
        .route(
            "/users/{id}",
            get(routes::users::fetch).put(routes::users::update).delete(routes::users::remove),
        )
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
