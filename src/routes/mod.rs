pub mod auth;
pub mod movies;
pub mod reviews;
pub mod users;

use axum::extract::{FromRequest, Request, rejection::JsonRejection};

use crate::error::ApiError;

/// `axum::Json` with its rejection folded into the error taxonomy, so a
/// malformed body is a 400 envelope like any other validation failure.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|err| ApiError::Validation(err.body_text()))?;
        Ok(Self(value))
    }
}
