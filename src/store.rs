use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};

use crate::{
    entities::{movie, review, user},
    error::{ApiError, ApiResult},
    models::{NewMovie, NewReview, RatingSummary},
};

#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    // users

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> ApiResult<user::Model> {
        let now = now_sec();
        let model = user::ActiveModel {
            id: Default::default(),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&self.db).await.map_err(|err| conflict_or_db(err, "Email already registered"))
    }

    pub async fn find_user(&self, id: i32) -> ApiResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> ApiResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    pub async fn update_user(
        &self,
        current: user::Model,
        name: Option<String>,
        email: Option<String>,
    ) -> ApiResult<user::Model> {
        let mut active: user::ActiveModel = current.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(email) = email {
            active.email = Set(email);
        }
        active.updated_at = Set(now_sec());
        active.update(&self.db).await.map_err(|err| conflict_or_db(err, "Email already in use"))
    }

    /// Dependents first, then the account, in one transaction.
    pub async fn delete_user(&self, id: i32) -> ApiResult<()> {
        let txn = self.db.begin().await?;
        review::Entity::delete_many()
            .filter(review::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        user::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    // movies

    pub async fn create_movie(&self, new: NewMovie) -> ApiResult<movie::Model> {
        let now = now_sec();
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(new.title),
            genre: Set(new.genre.as_str().to_string()),
            release_year: Set(new.release_year),
            description: Set(new.description),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn find_movie(&self, id: i32) -> ApiResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Conjunctive filters; a missing parameter leaves that field
    /// unconstrained. Newest first, id as the tiebreak within a second.
    pub async fn search_movies(
        &self,
        q: Option<&str>,
        genre: Option<&str>,
        year: Option<i32>,
    ) -> ApiResult<Vec<movie::Model>> {
        let mut find = movie::Entity::find();

        if let Some(q) = q {
            let pattern = format!("%{q}%");
            find = find.filter(
                Condition::any()
                    .add(movie::Column::Title.like(pattern.as_str()))
                    .add(movie::Column::Description.like(pattern.as_str())),
            );
        }
        if let Some(genre) = genre {
            find = find.filter(movie::Column::Genre.eq(genre));
        }
        if let Some(year) = year {
            find = find.filter(movie::Column::ReleaseYear.eq(year));
        }

        Ok(find
            .order_by_desc(movie::Column::CreatedAt)
            .order_by_desc(movie::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn update_movie(
        &self,
        current: movie::Model,
        new: NewMovie,
    ) -> ApiResult<movie::Model> {
        let mut active: movie::ActiveModel = current.into();
        active.title = Set(new.title);
        active.genre = Set(new.genre.as_str().to_string());
        active.release_year = Set(new.release_year);
        active.description = Set(new.description);
        active.updated_at = Set(now_sec());
        Ok(active.update(&self.db).await?)
    }

    /// Dependents first, then the movie, in one transaction.
    pub async fn delete_movie(&self, id: i32) -> ApiResult<()> {
        let txn = self.db.begin().await?;
        review::Entity::delete_many()
            .filter(review::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    // reviews

    /// The unique (user_id, movie_id) index is the authority on "one review
    /// per user per movie": a concurrent duplicate loses here, not in a
    /// pre-check, and surfaces as Conflict.
    pub async fn create_review(&self, user_id: i32, new: NewReview) -> ApiResult<review::Model> {
        let now = now_sec();
        let model = review::ActiveModel {
            id: Default::default(),
            user_id: Set(user_id),
            movie_id: Set(new.movie_id),
            rating: Set(new.rating),
            comment: Set(new.comment),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|err| conflict_or_db(err, "You have already reviewed this movie"))
    }

    pub async fn find_review(&self, id: i32) -> ApiResult<Option<review::Model>> {
        Ok(review::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn update_review(
        &self,
        current: review::Model,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> ApiResult<review::Model> {
        let mut active: review::ActiveModel = current.into();
        if let Some(rating) = rating {
            active.rating = Set(rating);
        }
        if let Some(comment) = comment {
            active.comment = Set(comment);
        }
        active.updated_at = Set(now_sec());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_review(&self, id: i32) -> ApiResult<()> {
        review::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn reviews_for_movie(
        &self,
        movie_id: i32,
    ) -> ApiResult<Vec<(review::Model, Option<user::Model>)>> {
        Ok(review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .find_also_related(user::Entity)
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn reviews_for_user(
        &self,
        user_id: i32,
    ) -> ApiResult<Vec<(review::Model, Option<movie::Model>)>> {
        Ok(review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .find_also_related(movie::Entity)
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .all(&self.db)
            .await?)
    }

    // aggregates, recomputed from the review set on every read

    pub async fn rating_for_movie(&self, movie_id: i32) -> ApiResult<RatingSummary> {
        let reviews = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .all(&self.db)
            .await?;
        let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
        Ok(RatingSummary::from_ratings(&ratings))
    }

    pub async fn rating_for_user(&self, user_id: i32) -> ApiResult<RatingSummary> {
        let reviews = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;
        let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
        Ok(RatingSummary::from_ratings(&ratings))
    }
}

fn conflict_or_db(err: sea_orm::DbErr, message: &'static str) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::Conflict(message),
        _ => ApiError::Database(err),
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
