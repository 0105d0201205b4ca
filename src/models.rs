use serde::{Deserialize, Serialize};

use crate::{
    entities::{movie, review, user},
    error::{ApiError, ApiResult},
};

pub const MIN_RELEASE_YEAR: i32 = 1888;
pub const RELEASE_YEAR_SLACK: i32 = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Genre {
    Action,
    Comedy,
    Drama,
    Horror,
    SciFi,
    Romance,
    Thriller,
    Documentary,
    Animation,
    Other,
}

impl Genre {
    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Horror => "Horror",
            Genre::SciFi => "Sci-Fi",
            Genre::Romance => "Romance",
            Genre::Thriller => "Thriller",
            Genre::Documentary => "Documentary",
            Genre::Animation => "Animation",
            Genre::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Action" => Some(Genre::Action),
            "Comedy" => Some(Genre::Comedy),
            "Drama" => Some(Genre::Drama),
            "Horror" => Some(Genre::Horror),
            "Sci-Fi" => Some(Genre::SciFi),
            "Romance" => Some(Genre::Romance),
            "Thriller" => Some(Genre::Thriller),
            "Documentary" => Some(Genre::Documentary),
            "Animation" => Some(Genre::Animation),
            "Other" => Some(Genre::Other),
            _ => None,
        }
    }
}

/// Same shape as the `^\S+@\S+\.\S+$` check the frontend applies: no
/// whitespace, one `@`, a dot somewhere after it.
pub fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn require_len(value: &str, field: &str, max: usize) -> ApiResult<()> {
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(ApiError::Validation(format!("{field} cannot exceed {max} characters")));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> ApiResult<NewUser> {
        let (Some(name), Some(email), Some(password)) = (self.name, self.email, self.password)
        else {
            return Err(ApiError::Validation("All fields are required".to_string()));
        };

        let name = name.trim().to_string();
        let email = email.trim().to_lowercase();
        require_len(&name, "Name", 100)?;
        if !valid_email(&email) {
            return Err(ApiError::Validation(
                "Please provide a valid email address".to_string(),
            ));
        }
        if password.len() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        Ok(NewUser { name, email, password })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> ApiResult<(String, String)> {
        let (Some(email), Some(password)) = (self.email, self.password) else {
            return Err(ApiError::Validation("Email and password are required".to_string()));
        };
        Ok((email.trim().to_lowercase(), password))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserUpdateRequest {
    pub fn validate(self) -> ApiResult<(Option<String>, Option<String>)> {
        let name = match self.name {
            Some(name) => {
                let name = name.trim().to_string();
                require_len(&name, "Name", 100)?;
                Some(name)
            }
            None => None,
        };
        let email = match self.email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                if !valid_email(&email) {
                    return Err(ApiError::Validation(
                        "Please provide a valid email address".to_string(),
                    ));
                }
                Some(email)
            }
            None => None,
        };
        Ok((name, email))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

pub struct NewMovie {
    pub title: String,
    pub genre: Genre,
    pub release_year: i32,
    pub description: String,
}

impl MovieRequest {
    pub fn validate(self, current_year: i32) -> ApiResult<NewMovie> {
        let (Some(title), Some(genre), Some(release_year), Some(description)) =
            (self.title, self.genre, self.release_year, self.description)
        else {
            return Err(ApiError::Validation("All fields are required".to_string()));
        };

        let title = title.trim().to_string();
        let description = description.trim().to_string();
        require_len(&title, "Title", 200)?;
        require_len(&description, "Description", 2000)?;

        let genre = Genre::parse(&genre)
            .ok_or_else(|| ApiError::Validation(format!("{genre} is not a valid genre")))?;

        if !(MIN_RELEASE_YEAR..=current_year + RELEASE_YEAR_SLACK).contains(&release_year) {
            return Err(ApiError::Validation("Invalid release year".to_string()));
        }

        Ok(NewMovie { title, genre, release_year, description })
    }
}

#[derive(Debug, Deserialize)]
pub struct MovieQuery {
    pub q: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreateRequest {
    #[serde(default)]
    pub movie_id: Option<i32>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

pub struct NewReview {
    pub movie_id: i32,
    pub rating: i32,
    pub comment: String,
}

fn validate_rating(rating: i32) -> ApiResult<i32> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation("Rating must be between 1 and 5".to_string()));
    }
    Ok(rating)
}

impl ReviewCreateRequest {
    pub fn validate(self) -> ApiResult<NewReview> {
        let (Some(movie_id), Some(rating), Some(comment)) =
            (self.movie_id, self.rating, self.comment)
        else {
            return Err(ApiError::Validation("All fields are required".to_string()));
        };

        let comment = comment.trim().to_string();
        require_len(&comment, "Comment", 1000)?;
        Ok(NewReview { movie_id, rating: validate_rating(rating)?, comment })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewUpdateRequest {
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ReviewUpdateRequest {
    pub fn validate(self) -> ApiResult<(Option<i32>, Option<String>)> {
        let rating = self.rating.map(validate_rating).transpose()?;
        let comment = match self.comment {
            Some(comment) => {
                let comment = comment.trim().to_string();
                require_len(&comment, "Comment", 1000)?;
                Some(comment)
            }
            None => None,
        };
        Ok((rating, comment))
    }
}

/// Computed from the current review set on every read; never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u64,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self { average: 0.0, count: 0 };
        }
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        let average = sum as f64 / ratings.len() as f64;
        Self {
            average: (average * 10.0).round() / 10.0,
            count: ratings.len() as u64,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieJson {
    pub id: i32,
    pub title: String,
    pub genre: String,
    pub release_year: i32,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub average_rating: f64,
    pub review_count: u64,
}

impl MovieJson {
    pub fn new(model: movie::Model, rating: RatingSummary) -> Self {
        Self {
            id: model.id,
            title: model.title,
            genre: model.genre,
            release_year: model.release_year,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
            average_rating: rating.average,
            review_count: rating.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewJson {
    pub id: i32,
    pub user_id: i32,
    pub movie_id: i32,
    pub rating: i32,
    pub comment: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<review::Model> for ReviewJson {
    fn from(model: review::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            movie_id: model.movie_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewAuthor {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MovieRef {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct MovieReviewJson {
    #[serde(flatten)]
    pub review: ReviewJson,
    pub author: Option<ReviewAuthor>,
}

impl MovieReviewJson {
    pub fn new(review: review::Model, author: Option<user::Model>) -> Self {
        Self {
            review: review.into(),
            author: author.map(|u| ReviewAuthor { id: u.id, name: u.name, email: u.email }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserReviewJson {
    #[serde(flatten)]
    pub review: ReviewJson,
    pub movie: Option<MovieRef>,
}

impl UserReviewJson {
    pub fn new(review: review::Model, movie: Option<movie::Model>) -> Self {
        Self {
            review: review.into(),
            movie: movie.map(|m| MovieRef { id: m.id, title: m.title }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileJson {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub average_rating: f64,
    pub review_count: u64,
}

impl UserProfileJson {
    pub fn new(model: user::Model, rating: RatingSummary) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
            average_rating: rating.average,
            review_count: rating.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(valid_email("alice@example.com"));
        assert!(valid_email("a.b+c@sub.example.co"));
        assert!(!valid_email("alice"));
        assert!(!valid_email("alice@example"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("alice @example.com"));
        assert!(!valid_email("alice@ex@ample.com"));
        assert!(!valid_email("alice@.com")); // empty host
    }

    #[test]
    fn genre_round_trip() {
        for name in [
            "Action",
            "Comedy",
            "Drama",
            "Horror",
            "Sci-Fi",
            "Romance",
            "Thriller",
            "Documentary",
            "Animation",
            "Other",
        ] {
            let genre = Genre::parse(name).unwrap();
            assert_eq!(genre.as_str(), name);
        }
        assert!(Genre::parse("Western").is_none());
        assert!(Genre::parse("drama").is_none());
    }

    #[test]
    fn register_normalizes_email() {
        let req = RegisterRequest {
            name: Some("  Alice  ".to_string()),
            email: Some(" Alice@Example.COM ".to_string()),
            password: Some("secret1".to_string()),
        };
        let new = req.validate().unwrap();
        assert_eq!(new.name, "Alice");
        assert_eq!(new.email, "alice@example.com");
    }

    #[test]
    fn register_rejects_short_password() {
        let req = RegisterRequest {
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            password: Some("short".to_string()),
        };
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn movie_release_year_bounds() {
        let make = |year| MovieRequest {
            title: Some("Arrival".to_string()),
            genre: Some("Sci-Fi".to_string()),
            release_year: Some(year),
            description: Some("First contact.".to_string()),
        };
        assert!(make(1888).validate(2026).is_ok());
        assert!(make(2031).validate(2026).is_ok());
        assert!(make(1887).validate(2026).is_err());
        assert!(make(2032).validate(2026).is_err());
    }

    #[test]
    fn movie_rejects_unknown_genre() {
        let req = MovieRequest {
            title: Some("Arrival".to_string()),
            genre: Some("Space Opera".to_string()),
            release_year: Some(2016),
            description: Some("First contact.".to_string()),
        };
        assert!(matches!(req.validate(2026), Err(ApiError::Validation(_))));
    }

    #[test]
    fn review_rating_bounds() {
        let make = |rating| ReviewCreateRequest {
            movie_id: Some(1),
            rating: Some(rating),
            comment: Some("Fine.".to_string()),
        };
        assert!(make(1).validate().is_ok());
        assert!(make(5).validate().is_ok());
        assert!(make(0).validate().is_err());
        assert!(make(6).validate().is_err());
    }

    #[test]
    fn rating_summary_rounds_to_one_decimal() {
        let summary = RatingSummary::from_ratings(&[4, 5, 3]);
        assert_eq!(summary.average, 4.0);
        assert_eq!(summary.count, 3);

        let summary = RatingSummary::from_ratings(&[3, 4, 3]);
        assert_eq!(summary.average, 3.3);

        let summary = RatingSummary::from_ratings(&[4, 5]);
        assert_eq!(summary.average, 4.5);
    }

    #[test]
    fn rating_summary_empty_is_zero_not_nan() {
        let summary = RatingSummary::from_ratings(&[]);
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.count, 0);
    }
}
