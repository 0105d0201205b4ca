use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::{
    error::{ApiError, ApiResult},
    session::{self, SessionUser},
};

pub fn current_user(jar: &PrivateCookieJar) -> Option<SessionUser> {
    session::read(jar)
}

pub fn require_user(jar: &PrivateCookieJar) -> ApiResult<SessionUser> {
    current_user(jar).ok_or(ApiError::Unauthenticated)
}

/// What a caller is trying to touch. Movies carry no owner: any
/// authenticated user may edit or delete any movie (deliberate).
#[derive(Clone, Copy, Debug)]
pub enum Resource {
    Movie,
    Review { owner: i32 },
    Account { owner: i32 },
}

pub fn allows(user: &SessionUser, resource: Resource) -> bool {
    match resource {
        Resource::Movie => true,
        Resource::Review { owner } | Resource::Account { owner } => owner == user.id,
    }
}

pub fn authorize(user: &SessionUser, resource: Resource, denied: &'static str) -> ApiResult<()> {
    if allows(user, resource) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(denied))
    }
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("password hashing failed: {err}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32) -> SessionUser {
        SessionUser { id, email: format!("u{id}@example.com"), name: format!("u{id}") }
    }

    #[test]
    fn any_authenticated_user_may_touch_movies() {
        assert!(allows(&user(1), Resource::Movie));
        assert!(allows(&user(2), Resource::Movie));
    }

    #[test]
    fn reviews_and_accounts_are_owner_only() {
        let alice = user(1);
        assert!(allows(&alice, Resource::Review { owner: 1 }));
        assert!(!allows(&alice, Resource::Review { owner: 2 }));
        assert!(allows(&alice, Resource::Account { owner: 1 }));
        assert!(!allows(&alice, Resource::Account { owner: 2 }));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
