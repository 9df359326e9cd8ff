use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::dto::{SignInRequest, SignUpRequest, UpdateProfileRequest};
use super::password::{hash_password, verify_password};
use super::session::SessionKeys;
use crate::animals;
use crate::error::AppError;
use crate::users::{self, User};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Sign-up: validate, check uniqueness, hash the password, insert with the
/// default "user" role and no favorites. The repository re-checks uniqueness
/// and leaves the store untouched on a duplicate.
pub async fn sign_up(db: &SqlitePool, req: SignUpRequest) -> Result<User, AppError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(AppError::Validation("username is required"));
    }
    if !is_valid_email(&email) {
        warn!(%email, "sign-up with invalid email");
        return Err(AppError::Validation("invalid email"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        warn!("sign-up with too short password");
        return Err(AppError::Validation("password too short"));
    }

    let hash = hash_password(&req.password)?;
    let mut user = User::new(
        username,
        email,
        req.first_name.trim().to_string(),
        req.last_name.trim().to_string(),
        hash,
    );
    user.id = users::repo::insert(db, &user).await?;

    info!(user_id = user.id, username = %user.username, "user signed up");
    Ok(user)
}

/// Sign-in: unknown username and wrong password both map to the same
/// `InvalidCredential` so the client cannot enumerate accounts. Success
/// returns a session token plus the user record.
pub async fn sign_in(
    db: &SqlitePool,
    keys: &SessionKeys,
    req: SignInRequest,
) -> Result<(String, User), AppError> {
    let user = match users::repo::get_by_username(db, req.username.trim()).await? {
        Some(u) => u,
        None => {
            warn!("sign-in with unknown username");
            return Err(AppError::InvalidCredential);
        }
    };

    if !verify_password(&req.password, &user.password)? {
        warn!(user_id = user.id, "sign-in with wrong password");
        return Err(AppError::InvalidCredential);
    }

    let token = keys.issue(user.id)?;
    info!(user_id = user.id, username = %user.username, "session established");
    Ok((token, user))
}

/// Profile update: absent fields stay as they are; username/email changes
/// re-check uniqueness against other users; a new password is re-hashed.
pub async fn update_profile(
    db: &SqlitePool,
    user_id: i64,
    req: UpdateProfileRequest,
) -> Result<User, AppError> {
    let mut user = users::repo::get_by_id(db, user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    if let Some(username) = req.username {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("username is required"));
        }
        if username != user.username {
            if users::repo::get_by_username(db, &username).await?.is_some() {
                return Err(AppError::DuplicateCredential);
            }
            user.username = username;
        }
    }
    if let Some(email) = req.email {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::Validation("invalid email"));
        }
        if email != user.email {
            if users::repo::get_by_email(db, &email).await?.is_some() {
                return Err(AppError::DuplicateCredential);
            }
            user.email = email;
        }
    }
    if let Some(first_name) = req.first_name {
        user.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name.trim().to_string();
    }
    if let Some(profile_picture) = req.profile_picture {
        user.profile_picture = Some(profile_picture);
    }
    if let Some(password) = req.password {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation("password too short"));
        }
        user.password = hash_password(&password)?;
    }

    users::repo::update(db, &user).await?;
    info!(user_id, "profile updated");
    Ok(user)
}

/// Favorite toggle: add the animal to the user's favorite set, or remove it
/// when already present, then persist through the user repository. Returns
/// true when the animal is favorited afterwards.
pub async fn toggle_favorite(
    db: &SqlitePool,
    user_id: i64,
    animal_id: i64,
) -> Result<bool, AppError> {
    if animals::repo::get_by_id(db, animal_id).await?.is_none() {
        return Err(AppError::NotFound("animal"));
    }
    let mut user = users::repo::get_by_id(db, user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    let favorited = user.toggle_favorite(animal_id);
    users::repo::update(db, &user).await?;

    info!(user_id, animal_id, favorited, "favorite toggled");
    Ok(favorited)
}
