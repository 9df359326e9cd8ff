use axum::{
    extract::{FromRef, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{
    FavoriteToggleRequest, FavoriteToggleResponse, ProfileResponse, PublicUser, SessionResponse,
    SignInRequest, SignUpRequest, UpdateProfileRequest,
};
use super::service;
use super::session::{AuthUser, SessionKeys};
use crate::error::AppError;
use crate::state::AppState;
use crate::users::{self, User};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/favorites", post(toggle_favorite))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Redirect, AppError> {
    service::sign_up(&state.db, payload).await?;
    Ok(Redirect::to("/signin"))
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let keys = SessionKeys::from_ref(&state);
    let (token, user) = service::sign_in(&state.db, &keys, payload).await?;
    Ok(Json(SessionResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = users::repo::get_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    Ok(Json(profile_of(&state, user).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = service::update_profile(&state.db, user_id, payload).await?;
    Ok(Json(profile_of(&state, user).await?))
}

#[instrument(skip(state))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<FavoriteToggleRequest>,
) -> Result<Json<FavoriteToggleResponse>, AppError> {
    let favorited = service::toggle_favorite(&state.db, user_id, payload.animal_id).await?;
    let message = if favorited {
        "favorite added".to_string()
    } else {
        "favorite removed".to_string()
    };
    Ok(Json(FavoriteToggleResponse { message }))
}

async fn profile_of(state: &AppState, user: User) -> Result<ProfileResponse, AppError> {
    let favorites = users::repo::favorite_animals(&state.db, user.id).await?;
    Ok(ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        profile_picture: user.profile_picture,
        roles: user.roles,
        favorites,
    })
}
