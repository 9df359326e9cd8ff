use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument};

use super::dto::NewAnimalRequest;
use super::repo::{self, Animal};
use crate::auth::session::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use crate::users;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/animals", get(list_animals))
        .route("/animals/:id", get(get_animal))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/animals", post(create_animal))
}

#[instrument(skip(state))]
pub async fn list_animals(
    State(state): State<AppState>,
) -> Result<Json<Vec<Animal>>, AppError> {
    let animals = repo::get_all(&state.db).await?;
    Ok(Json(animals))
}

#[instrument(skip(state))]
pub async fn get_animal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Animal>, AppError> {
    let animal = repo::get_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("animal"))?;
    Ok(Json(animal))
}

/// Admin-only insertion; regular users browse, the staff adds animals.
#[instrument(skip(state, payload))]
pub async fn create_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<NewAnimalRequest>,
) -> Result<(StatusCode, Json<Animal>), AppError> {
    let caller = users::repo::get_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    if !caller.is_admin() {
        return Err(AppError::Forbidden);
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("animal name is required"));
    }

    let mut animal = Animal {
        id: 0,
        name: payload.name,
        description: payload.description,
        species: payload.species,
        photo_location: payload.photo_location,
    };
    animal.id = repo::insert(&state.db, &animal).await?;
    info!(animal_id = animal.id, name = %animal.name, "animal added");
    Ok((StatusCode::CREATED, Json(animal)))
}
