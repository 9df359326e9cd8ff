use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

/// Animal up for adoption.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub species: String,
    #[sqlx(rename = "photoLocation")]
    pub photo_location: Option<String>,
}

/// Insert an animal, returning the assigned id.
pub async fn insert(db: &SqlitePool, animal: &Animal) -> sqlx::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO Animals (name, description, species, photoLocation)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&animal.name)
    .bind(&animal.description)
    .bind(&animal.species)
    .bind(&animal.photo_location)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_by_id(db: &SqlitePool, id: i64) -> sqlx::Result<Option<Animal>> {
    sqlx::query_as::<_, Animal>(
        r#"
        SELECT id, name, description, species, photoLocation
        FROM Animals
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// All animals. Full scan, no pagination; the shelter stays small.
pub async fn get_all(db: &SqlitePool) -> sqlx::Result<Vec<Animal>> {
    sqlx::query_as::<_, Animal>(
        r#"
        SELECT id, name, description, species, photoLocation
        FROM Animals
        "#,
    )
    .fetch_all(db)
    .await
}
