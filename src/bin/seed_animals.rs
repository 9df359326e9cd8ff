//! Seeds the database with a sample animal so a fresh install has something
//! to show on the listing page.

use astroshelter::animals::{self, Animal};
use astroshelter::config::AppConfig;
use astroshelter::schema;
use sqlx::sqlite::SqlitePoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = AppConfig::from_env()?;
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await?;
    schema::ensure_schema(&db).await?;

    let fluffy = Animal {
        id: 0,
        name: "Fluffy".into(),
        description: "A rare martian beaver".into(),
        species: "Space Beaver".into(),
        photo_location: Some("/images/fluffy.jpg".into()),
    };
    let id = animals::repo::insert(&db, &fluffy).await?;
    tracing::info!(animal_id = id, "seed animal inserted");

    Ok(())
}
