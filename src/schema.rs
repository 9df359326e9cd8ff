use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// Table layout kept as the persisted interface, camelCase column names
/// included.
const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS Users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        email TEXT NOT NULL,
        firstName TEXT NOT NULL,
        lastName TEXT NOT NULL,
        profilePicture TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Roles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS UserRoles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        userId INTEGER NOT NULL REFERENCES Users(id),
        roleId INTEGER NOT NULL REFERENCES Roles(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS UserFavorites (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        userId INTEGER NOT NULL REFERENCES Users(id),
        animalId INTEGER NOT NULL REFERENCES Animals(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Animals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        species TEXT NOT NULL,
        photoLocation TEXT
    )
    "#,
];

// Separate index statements so tables created by earlier versions without the
// constraints pick them up too.
const UNIQUE_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON Users(username)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON Users(email)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_roles_name ON Roles(name)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_roles_pair ON UserRoles(userId, roleId)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_favorites_pair ON UserFavorites(userId, animalId)",
];

/// Columns older Animals tables may be missing. SQLite only accepts
/// ADD COLUMN with NOT NULL when a default is given.
const EXPECTED_ANIMAL_COLUMNS: &[(&str, &str)] = &[
    ("species", "TEXT NOT NULL DEFAULT ''"),
    ("description", "TEXT NOT NULL DEFAULT ''"),
    ("photoLocation", "TEXT"),
];

const BASELINE_ROLES: &[&str] = &["user", "admin"];

/// Ensures the required tables, indexes and columns exist. Idempotent; safe
/// to run on every startup. Existing data is never altered.
pub async fn ensure_schema(db: &SqlitePool) -> sqlx::Result<()> {
    for stmt in CREATE_TABLES {
        sqlx::query(stmt).execute(db).await?;
    }
    for stmt in UNIQUE_INDEXES {
        sqlx::query(stmt).execute(db).await?;
    }

    let rows = sqlx::query("PRAGMA table_info(Animals)").fetch_all(db).await?;
    let existing: Vec<String> = rows.iter().map(|r| r.get::<String, _>("name")).collect();
    for (name, column_type) in EXPECTED_ANIMAL_COLUMNS.iter().copied() {
        if !existing.iter().any(|c| c == name) {
            info!(column = name, "adding missing Animals column");
            sqlx::query(&format!("ALTER TABLE Animals ADD COLUMN {} {}", name, column_type))
                .execute(db)
                .await?;
        }
    }

    for role in BASELINE_ROLES {
        sqlx::query("INSERT OR IGNORE INTO Roles (name) VALUES (?)")
            .bind(role)
            .execute(db)
            .await?;
    }

    debug!("schema ensured");
    Ok(())
}
