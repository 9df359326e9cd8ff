use serde::Serialize;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use crate::animals::repo::Animal;
use crate::error::AppError;

/// Shelter user with role labels and favorited animal ids. The `password`
/// column always holds a salted hash, never the plaintext.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: String,
    #[sqlx(rename = "firstName")]
    pub first_name: String,
    #[sqlx(rename = "lastName")]
    pub last_name: String,
    #[sqlx(rename = "profilePicture")]
    pub profile_picture: Option<String>,
    #[sqlx(skip)]
    pub roles: Vec<String>,
    #[sqlx(skip)]
    pub favorites: Vec<i64>,
}

impl User {
    /// Sign-up constructor: default role "user", no favorites, id assigned
    /// at insertion.
    pub fn new(
        username: String,
        email: String,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: 0,
            username,
            password: password_hash,
            email,
            first_name,
            last_name,
            profile_picture: None,
            roles: vec!["user".to_string()],
            favorites: Vec::new(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }

    /// Adds the animal to the favorite set, or removes it when already
    /// present. Returns true when the animal is favorited afterwards.
    pub fn toggle_favorite(&mut self, animal_id: i64) -> bool {
        if let Some(pos) = self.favorites.iter().position(|&id| id == animal_id) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(animal_id);
            true
        }
    }
}

/// Inserts a new user and its role associations, returning the assigned id.
/// Fails with `DuplicateCredential` when the username or email is already
/// taken; nothing is written in that case.
pub async fn insert(db: &SqlitePool, user: &User) -> Result<i64, AppError> {
    if get_by_username(db, &user.username).await?.is_some()
        || get_by_email(db, &user.email).await?.is_some()
    {
        return Err(AppError::DuplicateCredential);
    }

    let mut tx = db.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO Users (username, password, email, firstName, lastName, profilePicture)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.password)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.profile_picture)
    .execute(&mut *tx)
    .await?;
    let user_id = result.last_insert_rowid();

    for role in &user.roles {
        let role_id = ensure_role(&mut tx, role).await?;
        sqlx::query("INSERT OR IGNORE INTO UserRoles (userId, roleId) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
    }
    for animal_id in &user.favorites {
        sqlx::query("INSERT OR IGNORE INTO UserFavorites (userId, animalId) VALUES (?, ?)")
            .bind(user_id)
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(user_id)
}

/// Overwrites all scalar columns and reconciles the role and favorite
/// association sets as a diff, inside one transaction.
pub async fn update(db: &SqlitePool, user: &User) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE Users
        SET username = ?, password = ?, email = ?, firstName = ?, lastName = ?, profilePicture = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.password)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.profile_picture)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("user"));
    }

    let current_roles: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT Roles.name FROM Roles
        JOIN UserRoles ON Roles.id = UserRoles.roleId
        WHERE UserRoles.userId = ?
        "#,
    )
    .bind(user.id)
    .fetch_all(&mut *tx)
    .await?;

    for role in user.roles.iter().filter(|r| !current_roles.contains(*r)) {
        let role_id = ensure_role(&mut tx, role).await?;
        sqlx::query("INSERT INTO UserRoles (userId, roleId) VALUES (?, ?)")
            .bind(user.id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
    }
    for role in current_roles.iter().filter(|r| !user.roles.contains(*r)) {
        sqlx::query(
            r#"
            DELETE FROM UserRoles
            WHERE userId = ? AND roleId = (SELECT id FROM Roles WHERE name = ?)
            "#,
        )
        .bind(user.id)
        .bind(role)
        .execute(&mut *tx)
        .await?;
    }

    let current_favorites: Vec<i64> =
        sqlx::query_scalar("SELECT animalId FROM UserFavorites WHERE userId = ?")
            .bind(user.id)
            .fetch_all(&mut *tx)
            .await?;

    for animal_id in user
        .favorites
        .iter()
        .copied()
        .filter(|id| !current_favorites.contains(id))
    {
        sqlx::query("INSERT INTO UserFavorites (userId, animalId) VALUES (?, ?)")
            .bind(user.id)
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
    }
    for animal_id in current_favorites
        .iter()
        .copied()
        .filter(|id| !user.favorites.contains(id))
    {
        sqlx::query("DELETE FROM UserFavorites WHERE userId = ? AND animalId = ?")
            .bind(user.id)
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Find a user by id, with role names and favorite ids attached.
pub async fn get_by_id(db: &SqlitePool, id: i64) -> sqlx::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, email, firstName, lastName, profilePicture
        FROM Users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    load_associations(db, user).await
}

/// Find a user by username. Case-sensitive exact match; normalization is an
/// upstream concern.
pub async fn get_by_username(db: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, email, firstName, lastName, profilePicture
        FROM Users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;
    load_associations(db, user).await
}

/// Find a user by email. Case-sensitive exact match.
pub async fn get_by_email(db: &SqlitePool, email: &str) -> sqlx::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, email, firstName, lastName, profilePicture
        FROM Users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    load_associations(db, user).await
}

/// The user's favorited animals joined with the animal records, for profile
/// rendering.
pub async fn favorite_animals(db: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<Animal>> {
    sqlx::query_as::<_, Animal>(
        r#"
        SELECT Animals.id, Animals.name, Animals.description, Animals.species, Animals.photoLocation
        FROM Animals
        JOIN UserFavorites ON Animals.id = UserFavorites.animalId
        WHERE UserFavorites.userId = ?
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

async fn load_associations(db: &SqlitePool, user: Option<User>) -> sqlx::Result<Option<User>> {
    let Some(mut user) = user else {
        return Ok(None);
    };
    user.roles = sqlx::query_scalar(
        r#"
        SELECT Roles.name FROM Roles
        JOIN UserRoles ON Roles.id = UserRoles.roleId
        WHERE UserRoles.userId = ?
        "#,
    )
    .bind(user.id)
    .fetch_all(db)
    .await?;
    user.favorites = sqlx::query_scalar("SELECT animalId FROM UserFavorites WHERE userId = ?")
        .bind(user.id)
        .fetch_all(db)
        .await?;
    Ok(Some(user))
}

async fn ensure_role(tx: &mut Transaction<'_, Sqlite>, name: &str) -> sqlx::Result<i64> {
    sqlx::query("INSERT OR IGNORE INTO Roles (name) VALUES (?)")
        .bind(name)
        .execute(&mut **tx)
        .await?;
    sqlx::query_scalar("SELECT id FROM Roles WHERE name = ?")
        .bind(name)
        .fetch_one(&mut **tx)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_pool;

    fn sample_user(username: &str, email: &str) -> User {
        User::new(
            username.to_string(),
            email.to_string(),
            "Zed".to_string(),
            "Beeblebrox".to_string(),
            "$argon2-not-a-real-hash".to_string(),
        )
    }

    #[tokio::test]
    async fn insert_and_lookup_roundtrip() {
        let pool = test_pool().await;
        let id = insert(&pool, &sample_user("zed", "zed@example.com"))
            .await
            .expect("insert");
        assert!(id > 0);

        let user = get_by_username(&pool, "zed")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(user.id, id);
        assert_eq!(user.email, "zed@example.com");
        assert_eq!(user.roles, vec!["user".to_string()]);
        assert!(user.favorites.is_empty());

        let by_email = get_by_email(&pool, "zed@example.com")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(by_email.id, id);
    }

    #[tokio::test]
    async fn lookups_are_case_sensitive() {
        let pool = test_pool().await;
        insert(&pool, &sample_user("Zed", "zed@example.com"))
            .await
            .expect("insert");
        assert!(get_by_username(&pool, "zed").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let pool = test_pool().await;
        insert(&pool, &sample_user("zed", "zed@example.com"))
            .await
            .expect("first insert");

        let same_username = insert(&pool, &sample_user("zed", "other@example.com")).await;
        assert!(matches!(same_username, Err(AppError::DuplicateCredential)));

        let same_email = insert(&pool, &sample_user("other", "zed@example.com")).await;
        assert!(matches!(same_email, Err(AppError::DuplicateCredential)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Users")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 1, "failed inserts must not mutate the store");
    }

    #[tokio::test]
    async fn update_reconciles_roles_and_favorites() {
        let pool = test_pool().await;
        let animal_a = crate::animals::repo::insert(
            &pool,
            &Animal {
                id: 0,
                name: "Fluffy".into(),
                description: "A rare martian beaver".into(),
                species: "Space Beaver".into(),
                photo_location: None,
            },
        )
        .await
        .expect("animal a");
        let animal_b = crate::animals::repo::insert(
            &pool,
            &Animal {
                id: 0,
                name: "Blinky".into(),
                description: "Three eyes, no waiting".into(),
                species: "Nebula Fish".into(),
                photo_location: None,
            },
        )
        .await
        .expect("animal b");

        let id = insert(&pool, &sample_user("zed", "zed@example.com"))
            .await
            .expect("insert");
        let mut user = get_by_id(&pool, id).await.expect("get").expect("present");

        user.roles.push("admin".to_string());
        user.favorites = vec![animal_a, animal_b];
        update(&pool, &user).await.expect("first update");

        user.favorites = vec![animal_b];
        user.roles = vec!["user".to_string()];
        update(&pool, &user).await.expect("second update");

        let reloaded = get_by_id(&pool, id).await.expect("get").expect("present");
        assert_eq!(reloaded.roles, vec!["user".to_string()]);
        assert_eq!(reloaded.favorites, vec![animal_b]);

        let favorites = favorite_animals(&pool, id).await.expect("favorites");
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].name, "Blinky");
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let pool = test_pool().await;
        let mut ghost = sample_user("ghost", "ghost@example.com");
        ghost.id = 9999;
        let err = update(&pool, &ghost).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("user")));
    }

    #[tokio::test]
    async fn missing_user_is_none_not_error() {
        let pool = test_pool().await;
        assert!(get_by_id(&pool, 42).await.expect("get").is_none());
        assert!(get_by_username(&pool, "nobody").await.expect("get").is_none());
        assert!(get_by_email(&pool, "no@example.com").await.expect("get").is_none());
    }

    #[test]
    fn toggle_favorite_pair_restores_set() {
        let mut user = sample_user("zed", "zed@example.com");
        assert!(user.toggle_favorite(7));
        assert_eq!(user.favorites, vec![7]);
        assert!(!user.toggle_favorite(7));
        assert!(user.favorites.is_empty());
    }

    #[test]
    fn role_helpers() {
        let mut user = sample_user("zed", "zed@example.com");
        assert!(user.has_role("user"));
        assert!(!user.is_admin());
        user.roles.push("admin".to_string());
        assert!(user.is_admin());
    }
}
