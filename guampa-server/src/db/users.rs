//! User lookup, creation and credential checks

use guampa_common::db::User;
use guampa_common::password::{generate_salt, hash_password, verify_password};
use guampa_common::{Error, Result};
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, username, fullname, password_hash, password_salt";

/// Find a user by exact username
pub async fn lookup_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Find a user by id
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Insert a user with a fresh salt
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    fullname: &str,
    password: &str,
) -> Result<User> {
    if username.trim().is_empty() {
        return Err(Error::InvalidInput("username must not be empty".to_string()));
    }
    if lookup_username(pool, username).await?.is_some() {
        return Err(Error::DuplicateUser(username.to_string()));
    }

    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    let id = sqlx::query(
        "INSERT INTO users (username, fullname, password_hash, password_salt) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(fullname)
    .bind(&hash)
    .bind(&salt)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(User {
        id,
        username: username.to_string(),
        fullname: fullname.to_string(),
        password_hash: hash,
        password_salt: salt,
    })
}

/// Result of checking a username/password pair
#[derive(Debug)]
pub enum LoginOutcome {
    Success(User),
    UnknownUser,
    WrongPassword,
}

/// Look up `username` and verify `password` against its stored hash
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let Some(user) = lookup_username(pool, username).await? else {
        return Ok(LoginOutcome::UnknownUser);
    };

    if verify_password(password, &user.password_salt, &user.password_hash) {
        Ok(LoginOutcome::Success(user))
    } else {
        Ok(LoginOutcome::WrongPassword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guampa_common::db::init_memory_database;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = init_memory_database().await.unwrap();
        let created = create_user(&pool, "alex", "Alex Rudnick", "pw").await.unwrap();

        let by_name = lookup_username(&pool, "alex").await.unwrap().unwrap();
        let by_id = get_user(&pool, created.id).await.unwrap().unwrap();

        assert_eq!(by_name.id, created.id);
        assert_eq!(by_id.fullname, "Alex Rudnick");
        assert_ne!(by_id.password_hash, "pw", "Password must not be stored in clear");
        assert!(by_id.password_hash.starts_with("pbkdf2-sha256$"));
    }

    #[tokio::test]
    async fn test_lookup_unknown_is_none() {
        let pool = init_memory_database().await.unwrap();
        assert!(lookup_username(&pool, "nobody").await.unwrap().is_none());
        assert!(get_user(&pool, 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = init_memory_database().await.unwrap();
        create_user(&pool, "alex", "", "pw").await.unwrap();

        let err = create_user(&pool, "alex", "", "other").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateUser(name) if name == "alex"));
    }

    #[tokio::test]
    async fn test_authenticate_outcomes() {
        let pool = init_memory_database().await.unwrap();
        create_user(&pool, "alex", "", "pw").await.unwrap();

        assert!(matches!(
            authenticate(&pool, "alex", "pw").await.unwrap(),
            LoginOutcome::Success(u) if u.username == "alex"
        ));
        assert!(matches!(
            authenticate(&pool, "alex", "nope").await.unwrap(),
            LoginOutcome::WrongPassword
        ));
        assert!(matches!(
            authenticate(&pool, "mallory", "pw").await.unwrap(),
            LoginOutcome::UnknownUser
        ));
    }
}
