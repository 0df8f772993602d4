// 🔐 Authentication - password hashing, API tokens, permission checks

use crate::db::timestamp_to_sql;
use crate::entities::user::{get_user, User};
use crate::error::{FoodgramError, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::debug;

const HASH_SCHEME: &str = "sha256";

// ============================================================================
// PASSWORDS
// ============================================================================

/// Hash a password with a fresh random salt: `sha256$<salt>$<hex digest>`
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    format!("{}${}${}", HASH_SCHEME, salt, digest(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(HASH_SCHEME), Some(salt), Some(expected)) => digest(salt, password) == expected,
        _ => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TOKENS
// ============================================================================

/// Log in by email and password; reuses the user's existing token if any
pub fn login(conn: &Connection, email: &str, password: &str) -> Result<String> {
    let found: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, password_hash FROM users WHERE email = ?1",
            [email.trim().to_lowercase()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let user_id = match found {
        Some((id, hash)) if verify_password(password, &hash) => id,
        _ => {
            return Err(FoodgramError::invalid(
                "non_field_errors",
                "Unable to log in with provided credentials",
            ))
        }
    };

    let existing: Option<String> = conn
        .query_row(
            "SELECT key FROM auth_tokens WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(key) = existing {
        return Ok(key);
    }

    let key = issue_token(conn, user_id)?;
    debug!(user_id, "token issued");
    Ok(key)
}

fn issue_token(conn: &Connection, user_id: i64) -> Result<String> {
    let key = format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    );
    conn.execute(
        "INSERT INTO auth_tokens (key, user_id, created) VALUES (?1, ?2, ?3)",
        params![key, user_id, timestamp_to_sql(Utc::now())],
    )?;
    Ok(key)
}

/// Revoke every token of the user
pub fn logout(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute("DELETE FROM auth_tokens WHERE user_id = ?1", [user_id])?;
    Ok(())
}

/// Resolve a token key to its user, `None` if the key is unknown
pub fn user_for_token(conn: &Connection, key: &str) -> Result<Option<User>> {
    let user_id: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM auth_tokens WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;

    match user_id {
        Some(id) => get_user(conn, id).map(Some),
        None => Ok(None),
    }
}

/// Extract the key from an `Authorization: Token <key>` header value
pub fn parse_token_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();
    if scheme.eq_ignore_ascii_case("token") && !key.is_empty() {
        Some(key)
    } else {
        None
    }
}

// ============================================================================
// PERMISSIONS
// ============================================================================

/// Only the author or a staff member may change a recipe
pub fn ensure_can_modify(user: &User, author_id: i64) -> Result<()> {
    if user.id == author_id || user.is_staff {
        Ok(())
    } else {
        Err(FoodgramError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::user::{create_user, NewUser};

    fn register(conn: &Connection, email: &str) -> User {
        create_user(
            conn,
            &NewUser {
                email: email.to_string(),
                username: email.split('@').next().unwrap().to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                password: "s3cret-pass".to_string(),
            },
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2");
        assert!(hash.starts_with("sha256$"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_password_hash_is_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("x", "plain"));
        assert!(!verify_password("x", "md5$salt$abc"));
    }

    #[test]
    fn test_login_issues_stable_token() {
        let conn = open_in_memory().unwrap();
        let user = register(&conn, "cook@example.com");

        let first = login(&conn, "cook@example.com", "s3cret-pass").unwrap();
        let second = login(&conn, "cook@example.com", "s3cret-pass").unwrap();
        assert_eq!(first, second);

        let resolved = user_for_token(&conn, &first).unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[test]
    fn test_login_wrong_password() {
        let conn = open_in_memory().unwrap();
        register(&conn, "cook@example.com");

        let err = login(&conn, "cook@example.com", "nope").unwrap_err();
        assert!(matches!(err, FoodgramError::Validation(_)));
        let err = login(&conn, "ghost@example.com", "s3cret-pass").unwrap_err();
        assert!(matches!(err, FoodgramError::Validation(_)));
    }

    #[test]
    fn test_logout_revokes_token() {
        let conn = open_in_memory().unwrap();
        let user = register(&conn, "cook@example.com");
        let key = login(&conn, "cook@example.com", "s3cret-pass").unwrap();

        logout(&conn, user.id).unwrap();
        assert!(user_for_token(&conn, &key).unwrap().is_none());
    }

    #[test]
    fn test_parse_token_header() {
        assert_eq!(parse_token_header("Token abc123"), Some("abc123"));
        assert_eq!(parse_token_header("token  abc123 "), Some("abc123"));
        assert_eq!(parse_token_header("Bearer abc123"), None);
        assert_eq!(parse_token_header("Token"), None);
    }

    #[test]
    fn test_ensure_can_modify() {
        let conn = open_in_memory().unwrap();
        let author = register(&conn, "author@example.com");
        let other = register(&conn, "other@example.com");
        let mut staff = register(&conn, "staff@example.com");
        staff.is_staff = true;

        assert!(ensure_can_modify(&author, author.id).is_ok());
        assert!(matches!(
            ensure_can_modify(&other, author.id),
            Err(FoodgramError::Forbidden)
        ));
        assert!(ensure_can_modify(&staff, author.id).is_ok());
    }
}
