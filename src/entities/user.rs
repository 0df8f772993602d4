// 👤 User Entity - registration, lookup, password changes

use crate::auth::{hash_password, verify_password};
use crate::db::{timestamp_from_sql, timestamp_to_sql};
use crate::error::{FieldError, FoodgramError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip)]
    pub is_staff: bool,
    #[serde(skip)]
    pub date_joined: DateTime<Utc>,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl NewUser {
    /// Field-level checks that need no database access
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "This field may not be blank"));
        } else if email.len() > MAX_EMAIL_LEN || !is_plausible_email(email) {
            errors.push(FieldError::new("email", "Enter a valid email address"));
        }

        if self.username.is_empty() {
            errors.push(FieldError::new("username", "This field may not be blank"));
        } else if self.username.chars().count() > MAX_NAME_LEN {
            errors.push(FieldError::new(
                "username",
                format!("Ensure this field has no more than {} characters", MAX_NAME_LEN),
            ));
        } else if !is_valid_username(&self.username) {
            errors.push(FieldError::new(
                "username",
                "Username may contain only letters, numbers, and @/./+/-/_ characters",
            ));
        }

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, "This field may not be blank"));
            } else if value.chars().count() > MAX_NAME_LEN {
                errors.push(FieldError::new(
                    field,
                    format!("Ensure this field has no more than {} characters", MAX_NAME_LEN),
                ));
            }
        }

        if self.password.is_empty() {
            errors.push(FieldError::new("password", "This field may not be blank"));
        }

        errors
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let joined: String = row.get(6)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        is_staff: row.get(5)?,
        date_joined: timestamp_from_sql(&joined)?,
    })
}

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, is_staff, date_joined";

/// Register a user after validating the payload and uniqueness of email/username
pub fn create_user(conn: &Connection, new_user: &NewUser, is_staff: bool) -> Result<User> {
    let mut errors = new_user.validate();

    let email = new_user.email.trim().to_lowercase();
    if errors.iter().all(|e| e.field != "email") && exists(conn, "email", &email)? {
        errors.push(FieldError::new("email", "A user with that email already exists"));
    }
    if errors.iter().all(|e| e.field != "username") && exists(conn, "username", &new_user.username)? {
        errors.push(FieldError::new("username", "A user with that username already exists"));
    }
    if !errors.is_empty() {
        return Err(FoodgramError::Validation(errors));
    }

    conn.execute(
        "INSERT INTO users (email, username, first_name, last_name, password_hash, is_staff, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            email,
            new_user.username,
            new_user.first_name.trim(),
            new_user.last_name.trim(),
            hash_password(&new_user.password),
            is_staff,
            timestamp_to_sql(Utc::now()),
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!(user_id = id, username = %new_user.username, is_staff, "user registered");
    get_user(conn, id)
}

fn exists(conn: &Connection, column: &str, value: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM users WHERE {column} = ?1"),
            [value],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn get_user(conn: &Connection, id: i64) -> Result<User> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| FoodgramError::not_found("User"))
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

pub fn list_users(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ?1 OFFSET ?2"
    ))?;
    let users = stmt
        .query_map(params![limit, offset], user_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Change the password after checking the current one
pub fn set_password(
    conn: &Connection,
    user_id: i64,
    current_password: &str,
    new_password: &str,
) -> Result<()> {
    let stored: String = conn
        .query_row(
            "SELECT password_hash FROM users WHERE id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| FoodgramError::not_found("User"))?;

    if !verify_password(current_password, &stored) {
        return Err(FoodgramError::invalid("current_password", "Invalid password"));
    }
    if new_password.is_empty() {
        return Err(FoodgramError::invalid("new_password", "This field may not be blank"));
    }

    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id = ?2",
        params![hash_password(new_password), user_id],
    )?;
    info!(user_id, "password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn payload(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            password: "pass-1234".to_string(),
        }
    }

    #[test]
    fn test_create_and_get_user() {
        let conn = open_in_memory().unwrap();
        let user = create_user(&conn, &payload("Ivan@Example.com", "ivan"), false).unwrap();

        assert_eq!(user.email, "ivan@example.com");
        assert!(!user.is_staff);
        assert_eq!(get_user(&conn, user.id).unwrap(), user);
    }

    #[test]
    fn test_duplicate_email_and_username_rejected() {
        let conn = open_in_memory().unwrap();
        create_user(&conn, &payload("a@example.com", "alpha"), false).unwrap();

        let err = create_user(&conn, &payload("a@example.com", "alpha"), false).unwrap_err();
        match err {
            FoodgramError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "username"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_payload() {
        let mut bad = payload("not-an-email", "bad name!");
        bad.first_name = "  ".to_string();
        bad.password = String::new();

        let fields: Vec<String> = bad.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["email", "username", "first_name", "password"]);
    }

    #[test]
    fn test_username_allows_django_charset() {
        assert!(is_valid_username("chef.ivan+test@home-1_x"));
        assert!(!is_valid_username("chef ivan"));
    }

    #[test]
    fn test_get_missing_user() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(
            get_user(&conn, 42),
            Err(FoodgramError::NotFound { entity: "User" })
        ));
    }

    #[test]
    fn test_list_users_pages() {
        let conn = open_in_memory().unwrap();
        for i in 0..5 {
            create_user(&conn, &payload(&format!("u{i}@example.com"), &format!("u{i}")), false)
                .unwrap();
        }

        assert_eq!(count_users(&conn).unwrap(), 5);
        let page = list_users(&conn, 2, 2).unwrap();
        let names: Vec<&str> = page.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["u2", "u3"]);
    }

    #[test]
    fn test_set_password() {
        let conn = open_in_memory().unwrap();
        let user = create_user(&conn, &payload("a@example.com", "alpha"), false).unwrap();

        let err = set_password(&conn, user.id, "wrong", "new-pass").unwrap_err();
        assert!(matches!(err, FoodgramError::Validation(_)));

        set_password(&conn, user.id, "pass-1234", "new-pass").unwrap();
        assert!(crate::auth::login(&conn, "a@example.com", "new-pass").is_ok());
        assert!(crate::auth::login(&conn, "a@example.com", "pass-1234").is_err());
    }
}
