// 👥 Subscriptions - users following recipe authors

use crate::entities::user::{get_user, User};
use crate::error::{FoodgramError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

pub const CANT_SUBSCRIBE_TO_YOURSELF: &str = "You cannot subscribe to yourself";
pub const ALREADY_SUBSCRIBED: &str = "You are already subscribed to this author";

/// Follow an author and return them
pub fn subscribe(conn: &Connection, user_id: i64, author_id: i64) -> Result<User> {
    let author = get_user(conn, author_id)?;

    if user_id == author_id {
        return Err(FoodgramError::invalid("errors", CANT_SUBSCRIBE_TO_YOURSELF));
    }
    if is_subscribed(conn, user_id, author_id)? {
        return Err(FoodgramError::invalid("errors", ALREADY_SUBSCRIBED));
    }

    conn.execute(
        "INSERT INTO subscriptions (user_id, following_id) VALUES (?1, ?2)",
        params![user_id, author_id],
    )?;
    info!(user_id, author_id, "subscribed");
    Ok(author)
}

pub fn unsubscribe(conn: &Connection, user_id: i64, author_id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM subscriptions WHERE user_id = ?1 AND following_id = ?2",
        params![user_id, author_id],
    )?;
    if changed == 0 {
        return Err(FoodgramError::not_found("Subscription"));
    }
    info!(user_id, author_id, "unsubscribed");
    Ok(())
}

pub fn is_subscribed(conn: &Connection, user_id: i64, author_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM subscriptions WHERE user_id = ?1 AND following_id = ?2",
            params![user_id, author_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn count_subscriptions(conn: &Connection, user_id: i64) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM subscriptions WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Authors the user follows, in subscription order
pub fn list_subscriptions(
    conn: &Connection,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT following_id FROM subscriptions WHERE user_id = ?1
         ORDER BY id LIMIT ?2 OFFSET ?3",
    )?;
    let ids = stmt
        .query_map(params![user_id, limit, offset], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    ids.into_iter().map(|id| get_user(conn, id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::user::{create_user, NewUser};

    fn user(conn: &Connection, name: &str) -> i64 {
        create_user(
            conn,
            &NewUser {
                email: format!("{name}@example.com"),
                username: name.to_string(),
                first_name: name.to_string(),
                last_name: "Tester".to_string(),
                password: "secret".to_string(),
            },
            false,
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_subscribe_and_list() {
        let conn = open_in_memory().unwrap();
        let reader = user(&conn, "reader");
        let chef = user(&conn, "chef");
        let baker = user(&conn, "baker");

        assert_eq!(subscribe(&conn, reader, chef).unwrap().id, chef);
        subscribe(&conn, reader, baker).unwrap();

        assert!(is_subscribed(&conn, reader, chef).unwrap());
        assert!(!is_subscribed(&conn, chef, reader).unwrap());
        assert_eq!(count_subscriptions(&conn, reader).unwrap(), 2);

        let followed: Vec<String> = list_subscriptions(&conn, reader, 10, 0)
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(followed, vec!["chef", "baker"]);
        assert_eq!(list_subscriptions(&conn, reader, 1, 1).unwrap()[0].id, baker);
    }

    #[test]
    fn test_subscribe_rules() {
        let conn = open_in_memory().unwrap();
        let reader = user(&conn, "reader");
        let chef = user(&conn, "chef");

        let err = subscribe(&conn, reader, reader).unwrap_err();
        assert!(matches!(err, FoodgramError::Validation(ref e) if e[0].message == CANT_SUBSCRIBE_TO_YOURSELF));

        subscribe(&conn, reader, chef).unwrap();
        let err = subscribe(&conn, reader, chef).unwrap_err();
        assert!(matches!(err, FoodgramError::Validation(ref e) if e[0].message == ALREADY_SUBSCRIBED));

        assert!(matches!(
            subscribe(&conn, reader, 999),
            Err(FoodgramError::NotFound { entity: "User" })
        ));
    }

    #[test]
    fn test_unsubscribe() {
        let conn = open_in_memory().unwrap();
        let reader = user(&conn, "reader");
        let chef = user(&conn, "chef");

        subscribe(&conn, reader, chef).unwrap();
        unsubscribe(&conn, reader, chef).unwrap();
        assert!(!is_subscribed(&conn, reader, chef).unwrap());
        assert!(matches!(
            unsubscribe(&conn, reader, chef),
            Err(FoodgramError::NotFound { .. })
        ));
    }
}
