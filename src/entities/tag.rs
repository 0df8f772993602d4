// 🏷️ Tag Entity - recipe labels (breakfast, lunch, ...)

use crate::error::{FieldError, FoodgramError, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

const MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl NewTag {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "This field may not be blank"));
        } else if self.name.chars().count() > MAX_LEN {
            errors.push(FieldError::new("name", "Ensure this field has no more than 200 characters"));
        }

        if !is_hex_color(&self.color) {
            errors.push(FieldError::new("color", "Color must be a hex value like #E26C2D"));
        }

        if self.slug.is_empty() || self.slug.len() > MAX_LEN || !is_slug(&self.slug) {
            errors.push(FieldError::new(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens",
            ));
        }

        errors
    }
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn is_slug(slug: &str) -> bool {
    slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        slug: row.get(3)?,
    })
}

pub fn insert_tag(conn: &Connection, tag: &NewTag) -> Result<Tag> {
    let mut errors = tag.validate();
    if errors.is_empty() && get_tag_by_slug(conn, &tag.slug)?.is_some() {
        errors.push(FieldError::new("slug", "Tag with this slug already exists"));
    }
    if !errors.is_empty() {
        return Err(FoodgramError::Validation(errors));
    }

    conn.execute(
        "INSERT INTO tags (name, color, slug) VALUES (?1, ?2, ?3)",
        params![tag.name.trim(), tag.color.to_uppercase(), tag.slug],
    )?;
    let id = conn.last_insert_rowid();
    info!(tag_id = id, slug = %tag.slug, "tag created");
    get_tag(conn, id)
}

pub fn get_tag(conn: &Connection, id: i64) -> Result<Tag> {
    conn.query_row(
        "SELECT id, name, color, slug FROM tags WHERE id = ?1",
        [id],
        tag_from_row,
    )
    .optional()?
    .ok_or_else(|| FoodgramError::not_found("Tag"))
}

pub fn get_tag_by_slug(conn: &Connection, slug: &str) -> Result<Option<Tag>> {
    let tag = conn
        .query_row(
            "SELECT id, name, color, slug FROM tags WHERE slug = ?1",
            [slug],
            tag_from_row,
        )
        .optional()?;
    Ok(tag)
}

pub fn list_tags(conn: &Connection) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name, color, slug FROM tags ORDER BY id")?;
    let tags = stmt
        .query_map([], tag_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

/// Tags attached to a recipe, in the order they were linked
pub fn tags_for_recipe(conn: &Connection, recipe_id: i64) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.color, t.slug
         FROM recipe_tags rt
         JOIN tags t ON t.id = rt.tag_id
         WHERE rt.recipe_id = ?1
         ORDER BY rt.id",
    )?;
    let tags = stmt
        .query_map([recipe_id], tag_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}
