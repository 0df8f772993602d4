// 🍲 Recipe Entity - recipes with their tag and ingredient links
//
// Tag and ingredient links are rewritten wholesale on update: the old rows
// are deleted and the new set inserted inside one transaction.

use crate::db::{timestamp_from_sql, timestamp_to_sql};
use crate::error::{FoodgramError, Result};
use crate::filters::RecipeFilter;
use crate::validation::ValidatedRecipe;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: u32,
    pub pub_date: DateTime<Utc>,
}

/// Ingredient as listed in a recipe, with its amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.pub_date";

fn recipe_from_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    let pub_date: String = row.get(6)?;
    Ok(Recipe {
        id: row.get(0)?,
        author_id: row.get(1)?,
        name: row.get(2)?,
        text: row.get(3)?,
        image: row.get(4)?,
        cooking_time: row.get(5)?,
        pub_date: timestamp_from_sql(&pub_date)?,
    })
}

// ============================================================================
// WRITES
// ============================================================================

pub fn create_recipe(conn: &Connection, author_id: i64, recipe: &ValidatedRecipe) -> Result<Recipe> {
    let image = recipe
        .image
        .as_deref()
        .ok_or_else(|| FoodgramError::invalid("image", "This field is required"))?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO recipes (author_id, name, text, image, cooking_time, pub_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            author_id,
            recipe.name,
            recipe.text,
            image,
            recipe.cooking_time,
            timestamp_to_sql(Utc::now()),
        ],
    )?;
    let id = tx.last_insert_rowid();
    link_tags(&tx, id, &recipe.tags)?;
    link_ingredients(&tx, id, &recipe.ingredients)?;
    tx.commit()?;

    info!(recipe_id = id, author_id, "recipe created");
    get_recipe(conn, id)
}

pub fn update_recipe(conn: &Connection, recipe_id: i64, recipe: &ValidatedRecipe) -> Result<Recipe> {
    let tx = conn.unchecked_transaction()?;

    let changed = tx.execute(
        "UPDATE recipes SET name = ?1, text = ?2, cooking_time = ?3, image = COALESCE(?4, image)
         WHERE id = ?5",
        params![recipe.name, recipe.text, recipe.cooking_time, recipe.image, recipe_id],
    )?;
    if changed == 0 {
        return Err(FoodgramError::not_found("Recipe"));
    }

    tx.execute("DELETE FROM recipe_ingredients WHERE recipe_id = ?1", [recipe_id])?;
    tx.execute("DELETE FROM recipe_tags WHERE recipe_id = ?1", [recipe_id])?;
    link_ingredients(&tx, recipe_id, &recipe.ingredients)?;
    link_tags(&tx, recipe_id, &recipe.tags)?;
    tx.commit()?;

    info!(recipe_id, "recipe updated");
    get_recipe(conn, recipe_id)
}

fn link_tags(conn: &Connection, recipe_id: i64, tags: &[i64]) -> Result<()> {
    let mut stmt = conn.prepare("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?1, ?2)")?;
    for tag_id in tags {
        stmt.execute(params![recipe_id, tag_id])?;
    }
    Ok(())
}

fn link_ingredients(conn: &Connection, recipe_id: i64, ingredients: &[(i64, u32)]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?1, ?2, ?3)",
    )?;
    for (ingredient_id, amount) in ingredients {
        stmt.execute(params![recipe_id, ingredient_id, amount])?;
    }
    Ok(())
}

pub fn delete_recipe(conn: &Connection, recipe_id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM recipes WHERE id = ?1", [recipe_id])?;
    if changed == 0 {
        return Err(FoodgramError::not_found("Recipe"));
    }
    info!(recipe_id, "recipe deleted");
    Ok(())
}

// ============================================================================
// READS
// ============================================================================

pub fn get_recipe(conn: &Connection, id: i64) -> Result<Recipe> {
    conn.query_row(
        &format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = ?1"),
        [id],
        recipe_from_row,
    )
    .optional()?
    .ok_or_else(|| FoodgramError::not_found("Recipe"))
}

pub fn ingredients_for_recipe(conn: &Connection, recipe_id: i64) -> Result<Vec<RecipeIngredient>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.name, i.measurement_unit, ri.amount
         FROM recipe_ingredients ri
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ?1
         ORDER BY ri.id",
    )?;
    let ingredients = stmt
        .query_map([recipe_id], |row| {
            Ok(RecipeIngredient {
                id: row.get(0)?,
                name: row.get(1)?,
                measurement_unit: row.get(2)?,
                amount: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ingredients)
}

/// Filtered recipes, newest first; returns the total match count and one page
pub fn list_recipes(
    conn: &Connection,
    filter: &RecipeFilter,
    viewer: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<(i64, Vec<Recipe>)> {
    let (where_clause, mut values) = filter.to_sql(viewer);

    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM recipes r {where_clause}"),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;

    let limit_at = values.len() + 1;
    values.push(limit.into());
    values.push(offset.into());
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r {where_clause}
         ORDER BY r.pub_date DESC, r.id DESC
         LIMIT ?{} OFFSET ?{}",
        limit_at,
        limit_at + 1
    ))?;
    let recipes = stmt
        .query_map(params_from_iter(values.iter()), recipe_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((count, recipes))
}

/// An author's recipes, newest first, optionally truncated
pub fn recipes_by_author(conn: &Connection, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.author_id = ?1
         ORDER BY r.pub_date DESC, r.id DESC
         LIMIT ?2"
    ))?;
    // SQLite treats a negative LIMIT as unbounded
    let recipes = stmt
        .query_map(params![author_id, limit.unwrap_or(-1)], recipe_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(recipes)
}

pub fn count_by_author(conn: &Connection, author_id: i64) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM recipes WHERE author_id = ?1",
        [author_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
