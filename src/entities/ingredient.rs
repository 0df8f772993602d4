// 🥕 Ingredient Entity - catalog of products with their measurement units

use crate::error::{FieldError, FoodgramError, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

const MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

fn ingredient_from_row(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        name: row.get(1)?,
        measurement_unit: row.get(2)?,
    })
}

fn validate(name: &str, measurement_unit: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for (field, value) in [("name", name), ("measurement_unit", measurement_unit)] {
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, "This field may not be blank"));
        } else if value.chars().count() > MAX_LEN {
            errors.push(FieldError::new(field, "Ensure this field has no more than 200 characters"));
        }
    }
    errors
}

/// Insert an ingredient; returns `None` when the (name, unit) pair already exists
pub fn insert_ingredient(
    conn: &Connection,
    name: &str,
    measurement_unit: &str,
) -> Result<Option<Ingredient>> {
    let errors = validate(name, measurement_unit);
    if !errors.is_empty() {
        return Err(FoodgramError::Validation(errors));
    }

    let name = name.trim();
    let changed = conn.execute(
        "INSERT OR IGNORE INTO ingredients (name, name_lower, measurement_unit) VALUES (?1, ?2, ?3)",
        params![name, name.to_lowercase(), measurement_unit.trim()],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get_ingredient(conn, conn.last_insert_rowid()).map(Some)
}

pub fn get_ingredient(conn: &Connection, id: i64) -> Result<Ingredient> {
    conn.query_row(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id = ?1",
        [id],
        ingredient_from_row,
    )
    .optional()?
    .ok_or_else(|| FoodgramError::not_found("Ingredient"))
}

/// Case-insensitive prefix search by name; an empty prefix lists everything.
///
/// `name_lower` holds the Unicode-lowercased name, so the prefix becomes an
/// indexed range `[prefix, prefix + U+10FFFF)`. SQLite's own case folding is
/// ASCII-only and would miss Cyrillic names.
pub fn search_ingredients(conn: &Connection, prefix: Option<&str>) -> Result<Vec<Ingredient>> {
    let prefix = prefix.unwrap_or("").trim().to_lowercase();

    let ingredients = if prefix.is_empty() {
        let mut stmt = conn.prepare(
            "SELECT id, name, measurement_unit FROM ingredients ORDER BY name_lower, id",
        )?;
        let rows = stmt
            .query_map([], ingredient_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    } else {
        let upper = format!("{}{}", prefix, char::MAX);
        let mut stmt = conn.prepare(
            "SELECT id, name, measurement_unit FROM ingredients
             WHERE name_lower >= ?1 AND name_lower < ?2
             ORDER BY name_lower, id",
        )?;
        let rows = stmt
            .query_map(params![prefix, upper], ingredient_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };
    Ok(ingredients)
}

/// Load ingredients from a `name,measurement_unit` CSV (header row optional)
pub fn import_csv(conn: &Connection, csv_path: &Path) -> Result<ImportSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(csv_path)?;

    let tx = conn.unchecked_transaction()?;
    let mut summary = ImportSummary::default();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let (name, unit) = match (record.get(0), record.get(1)) {
            (Some(name), Some(unit)) => (name, unit),
            _ => {
                warn!(line = line + 1, "skipping row without two columns");
                summary.rejected += 1;
                continue;
            }
        };

        if line == 0 && name.eq_ignore_ascii_case("name") {
            continue;
        }

        match insert_ingredient(&tx, name, unit) {
            Ok(Some(_)) => summary.inserted += 1,
            Ok(None) => summary.duplicates += 1,
            Err(FoodgramError::Validation(errors)) => {
                warn!(line = line + 1, ?errors, "skipping invalid ingredient");
                summary.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tx.commit()?;
    info!(
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        rejected = summary.rejected,
        "ingredient import finished"
    );
    Ok(summary)
}
