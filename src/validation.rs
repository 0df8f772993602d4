// 📐 Recipe Validation - checks run before a recipe is created or rewritten
//
// All problems are collected, not just the first, so a client can fix a
// payload in one round trip.

use crate::error::{FieldError, FoodgramError, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use std::collections::HashSet;

const MAX_NAME_LEN: usize = 200;

pub const NO_INGREDIENTS: &str = "At least one ingredient is required";
pub const REPEAT_INGREDIENTS: &str = "A recipe cannot list the same ingredient twice";
pub const NO_TAGS: &str = "At least one tag is required";
pub const REPEAT_TAG: &str = "A recipe cannot have the same tag twice";
pub const UNACCEPTABLE_COOKING_TIME: &str = "Cooking time must be at least 1 minute";
pub const UNACCEPTABLE_AMOUNT: &str = "Ingredient amount must be at least 1";

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientAmountInput {
    pub id: i64,
    pub amount: i64,
}

/// Recipe payload as the client sent it; missing fields are reported by validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeInput {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountInput>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub cooking_time: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    /// Image may be omitted and the stored one is kept
    Update,
}

/// Recipe payload that passed every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecipe {
    pub name: String,
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: u32,
    pub tags: Vec<i64>,
    /// (ingredient id, amount) in payload order
    pub ingredients: Vec<(i64, u32)>,
}

// ============================================================================
// VALIDATOR
// ============================================================================

pub fn validate_recipe(
    conn: &Connection,
    input: &RecipeInput,
    mode: WriteMode,
) -> Result<ValidatedRecipe> {
    let mut errors = Vec::new();

    // Name & text
    let name = input.name.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() {
        errors.push(FieldError::new("name", "This field is required"));
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new("name", "Ensure this field has no more than 200 characters"));
    }

    let text = input.text.as_deref().map(str::trim).unwrap_or("");
    if text.is_empty() {
        errors.push(FieldError::new("text", "This field is required"));
    }

    // Image
    let image = input
        .image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if image.is_none() && mode == WriteMode::Create {
        errors.push(FieldError::new("image", "This field is required"));
    }

    // Cooking time
    let cooking_time = match input.cooking_time {
        None => {
            errors.push(FieldError::new("cooking_time", "This field is required"));
            0
        }
        Some(t) if t < 1 => {
            errors.push(FieldError::new("cooking_time", UNACCEPTABLE_COOKING_TIME));
            0
        }
        Some(t) => match u32::try_from(t) {
            Ok(t) => t,
            Err(_) => {
                errors.push(FieldError::new("cooking_time", "Cooking time is too large"));
                0
            }
        },
    };

    // Tags
    if input.tags.is_empty() {
        errors.push(FieldError::new("tags", NO_TAGS));
    } else {
        let unique: HashSet<i64> = input.tags.iter().copied().collect();
        if unique.len() < input.tags.len() {
            errors.push(FieldError::new("tags", REPEAT_TAG));
        }
        for id in &input.tags {
            if !row_exists(conn, "tags", *id)? {
                errors.push(FieldError::new(
                    "tags",
                    format!("Invalid pk \"{}\" - object does not exist", id),
                ));
            }
        }
    }

    // Ingredients
    let mut ingredients = Vec::with_capacity(input.ingredients.len());
    if input.ingredients.is_empty() {
        errors.push(FieldError::new("ingredients", NO_INGREDIENTS));
    } else {
        let mut seen = HashSet::new();
        let mut repeated = false;
        let mut bad_amount = false;

        for item in &input.ingredients {
            if !seen.insert(item.id) {
                repeated = true;
            }
            match u32::try_from(item.amount) {
                Ok(amount) if amount >= 1 => ingredients.push((item.id, amount)),
                _ => bad_amount = true,
            }
            if !row_exists(conn, "ingredients", item.id)? {
                errors.push(FieldError::new(
                    "ingredients",
                    format!("Ingredient with id {} does not exist", item.id),
                ));
            }
        }

        if bad_amount {
            errors.push(FieldError::new("ingredients", UNACCEPTABLE_AMOUNT));
        }
        if repeated {
            errors.push(FieldError::new("ingredients", REPEAT_INGREDIENTS));
        }
    }

    if !errors.is_empty() {
        return Err(FoodgramError::Validation(errors));
    }

    Ok(ValidatedRecipe {
        name: name.to_string(),
        text: text.to_string(),
        image,
        cooking_time,
        tags: input.tags.clone(),
        ingredients,
    })
}

fn row_exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(&format!("SELECT id FROM {table} WHERE id = ?1"), [id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::ingredient::insert_ingredient;
    use crate::entities::tag::{insert_tag, NewTag};

    struct Fixture {
        conn: Connection,
        tag: i64,
        other_tag: i64,
        flour: i64,
        sugar: i64,
    }

    fn fixture() -> Fixture {
        let conn = open_in_memory().unwrap();
        let tag = insert_tag(
            &conn,
            &NewTag {
                name: "Breakfast".to_string(),
                color: "#E26C2D".to_string(),
                slug: "breakfast".to_string(),
            },
        )
        .unwrap()
        .id;
        let other_tag = insert_tag(
            &conn,
            &NewTag {
                name: "Dinner".to_string(),
                color: "#49B64E".to_string(),
                slug: "dinner".to_string(),
            },
        )
        .unwrap()
        .id;
        let flour = insert_ingredient(&conn, "Flour", "g").unwrap().unwrap().id;
        let sugar = insert_ingredient(&conn, "Sugar", "g").unwrap().unwrap().id;
        Fixture { conn, tag, other_tag, flour, sugar }
    }

    fn valid_input(f: &Fixture) -> RecipeInput {
        RecipeInput {
            ingredients: vec![
                IngredientAmountInput { id: f.flour, amount: 200 },
                IngredientAmountInput { id: f.sugar, amount: 50 },
            ],
            tags: vec![f.tag, f.other_tag],
            image: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            name: Some("Pancakes".to_string()),
            text: Some("Mix and fry.".to_string()),
            cooking_time: Some(20),
        }
    }

    fn messages(err: FoodgramError) -> Vec<(String, String)> {
        match err {
            FoodgramError::Validation(errors) => {
                errors.into_iter().map(|e| (e.field, e.message)).collect()
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_recipe() {
        let f = fixture();
        let validated = validate_recipe(&f.conn, &valid_input(&f), WriteMode::Create).unwrap();

        assert_eq!(validated.name, "Pancakes");
        assert_eq!(validated.cooking_time, 20);
        assert_eq!(validated.ingredients, vec![(f.flour, 200), (f.sugar, 50)]);
    }

    #[test]
    fn test_empty_ingredients_and_tags() {
        let f = fixture();
        let mut input = valid_input(&f);
        input.ingredients.clear();
        input.tags.clear();

        let errors = messages(validate_recipe(&f.conn, &input, WriteMode::Create).unwrap_err());
        assert!(errors.contains(&("tags".to_string(), NO_TAGS.to_string())));
        assert!(errors.contains(&("ingredients".to_string(), NO_INGREDIENTS.to_string())));
    }

    #[test]
    fn test_repeated_tags_and_ingredients() {
        let f = fixture();
        let mut input = valid_input(&f);
        input.tags = vec![f.tag, f.tag];
        input.ingredients.push(IngredientAmountInput { id: f.flour, amount: 10 });

        let errors = messages(validate_recipe(&f.conn, &input, WriteMode::Create).unwrap_err());
        assert_eq!(
            errors,
            vec![
                ("tags".to_string(), REPEAT_TAG.to_string()),
                ("ingredients".to_string(), REPEAT_INGREDIENTS.to_string()),
            ]
        );
    }

    #[test]
    fn test_bounds() {
        let f = fixture();
        let mut input = valid_input(&f);
        input.cooking_time = Some(0);
        input.ingredients[0].amount = 0;

        let errors = messages(validate_recipe(&f.conn, &input, WriteMode::Create).unwrap_err());
        assert_eq!(
            errors,
            vec![
                ("cooking_time".to_string(), UNACCEPTABLE_COOKING_TIME.to_string()),
                ("ingredients".to_string(), UNACCEPTABLE_AMOUNT.to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_references() {
        let f = fixture();
        let mut input = valid_input(&f);
        input.tags.push(999);
        input.ingredients.push(IngredientAmountInput { id: 555, amount: 1 });

        let errors = messages(validate_recipe(&f.conn, &input, WriteMode::Create).unwrap_err());
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["tags", "ingredients"]);
    }

    #[test]
    fn test_missing_fields() {
        let f = fixture();
        let errors = messages(
            validate_recipe(&f.conn, &RecipeInput::default(), WriteMode::Create).unwrap_err(),
        );
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(
            fields,
            vec!["name", "text", "image", "cooking_time", "tags", "ingredients"]
        );
    }

    #[test]
    fn test_image_optional_on_update() {
        let f = fixture();
        let mut input = valid_input(&f);
        input.image = None;

        assert!(validate_recipe(&f.conn, &input, WriteMode::Create).is_err());
        let validated = validate_recipe(&f.conn, &input, WriteMode::Update).unwrap();
        assert_eq!(validated.image, None);
    }

    #[test]
    fn test_name_too_long() {
        let f = fixture();
        let mut input = valid_input(&f);
        input.name = Some("x".repeat(201));

        let errors = messages(validate_recipe(&f.conn, &input, WriteMode::Create).unwrap_err());
        assert_eq!(errors[0].0, "name");
    }
}
