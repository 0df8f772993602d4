// 🔎 Recipe Filters - author, tags, favorites and cart restrictions

use crate::error::{FieldError, FoodgramError, Result};
use crate::query::QueryParams;
use rusqlite::types::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<i64>,
    /// A recipe matches when it carries any of these slugs
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeFilter {
    pub fn from_query(params: &QueryParams) -> Result<Self> {
        let mut errors = Vec::new();

        let author = match params.get("author") {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push(FieldError::new("author", "Enter a whole number"));
                    None
                }
            },
        };

        let mut flag = |key: &str| match params.get(key) {
            None => false,
            Some(raw) => parse_bool(raw).unwrap_or_else(|| {
                errors.push(FieldError::new(key, "Enter a valid boolean (1, 0, true, false)"));
                false
            }),
        };
        let is_favorited = flag("is_favorited");
        let is_in_shopping_cart = flag("is_in_shopping_cart");

        if !errors.is_empty() {
            return Err(FoodgramError::Validation(errors));
        }

        Ok(RecipeFilter {
            author,
            tags: params
                .get_all("tags")
                .into_iter()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            is_favorited,
            is_in_shopping_cart,
        })
    }

    /// WHERE clause over `recipes r` plus its bound values.
    ///
    /// Favorite and cart restrictions only apply to a known viewer.
    pub(crate) fn to_sql(&self, viewer: Option<i64>) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(author) = self.author {
            values.push(Value::Integer(author));
            clauses.push(format!("r.author_id = ?{}", values.len()));
        }

        if !self.tags.is_empty() {
            let mut placeholders = Vec::with_capacity(self.tags.len());
            for slug in &self.tags {
                values.push(Value::Text(slug.clone()));
                placeholders.push(format!("?{}", values.len()));
            }
            clauses.push(format!(
                "r.id IN (SELECT rt.recipe_id FROM recipe_tags rt
                          JOIN tags t ON t.id = rt.tag_id
                          WHERE t.slug IN ({}))",
                placeholders.join(", ")
            ));
        }

        if let Some(user_id) = viewer {
            for (enabled, table) in [
                (self.is_favorited, "favorites"),
                (self.is_in_shopping_cart, "shopping_cart"),
            ] {
                if enabled {
                    values.push(Value::Integer(user_id));
                    clauses.push(format!(
                        "r.id IN (SELECT recipe_id FROM {} WHERE user_id = ?{})",
                        table,
                        values.len()
                    ));
                }
            }
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
