// ⭐ Per-user recipe collections: favorites and the shopping cart
//
// Both collections share one shape, a unique (user, recipe) pair, so they are
// served by the same code parameterized by RecipeCollection.

use crate::entities::recipe::get_recipe;
use crate::error::{FoodgramError, Result};
use crate::shopping::{aggregate, CartLine, ShoppingReport};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

impl RecipeCollection {
    fn table(&self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "favorites",
            RecipeCollection::ShoppingCart => "shopping_cart",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "Favorites",
            RecipeCollection::ShoppingCart => "Shopping cart",
        }
    }

    fn already_added(&self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "This recipe is already in your favorites",
            RecipeCollection::ShoppingCart => "This recipe is already in your shopping cart",
        }
    }

    /// Add a recipe; 404 for an unknown recipe, 400 if it is already present
    pub fn add(&self, conn: &Connection, user_id: i64, recipe_id: i64) -> Result<()> {
        get_recipe(conn, recipe_id)?;

        if self.contains(conn, user_id, recipe_id)? {
            return Err(FoodgramError::invalid("errors", self.already_added()));
        }

        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, recipe_id) VALUES (?1, ?2)",
                self.table()
            ),
            params![user_id, recipe_id],
        )?;
        info!(user_id, recipe_id, collection = self.as_str(), "recipe added");
        Ok(())
    }

    /// Remove a recipe; 404 when it was never added
    pub fn remove(&self, conn: &Connection, user_id: i64, recipe_id: i64) -> Result<()> {
        let changed = conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND recipe_id = ?2",
                self.table()
            ),
            params![user_id, recipe_id],
        )?;
        if changed == 0 {
            return Err(FoodgramError::not_found(match self {
                RecipeCollection::Favorites => "Favorite",
                RecipeCollection::ShoppingCart => "Shopping cart entry",
            }));
        }
        info!(user_id, recipe_id, collection = self.as_str(), "recipe removed");
        Ok(())
    }

    pub fn contains(&self, conn: &Connection, user_id: i64, recipe_id: i64) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                &format!(
                    "SELECT id FROM {} WHERE user_id = ?1 AND recipe_id = ?2",
                    self.table()
                ),
                params![user_id, recipe_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

/// Every (ingredient, amount) contribution from the recipes in the user's cart.
///
/// Ordered by when each recipe entered the cart, then by the recipe's own
/// ingredient order, so aggregation output is stable.
pub fn cart_lines(conn: &Connection, user_id: i64) -> Result<Vec<CartLine>> {
    let mut stmt = conn.prepare(
        "SELECT i.name, i.measurement_unit, ri.amount
         FROM shopping_cart c
         JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE c.user_id = ?1
         ORDER BY c.id, ri.id",
    )?;
    let lines = stmt
        .query_map([user_id], |row| {
            Ok(CartLine {
                name: row.get(0)?,
                measurement_unit: row.get(1)?,
                amount: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(lines)
}

/// Aggregated shopping list for everything in the user's cart
pub fn shopping_report(conn: &Connection, user_id: i64) -> Result<ShoppingReport> {
    let lines = cart_lines(conn, user_id)?;
    let contributions = lines.len();
    let items = aggregate(lines);
    info!(user_id, contributions, items = items.len(), "shopping list aggregated");
    Ok(ShoppingReport::new(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::ingredient::insert_ingredient;
    use crate::entities::recipe::{create_recipe, delete_recipe};
    use crate::entities::tag::{insert_tag, NewTag};
    use crate::entities::user::{create_user, NewUser};
    use crate::shopping::AggregatedLine;
    use crate::validation::ValidatedRecipe;

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

    fn recipe(conn: &Connection, author: i64, tag: i64, ingredients: Vec<(i64, u32)>) -> i64 {
        create_recipe(
            conn,
            author,
            &ValidatedRecipe {
                name: "Dish".to_string(),
                text: "Steps".to_string(),
                image: Some("img".to_string()),
                cooking_time: 10,
                tags: vec![tag],
                ingredients,
            },
        )
        .unwrap()
        .id
    }

    fn tag(conn: &Connection) -> i64 {
        insert_tag(
            conn,
            &NewTag {
                name: "Lunch".to_string(),
                color: "#123456".to_string(),
                slug: "lunch".to_string(),
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_add_remove_favorite() {
        let conn = open_in_memory().unwrap();
        let cook = user(&conn, "cook");
        let flour = insert_ingredient(&conn, "Flour", "g").unwrap().unwrap().id;
        let dish = recipe(&conn, cook, tag(&conn), vec![(flour, 100)]);

        let favorites = RecipeCollection::Favorites;
        favorites.add(&conn, cook, dish).unwrap();
        assert!(favorites.contains(&conn, cook, dish).unwrap());
        assert!(!RecipeCollection::ShoppingCart.contains(&conn, cook, dish).unwrap());

        assert!(matches!(
            favorites.add(&conn, cook, dish),
            Err(FoodgramError::Validation(_))
        ));

        favorites.remove(&conn, cook, dish).unwrap();
        assert!(matches!(
            favorites.remove(&conn, cook, dish),
            Err(FoodgramError::NotFound { entity: "Favorite" })
        ));
    }

    #[test]
    fn test_add_unknown_recipe() {
        let conn = open_in_memory().unwrap();
        let cook = user(&conn, "cook");
        assert!(matches!(
            RecipeCollection::ShoppingCart.add(&conn, cook, 404),
            Err(FoodgramError::NotFound { entity: "Recipe" })
        ));
    }

    #[test]
    fn test_cart_lines_feed_aggregation() {
        let conn = open_in_memory().unwrap();
        let cook = user(&conn, "cook");
        let buyer = user(&conn, "buyer");
        let lunch = tag(&conn);
        let flour = insert_ingredient(&conn, "Flour", "g").unwrap().unwrap().id;
        let sugar = insert_ingredient(&conn, "Sugar", "g").unwrap().unwrap().id;
        let salt = insert_ingredient(&conn, "Salt", "g").unwrap().unwrap().id;

        let bread = recipe(&conn, cook, lunch, vec![(flour, 200), (sugar, 100)]);
        let cake = recipe(&conn, cook, lunch, vec![(flour, 50)]);
        let soup = recipe(&conn, cook, lunch, vec![(salt, 5)]);

        let cart = RecipeCollection::ShoppingCart;
        cart.add(&conn, buyer, bread).unwrap();
        cart.add(&conn, buyer, cake).unwrap();
        cart.add(&conn, cook, soup).unwrap();

        let report = shopping_report(&conn, buyer).unwrap();
        assert_eq!(report.lines(), vec!["1. Flour - 250 g", "2. Sugar - 100 g"]);
        assert_eq!(shopping_report(&conn, cook).unwrap().lines(), vec!["1. Salt - 5 g"]);

        let lines = cart_lines(&conn, buyer).unwrap();
        assert_eq!(lines.len(), 3);

        assert_eq!(
            aggregate(lines),
            vec![
                AggregatedLine {
                    name: "Flour".to_string(),
                    measurement_unit: "g".to_string(),
                    total: 250,
                },
                AggregatedLine {
                    name: "Sugar".to_string(),
                    measurement_unit: "g".to_string(),
                    total: 100,
                },
            ]
        );
    }

    #[test]
    fn test_cart_empties_when_recipe_deleted() {
        let conn = open_in_memory().unwrap();
        let cook = user(&conn, "cook");
        let flour = insert_ingredient(&conn, "Flour", "g").unwrap().unwrap().id;
        let dish = recipe(&conn, cook, tag(&conn), vec![(flour, 100)]);

        RecipeCollection::ShoppingCart.add(&conn, cook, dish).unwrap();
        delete_recipe(&conn, dish).unwrap();

        assert!(cart_lines(&conn, cook).unwrap().is_empty());
    }
}
