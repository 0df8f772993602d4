// Response shapes: entities enriched with viewer-relative flags
//
// `viewer` is the requesting user's id, `None` for anonymous requests; every
// flag (is_subscribed, is_favorited, is_in_shopping_cart) is false for them.

use crate::entities::collection::RecipeCollection;
use crate::entities::recipe::{count_by_author, ingredients_for_recipe, recipes_by_author, Recipe, RecipeIngredient};
use crate::entities::subscription::is_subscribed;
use crate::entities::tag::{tags_for_recipe, Tag};
use crate::entities::user::{get_user, User};
use crate::error::Result;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

pub fn user_view(conn: &Connection, user: User, viewer: Option<i64>) -> Result<UserView> {
    let is_subscribed = match viewer {
        Some(viewer_id) => is_subscribed(conn, viewer_id, user.id)?,
        None => false,
    };
    Ok(UserView {
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: u32,
}

pub fn recipe_view(conn: &Connection, recipe: Recipe, viewer: Option<i64>) -> Result<RecipeView> {
    let author = user_view(conn, get_user(conn, recipe.author_id)?, viewer)?;
    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer_id) => (
            RecipeCollection::Favorites.contains(conn, viewer_id, recipe.id)?,
            RecipeCollection::ShoppingCart.contains(conn, viewer_id, recipe.id)?,
        ),
        None => (false, false),
    };

    Ok(RecipeView {
        id: recipe.id,
        tags: tags_for_recipe(conn, recipe.id)?,
        author,
        ingredients: ingredients_for_recipe(conn, recipe.id)?,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// Compact recipe card used by favorites, cart and subscription listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortRecipe {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: u32,
}

impl From<Recipe> for ShortRecipe {
    fn from(recipe: Recipe) -> Self {
        ShortRecipe {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub author: UserView,
    pub recipes: Vec<ShortRecipe>,
    pub recipes_count: i64,
}

pub fn subscription_view(
    conn: &Connection,
    author: User,
    viewer: i64,
    recipes_limit: Option<i64>,
) -> Result<SubscriptionView> {
    let recipes = recipes_by_author(conn, author.id, recipes_limit)?
        .into_iter()
        .map(ShortRecipe::from)
        .collect();
    let recipes_count = count_by_author(conn, author.id)?;

    Ok(SubscriptionView {
        author: user_view(conn, author, Some(viewer))?,
        recipes,
        recipes_count,
    })
}
