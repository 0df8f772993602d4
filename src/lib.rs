// Foodgram - Core Library
// Exposes all modules for use in the admin CLI, the API server, and tests

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod filters;
pub mod logging;
pub mod pagination;
pub mod query;
pub mod shopping;       // Cart aggregation and the downloadable shopping list
pub mod validation;
pub mod views;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{open_database, open_in_memory, setup_database};
pub use error::{FieldError, FoodgramError, Result};
pub use shopping::{aggregate, AggregatedLine, CartLine, ShoppingReport};
pub use entities::{
    cart_lines, shopping_report, RecipeCollection,
    Ingredient, ImportSummary,
    Recipe, RecipeIngredient,
    NewTag, Tag,
    NewUser, User,
};
pub use filters::RecipeFilter;
pub use pagination::{Page, PageRequest};
pub use query::QueryParams;
pub use validation::{validate_recipe, RecipeInput, ValidatedRecipe, WriteMode};
pub use views::{RecipeView, ShortRecipe, SubscriptionView, UserView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
