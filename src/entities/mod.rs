// Entity Models
//
// Each entity owns its table(s) and exposes plain functions over a
// rusqlite Connection. Validation that needs no other entity lives next to
// the entity; cross-entity recipe checks live in crate::validation.

pub mod collection;
pub mod ingredient;
pub mod recipe;
pub mod subscription;
pub mod tag;
pub mod user;

pub use collection::{cart_lines, shopping_report, RecipeCollection};
pub use ingredient::{Ingredient, ImportSummary};
pub use recipe::{Recipe, RecipeIngredient};
pub use tag::{NewTag, Tag};
pub use user::{NewUser, User};
