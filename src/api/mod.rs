// REST API with Axum
//
// Handlers lock the shared connection, run synchronous store calls and
// release the guard before returning; no guard is held across an await.

mod catalog;
mod error;
mod extract;
mod recipes;
mod social;
mod users;

pub use error::{ApiError, ApiResult};
pub use extract::{CurrentUser, MaybeUser};

use crate::error::FoodgramError;
use crate::pagination::DEFAULT_PAGE_SIZE;
use axum::routing::{get, post};
use axum::Router;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub page_size: i64,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub(crate) fn conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| {
            ApiError(FoodgramError::Internal {
                message: "database lock poisoned".to_string(),
            })
        })
    }
}

/// Every `/api` route
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Users & auth
        .route("/users", get(users::list_users).post(users::register))
        .route("/users/me", get(users::me))
        .route("/users/set_password", post(users::set_password))
        .route("/users/subscriptions", get(social::subscriptions))
        .route("/users/:id", get(users::get_user))
        .route(
            "/users/:id/subscribe",
            post(social::subscribe).delete(social::unsubscribe),
        )
        .route("/auth/token/login", post(users::login))
        .route("/auth/token/logout", post(users::logout))
        // Catalog
        .route("/tags", get(catalog::list_tags))
        .route("/tags/:id", get(catalog::get_tag))
        .route("/ingredients", get(catalog::list_ingredients))
        .route("/ingredients/:id", get(catalog::get_ingredient))
        // Recipes
        .route("/recipes", get(recipes::list_recipes).post(recipes::create_recipe))
        .route("/recipes/download_shopping_cart", get(social::download_shopping_cart))
        .route(
            "/recipes/:id",
            get(recipes::get_recipe)
                .patch(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/:id/favorite",
            post(social::add_favorite).delete(social::remove_favorite),
        )
        .route(
            "/recipes/:id/shopping_cart",
            post(social::add_to_cart).delete(social::remove_from_cart),
        );

    Router::new().nest("/api", api).with_state(state)
}
