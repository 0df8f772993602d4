// Favorites, shopping cart, subscriptions and the shopping list download

use super::{ApiResult, AppState, CurrentUser};
use crate::entities::collection::{shopping_report, RecipeCollection};
use crate::entities::recipe::get_recipe;
use crate::entities::subscription;
use crate::entities::user::get_user;
use crate::error::FoodgramError;
use crate::pagination::{Page, PageRequest};
use crate::query::QueryParams;
use crate::shopping::REPORT_FILENAME;
use crate::views::{subscription_view, ShortRecipe, SubscriptionView};
use axum::extract::{OriginalUri, Path, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

// ============================================================================
// FAVORITES & CART
// ============================================================================

fn add(
    state: &AppState,
    collection: RecipeCollection,
    user_id: i64,
    recipe_id: i64,
) -> ApiResult<(StatusCode, Json<ShortRecipe>)> {
    let conn = state.conn()?;
    collection.add(&conn, user_id, recipe_id)?;
    let recipe = get_recipe(&conn, recipe_id)?;
    Ok((StatusCode::CREATED, Json(ShortRecipe::from(recipe))))
}

fn remove(
    state: &AppState,
    collection: RecipeCollection,
    user_id: i64,
    recipe_id: i64,
) -> ApiResult<StatusCode> {
    let conn = state.conn()?;
    get_recipe(&conn, recipe_id)?;
    collection.remove(&conn, user_id, recipe_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/:id/favorite
pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<ShortRecipe>)> {
    add(&state, RecipeCollection::Favorites, user.id, id)
}

/// DELETE /api/recipes/:id/favorite
pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove(&state, RecipeCollection::Favorites, user.id, id)
}

/// POST /api/recipes/:id/shopping_cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<ShortRecipe>)> {
    add(&state, RecipeCollection::ShoppingCart, user.id, id)
}

/// DELETE /api/recipes/:id/shopping_cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove(&state, RecipeCollection::ShoppingCart, user.id, id)
}

/// GET /api/recipes/download_shopping_cart
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let conn = state.conn()?;
    let report = shopping_report(&conn, user.id)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            ),
        ],
        report.render(),
    ))
}

// ============================================================================
// SUBSCRIPTIONS
// ============================================================================

fn recipes_limit(params: &QueryParams) -> ApiResult<Option<i64>> {
    match params.get("recipes_limit") {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(Some(n)),
            _ => Err(FoodgramError::invalid("recipes_limit", "Enter a non-negative whole number").into()),
        },
    }
}

/// GET /api/users/subscriptions
pub async fn subscriptions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Page<SubscriptionView>>> {
    let params = QueryParams::parse(raw.as_deref());
    let request = PageRequest::from_query(&params, state.page_size)?;
    let limit = recipes_limit(&params)?;

    let conn = state.conn()?;
    let count = subscription::count_subscriptions(&conn, user.id)?;
    let results = subscription::list_subscriptions(&conn, user.id, request.limit, request.offset()?)?
        .into_iter()
        .map(|author| subscription_view(&conn, author, user.id, limit))
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(Json(Page::new(request, count, results, uri.path(), &params)?))
}

/// POST /api/users/:id/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> ApiResult<(StatusCode, Json<SubscriptionView>)> {
    let params = QueryParams::parse(raw.as_deref());
    let limit = recipes_limit(&params)?;

    let conn = state.conn()?;
    let author = subscription::subscribe(&conn, user.id, id)?;
    let view = subscription_view(&conn, author, user.id, limit)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/users/:id/subscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let conn = state.conn()?;
    get_user(&conn, id)?;
    subscription::unsubscribe(&conn, user.id, id)?;
    Ok(StatusCode::NO_CONTENT)
}
