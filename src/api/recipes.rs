// Recipe CRUD

use super::{ApiResult, AppState, CurrentUser, MaybeUser};
use crate::auth::ensure_can_modify;
use crate::entities::recipe as store;
use crate::filters::RecipeFilter;
use crate::pagination::{Page, PageRequest};
use crate::query::QueryParams;
use crate::validation::{validate_recipe, RecipeInput, WriteMode};
use crate::views::{recipe_view, RecipeView};
use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;

/// GET /api/recipes
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: MaybeUser,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Page<RecipeView>>> {
    let params = QueryParams::parse(raw.as_deref());
    let filter = RecipeFilter::from_query(&params)?;
    let request = PageRequest::from_query(&params, state.page_size)?;

    let conn = state.conn()?;
    let (count, recipes) = store::list_recipes(&conn, &filter, viewer.id(), request.limit, request.offset()?)?;
    let results = recipes
        .into_iter()
        .map(|recipe| recipe_view(&conn, recipe, viewer.id()))
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(Json(Page::new(request, count, results, uri.path(), &params)?))
}

/// GET /api/recipes/:id
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecipeView>> {
    let conn = state.conn()?;
    let recipe = store::get_recipe(&conn, id)?;
    Ok(Json(recipe_view(&conn, recipe, viewer.id())?))
}

/// POST /api/recipes
pub async fn create_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    let Json(input) = payload?;
    let conn = state.conn()?;

    let recipe = validate_recipe(&conn, &input, WriteMode::Create)?;
    let created = store::create_recipe(&conn, user.id, &recipe)?;
    Ok((StatusCode::CREATED, Json(recipe_view(&conn, created, Some(user.id))?)))
}

/// PATCH /api/recipes/:id
pub async fn update_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<Json<RecipeView>> {
    let conn = state.conn()?;

    let existing = store::get_recipe(&conn, id)?;
    ensure_can_modify(&user, existing.author_id)?;

    let Json(input) = payload?;
    let recipe = validate_recipe(&conn, &input, WriteMode::Update)?;
    let updated = store::update_recipe(&conn, id, &recipe)?;
    Ok(Json(recipe_view(&conn, updated, Some(user.id))?))
}

/// DELETE /api/recipes/:id
pub async fn delete_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let conn = state.conn()?;
    let existing = store::get_recipe(&conn, id)?;
    ensure_can_modify(&user, existing.author_id)?;
    store::delete_recipe(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}
