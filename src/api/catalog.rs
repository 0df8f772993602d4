// Tags and ingredients: read-only, unpaginated

use super::{ApiResult, AppState};
use crate::entities::ingredient::{self, Ingredient};
use crate::entities::tag::{self, Tag};
use crate::query::QueryParams;
use axum::extract::{Path, RawQuery, State};
use axum::Json;

/// GET /api/tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    let conn = state.conn()?;
    Ok(Json(tag::list_tags(&conn)?))
}

/// GET /api/tags/:id
pub async fn get_tag(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Tag>> {
    let conn = state.conn()?;
    Ok(Json(tag::get_tag(&conn, id)?))
}

/// GET /api/ingredients?name=<prefix>
pub async fn list_ingredients(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let params = QueryParams::parse(raw.as_deref());
    let conn = state.conn()?;
    Ok(Json(ingredient::search_ingredients(&conn, params.get("name"))?))
}

/// GET /api/ingredients/:id
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ingredient>> {
    let conn = state.conn()?;
    Ok(Json(ingredient::get_ingredient(&conn, id)?))
}
