//! Generic CRUD endpoints, mounted once per entity
//!
//! | Method | Path             | Call   |
//! |--------|------------------|--------|
//! | POST   | `<path>`         | create |
//! | GET    | `<path>`         | list   |
//! | GET    | `<path>/get`     | get    |
//! | PUT    | `<path>`         | update |
//! | DELETE | `<path>`         | delete |
//!
//! Each handler makes exactly one service-handle call.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use medbook_core::{DeleteQuery, FieldValueQuery, ListQuery, Listed, ValidationError};

use crate::db::{Entity, SurrogateId};
use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidQuery};
use crate::http::params::{DeleteParams, DeleteResponse, GetParams, ListParams};
use crate::service::EntityService;

/// POST - create, returning the stored row
async fn create<E: Entity>(
    State(service): State<EntityService<E>>,
    ValidJson(entity): ValidJson<E>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let stored = service.create(entity).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET - filtered, paginated list with total count
async fn list<E: Entity>(
    State(service): State<EntityService<E>>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> Result<Json<Listed<E>>, ApiError> {
    let query = ListQuery::try_from(params)?;
    Ok(Json(service.list(query).await?))
}

/// GET .../get - single row by id or field/value
async fn get_one<E: Entity>(
    State(service): State<EntityService<E>>,
    ValidQuery(params): ValidQuery<GetParams>,
) -> Result<Json<E>, ApiError> {
    let lookup = FieldValueQuery::try_from(params)?;
    Ok(Json(service.get(lookup).await?))
}

/// PUT - replace business fields of the row the body's id names
async fn update<E: Entity>(
    State(service): State<EntityService<E>>,
    ValidJson(entity): ValidJson<E>,
) -> Result<Json<E>, ApiError> {
    if entity.id().is_unset() {
        return Err(ValidationError::Empty { field: "id" }.into());
    }
    let target = FieldValueQuery::by_id(entity.id());
    Ok(Json(service.update(target, entity).await?))
}

/// DELETE - soft by default, `mode=hard` to remove the row
async fn delete<E: Entity>(
    State(service): State<EntityService<E>>,
    ValidQuery(params): ValidQuery<DeleteParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let query = DeleteQuery::try_from(params)?;
    let success = service.delete(query).await?;
    Ok(Json(DeleteResponse { success }))
}

/// Routes for one entity at `path`
pub fn router<E: Entity>(path: &str, service: EntityService<E>) -> Router {
    Router::new()
        .route(
            path,
            get(list::<E>)
                .post(create::<E>)
                .put(update::<E>)
                .delete(delete::<E>),
        )
        .route(&format!("{}/get", path), get(get_one::<E>))
        .with_state(service)
}
