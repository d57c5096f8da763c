// handlers/protected/resource.rs - generic CRUD handlers
//
// One set of handlers serves every resource; the router instantiates them per model type
// (`get_one::<Income>`, `get_one::<Budget>`, ...). All of them require an identity.

use axum::extract::State;
use serde_json::Value;

use crate::api::{ApiJson, QueryParams, RecordId};
use crate::app::AppState;
use crate::database::record::parse_id_list;
use crate::database::{Record, RecordError, Resource};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /<prefix>/get_<entity>/:id
pub async fn get_one<T: Resource>(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    RecordId(id): RecordId,
) -> ApiResult<T> {
    let row = state.repository::<T>().get_one(id, &account).await?;
    Ok(ApiResponse::success(format!("{} fetched successfully", T::descriptor().label()), row))
}

/// GET /<prefix>/get_<entities>?<entity>_ids=[1,2,3]
///
/// Ids that do not exist or belong to someone else are left out of the result.
pub async fn get_many<T: Resource>(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    params: QueryParams,
) -> ApiResult<Vec<T>> {
    let descriptor = T::descriptor();
    let param = descriptor.ids_param();
    let raw = params.get(&param).ok_or_else(|| RecordError::MissingRequiredField(param.clone()))?;
    let ids = parse_id_list(&param, raw)?;

    let rows = state.repository::<T>().get_many(&ids, &account).await?;
    Ok(ApiResponse::success(format!("{} fetched", descriptor.plural_label()), rows))
}

/// GET /<prefix>/get_all_<entities>
pub async fn get_all<T: Resource>(State(state): State<AppState>, CurrentUser(account): CurrentUser) -> ApiResult<Vec<T>> {
    let rows = state.repository::<T>().get_all(&account).await?;
    Ok(ApiResponse::success(format!("All {} fetched", T::descriptor().noun_plural), rows))
}

/// POST /<prefix>/post_<entity>
pub async fn create<T: Resource>(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<T> {
    let record = Record::for_create(T::descriptor(), &payload)?;
    let row = state.repository::<T>().create(&record, Some(&account)).await?;
    Ok(ApiResponse::success(format!("{} created", T::descriptor().label()), row))
}

/// PUT /<prefix>/put_<entity>
///
/// The payload names the record by its id column and carries only the fields to change.
pub async fn update<T: Resource>(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<T> {
    let update = Record::for_update(T::descriptor(), &payload)?;
    let row = state.repository::<T>().update(&update, &account).await?;
    Ok(ApiResponse::success(format!("{} updated", T::descriptor().label()), row))
}

/// DELETE /<prefix>/delete_<entity>/:id - returns the row as it was before deletion
pub async fn delete<T: Resource>(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    RecordId(id): RecordId,
) -> ApiResult<T> {
    let row = state.repository::<T>().delete(id, &account).await?;
    Ok(ApiResponse::success(format!("{} deleted", T::descriptor().label()), row))
}
