//! Record HTTP Routes
//!
//! CRUD and pagination endpoints under `/records`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::service::{
    DeleteConfirmation, PageRequest, RecordInput, RecordList, RecordService, ServiceError,
};
use crate::storage::Record;

/// Raw pagination parameters; parsed leniently so bad values fall back to
/// the defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Create record routes
pub fn record_routes(service: RecordService) -> Router {
    Router::new()
        .route(
            "/records",
            get(list_records_handler).post(create_record_handler),
        )
        .route(
            "/records/:id",
            get(get_record_handler)
                .put(update_record_handler)
                .delete(delete_record_handler),
        )
        .with_state(service)
}

fn parse_body(body: Result<Json<RecordInput>, JsonRejection>) -> Result<RecordInput, ServiceError> {
    body.map(|Json(input)| input)
        .map_err(|rejection| ServiceError::Validation(rejection.body_text()))
}

async fn create_record_handler(
    State(service): State<RecordService>,
    body: Result<Json<RecordInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ServiceError> {
    let input = parse_body(body)?;
    let record = service.create_record(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_records_handler(
    State(service): State<RecordService>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RecordList>, ServiceError> {
    let request = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref());
    let list = service.list_records(request).await?;
    Ok(Json(list))
}

async fn get_record_handler(
    State(service): State<RecordService>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ServiceError> {
    let record = service.get_record(&id).await?;
    Ok(Json(record))
}

async fn update_record_handler(
    State(service): State<RecordService>,
    Path(id): Path<String>,
    body: Result<Json<RecordInput>, JsonRejection>,
) -> Result<Json<Record>, ServiceError> {
    let input = parse_body(body)?;
    let record = service.update_record(&id, input).await?;
    Ok(Json(record))
}

async fn delete_record_handler(
    State(service): State<RecordService>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ServiceError> {
    let confirmation = service.delete_record(&id).await?;
    Ok(Json(confirmation))
}
