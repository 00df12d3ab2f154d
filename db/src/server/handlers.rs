use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::errors::ServiceError;

use super::dto::{
    AddChunkRequest, CreateDocumentRequest, CreateLibraryRequest, ListChunksQuery, SearchRequest,
    SearchResponse, UpdateChunkRequest, UpdateLibraryRequest,
};
use super::AppState;

/// Not-found-class errors map to 404; validation and already-exists map to 400; anything else
/// (persistence, replication, an internal similarity bug) is a 500 — the caller did nothing
/// wrong, the server did.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            match &self {
                ServiceError::DocumentAlreadyExists(_) => StatusCode::BAD_REQUEST,
                ServiceError::Validation(_) | ServiceError::Type(_) | ServiceError::Similarity(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ServiceError::Persistence(_) | ServiceError::Replication(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => unreachable!("not-found variants handled above"),
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn create_library(
    State(state): State<AppState>,
    Json(body): Json<CreateLibraryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let library = state.service.create_library(body.name, body.metadata)?;
    Ok(Json(library))
}

pub async fn get_library(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.service.get_library(library_id)?))
}

pub async fn update_library(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
    Json(body): Json<UpdateLibraryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let library = state
        .service
        .update_library(library_id, body.name, body.metadata)?;
    Ok(Json(library))
}

pub async fn delete_library(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.delete_library(library_id)?;
    Ok(StatusCode::OK)
}

pub async fn create_document(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
    Json(body): Json<CreateDocumentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let document = state
        .service
        .create_document(library_id, body.id, body.title, body.metadata)?;
    Ok(Json(document))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.service.list_documents(library_id)?))
}

pub async fn add_chunk(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
    Json(body): Json<AddChunkRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let chunk = state.service.add_chunk(
        library_id,
        body.document_id,
        body.text,
        body.embedding,
        body.metadata,
    )?;
    Ok(Json(chunk))
}

pub async fn list_chunks(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
    Query(query): Query<ListChunksQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.service.list_chunks(library_id, query.offset, query.limit)?,
    ))
}

pub async fn update_chunk(
    State(state): State<AppState>,
    Path((library_id, chunk_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateChunkRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let chunk = state.service.update_chunk(
        library_id,
        chunk_id,
        body.text,
        body.embedding,
        body.metadata,
    )?;
    Ok(Json(chunk))
}

pub async fn delete_chunk(
    State(state): State<AppState>,
    Path((library_id, chunk_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.delete_chunk(library_id, chunk_id)?;
    Ok(StatusCode::OK)
}

pub async fn search(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
    Json(body): Json<SearchRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    body.validate()?;
    let results = state.service.search(
        library_id,
        &body.query,
        body.k,
        &body.algorithm,
        body.filter.as_ref(),
    )?;
    Ok(Json(SearchResponse { results }))
}
