use std::sync::{Arc, Mutex};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use winenotes_shared::constants::{APP_NAME, SERVER_VINTAGE_MAX, UPLOADS_PATH, UPLOAD_FIELD};
use winenotes_shared::photo::{extension_of, mime_for_file_name};
use winenotes_shared::{Photo, WineDraft, WineEntry, WineId};
use winenotes_store::{Database, StoreError};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::photo_store::PhotoStore;

// Room for multipart framing on top of the photo itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub photos: Arc<PhotoStore>,
}

impl AppState {
    /// Open the database and photo directory named by `config`.
    pub async fn open(config: ServerConfig) -> Result<Self, ServerError> {
        let db = Database::open_at(&config.database_path())?;
        let photos = PhotoStore::new(config.uploads_dir(), config.max_upload_size).await?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            photos: Arc::new(photos),
        })
    }

    fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> Result<T, StoreError>,
    ) -> Result<T, ServerError> {
        let guard = self
            .db
            .lock()
            .map_err(|e| ServerError::Internal(format!("Lock poisoned: {e}")))?;
        Ok(f(&*guard)?)
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let body_limit = state.photos.max_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(health_check))
        .route("/api/wines", get(list_wines).post(create_wine))
        .route(
            "/api/wines/{id}",
            get(get_wine).put(update_wine).delete(delete_wine),
        )
        .route("/api/upload", post(upload_photo))
        .route("/api/uploads/{filename}", get(download_photo))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    message: String,
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct UploadResponse {
    filename: String,
    url: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: format!("{APP_NAME} API"),
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_wines(State(state): State<AppState>) -> Result<Json<Vec<WineEntry>>, ServerError> {
    let wines = state.with_db(|db| db.list_wines())?;
    Ok(Json(wines))
}

async fn get_wine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WineEntry>, ServerError> {
    let wine = state.with_db(|db| db.get_wine(&WineId(id)))?;
    Ok(Json(wine))
}

async fn create_wine(
    State(state): State<AppState>,
    Json(draft): Json<WineDraft>,
) -> Result<Json<WineEntry>, ServerError> {
    draft.validate(SERVER_VINTAGE_MAX)?;

    let now = Utc::now();
    let wine = WineEntry::from_draft(WineId::new(Uuid::new_v4().to_string()), draft, now, now);
    state.with_db(|db| db.insert_wine(&wine))?;

    info!(id = %wine.id, name = %wine.name, "Wine created");
    Ok(Json(wine))
}

async fn update_wine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<WineDraft>,
) -> Result<Json<WineEntry>, ServerError> {
    draft.validate(SERVER_VINTAGE_MAX)?;

    let id = WineId(id);
    let wine = state.with_db(|db| db.update_wine(&id, &draft, Utc::now()))?;

    info!(id = %wine.id, name = %wine.name, "Wine updated");
    Ok(Json(wine))
}

async fn delete_wine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let id = WineId(id);
    let wine = state.with_db(|db| {
        let wine = db.get_wine(&id)?;
        db.delete_wine(&id)?;
        Ok(wine)
    })?;

    if let Some(file_name) = wine.photo.as_ref().and_then(uploaded_file_name) {
        if let Err(e) = state.photos.delete_photo(file_name).await {
            warn!(id = %id, file = %file_name, error = %e, "Could not remove photo of deleted wine");
        }
    }

    info!(id = %id, "Wine deleted");
    Ok(Json(serde_json::json!({ "message": "Wine deleted successfully" })))
}

/// File name of a photo this server stored, if `photo` points at one.
fn uploaded_file_name(photo: &Photo) -> Option<&str> {
    match photo {
        Photo::Remote(path) if path.starts_with(UPLOADS_PATH) => photo.file_name(),
        _ => None,
    }
}

/// A body cut off by the size limit is a 413, anything else malformed a 400.
fn multipart_error(e: MultipartError, max: usize, context: &str) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::UploadTooLarge { max }
    } else {
        ServerError::BadRequest(format!("{context}: {e}"))
    }
}

async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let max = state.photos.max_size();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max, "Multipart error"))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let extension = field.file_name().and_then(extension_of);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max, "Failed to read field"))?;

        let filename = state.photos.store_photo(extension.as_deref(), &data).await?;
        let url = format!("{UPLOADS_PATH}/{filename}");

        info!(file = %filename, size = data.len(), "Photo uploaded");

        return Ok(Json(UploadResponse { filename, url }));
    }

    Err(ServerError::BadRequest(format!(
        "Missing '{UPLOAD_FIELD}' field in multipart form"
    )))
}

async fn download_photo(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state.photos.get_photo(&filename).await?;
    Ok(([(header::CONTENT_TYPE, mime_for_file_name(&filename))], data))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(state, listener).await
}

/// Serve on an already bound listener (lets callers pick port 0).
pub async fn serve_on(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, app).await?;

    Ok(())
}
