#![allow(dead_code)]

use std::sync::Arc;

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use url::Url;

use textbin::access::AccessController;
use textbin::api::envelope::{ApiErrorBody, ApiResponse};
use textbin::api::requests::{
    CreateDocumentRequest, CreatedDocument, Credentials, DeleteDocumentRequest,
    EncryptedDocumentBody, UpdateDocumentRequest,
};
use textbin::lifecycle::{DocumentLifecycle, NewDocument};
use textbin::listing::ListingEngine;
use textbin::models::document::{DocumentRecord, DocumentType, Privacy};
use textbin::models::listing::{ListFilters, ListQuery, SortBy, SortOrder, DEFAULT_PAGE_SIZE};
use textbin::models::report::ReportRequest;
use textbin::models::tokens::{DocumentId, Password, ReadCode, UpdateCode};
use textbin::{HttpTextbinApi, MemoryTextbinApi, TextbinApi, TextbinError};

/// Serves an in-memory backend over real HTTP on an ephemeral port.
///
/// The server task lives as long as the test runtime.
pub struct TestEnv {
    pub backend: Arc<MemoryTextbinApi>,
    pub api: Arc<HttpTextbinApi>,
    pub base_url: Url,
    _server: JoinHandle<()>,
}

impl TestEnv {
    pub async fn start() -> Self {
        let backend = Arc::new(MemoryTextbinApi::new());
        let router = router(Arc::clone(&backend));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("Invalid test URL");
        let api = Arc::new(HttpTextbinApi::new(base_url.clone()));

        Self {
            backend,
            api,
            base_url,
            _server: server,
        }
    }

    pub fn client(&self) -> Arc<dyn TextbinApi> {
        self.api.clone()
    }

    pub fn lifecycle(&self) -> DocumentLifecycle {
        DocumentLifecycle::new(self.client())
    }

    pub fn controller(&self) -> AccessController {
        AccessController::new(self.client())
    }

    pub fn listing(&self, page_size: u32) -> ListingEngine {
        ListingEngine::new(self.client(), page_size)
    }

    /// Create a public text document through the HTTP client.
    pub async fn create_public(&self, title: &str, tags: &[&str]) -> CreatedDocument {
        let mut new = NewDocument::new(title, format!("Content of {title}"));
        new.tags = tags.iter().copied().collect();
        self.lifecycle()
            .create(new)
            .await
            .expect("Failed to create public document")
    }

    /// Create a private, password-protected document through the HTTP client.
    pub async fn create_private(&self, title: &str, password: &str) -> CreatedDocument {
        let mut new = NewDocument::new(title, "secret content");
        new.privacy = Privacy::Private;
        new.password = Some(Password::new(password));
        self.lifecycle()
            .create(new)
            .await
            .expect("Failed to create private document")
    }
}

/// Turns backend errors into the service's `{error, success:false}` responses.
struct ApiError(TextbinError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            TextbinError::AccessDenied(msg) => (StatusCode::UNAUTHORIZED, msg),
            TextbinError::RequestFailed(msg) if msg.contains("not found") => {
                (StatusCode::NOT_FOUND, msg)
            }
            TextbinError::RequestFailed(msg)
            | TextbinError::Validation(msg)
            | TextbinError::Storage(msg)
            | TextbinError::Config(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(ApiErrorBody::new(message))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

fn ok<T: Serialize>(body: T) -> ApiResult {
    Ok(Json(ApiResponse::ok(body)).into_response())
}

fn router(backend: Arc<MemoryTextbinApi>) -> Router {
    Router::new()
        .route(
            "/documents",
            get(list_documents).post(create_document).put(update_document),
        )
        .route("/documents/delete", post(delete_document))
        .route("/documents/get/{id}", get(get_document_by_id))
        .route("/documents/status/{code}", get(get_privacy_status))
        .route("/documents/read/{code}", get(read_document))
        .route("/documents/update/{code}", get(get_document_for_update))
        .route("/reports", post(create_report))
        .with_state(backend)
}

async fn create_document(
    State(backend): State<Arc<MemoryTextbinApi>>,
    Json(request): Json<CreateDocumentRequest>,
) -> ApiResult {
    match backend.create_document(&request).await.map_err(ApiError)? {
        CreatedDocument::Plain(document) => ok(document),
        CreatedDocument::Encrypted {
            document,
            decryption_key,
        } => ok(EncryptedDocumentBody {
            decryption_key,
            document,
        }),
    }
}

async fn update_document(
    State(backend): State<Arc<MemoryTextbinApi>>,
    Json(request): Json<UpdateDocumentRequest>,
) -> ApiResult {
    ok(backend.update_document(&request).await.map_err(ApiError)?)
}

async fn get_document_by_id(
    State(backend): State<Arc<MemoryTextbinApi>>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(backend
        .get_document_by_id(&DocumentId::new(id))
        .await
        .map_err(ApiError)?)
}

async fn get_privacy_status(
    State(backend): State<Arc<MemoryTextbinApi>>,
    Path(code): Path<String>,
) -> ApiResult {
    ok(backend
        .get_privacy_status(&ReadCode::new(code))
        .await
        .map_err(ApiError)?)
}

#[derive(Deserialize)]
struct ReadParams {
    password: Option<String>,
    key: Option<String>,
}

async fn read_document(
    State(backend): State<Arc<MemoryTextbinApi>>,
    Path(code): Path<String>,
    Query(params): Query<ReadParams>,
) -> ApiResult {
    let mut credentials = Credentials::none();
    if let Some(password) = params.password {
        credentials = credentials.with_password(password);
    }
    if let Some(key) = params.key {
        credentials = credentials.with_decryption_key(key);
    }

    let read = backend
        .read_document(&ReadCode::new(code), &credentials)
        .await
        .map_err(ApiError)?;
    let mut record = DocumentRecord::from(read.document);
    record.is_reported = Some(read.is_reported);
    ok(record)
}

async fn get_document_for_update(
    State(backend): State<Arc<MemoryTextbinApi>>,
    Path(code): Path<String>,
) -> ApiResult {
    ok(backend
        .get_document_for_update(&UpdateCode::new(code))
        .await
        .map_err(ApiError)?)
}

async fn list_documents(
    State(backend): State<Arc<MemoryTextbinApi>>,
    RawQuery(raw): RawQuery,
) -> ApiResult {
    let query = parse_list_query(raw.as_deref().unwrap_or("")).map_err(ApiError)?;
    ok(backend.list_documents(&query).await.map_err(ApiError)?)
}

async fn delete_document(
    State(backend): State<Arc<MemoryTextbinApi>>,
    Json(request): Json<DeleteDocumentRequest>,
) -> ApiResult {
    backend.delete_document(&request).await.map_err(ApiError)?;
    ok(serde_json::json!({ "message": "Document deleted" }))
}

async fn create_report(
    State(backend): State<Arc<MemoryTextbinApi>>,
    Json(request): Json<ReportRequest>,
) -> ApiResult {
    ok(backend.create_report(&request).await.map_err(ApiError)?)
}

/// Parse the listing query, including repeated `tags[]` parameters.
fn parse_list_query(raw: &str) -> Result<ListQuery, TextbinError> {
    let invalid = |name: &str, value: &str| {
        TextbinError::Validation(format!("Invalid value '{value}' for '{name}'"))
    };

    let mut query = ListQuery {
        page: 1,
        limit: DEFAULT_PAGE_SIZE,
        filters: ListFilters::default(),
    };
    for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match name.as_ref() {
            "page" => query.page = value.parse().map_err(|_| invalid(&name, &value))?,
            "limit" => query.limit = value.parse().map_err(|_| invalid(&name, &value))?,
            "tags[]" | "tags" => {
                query.filters.tags.insert(value.into_owned());
            }
            "type" => {
                query.filters.doc_type =
                    Some(DocumentType::from_str_ci(&value).ok_or_else(|| invalid(&name, &value))?)
            }
            "sortBy" => {
                query.filters.sort_by = match value.as_ref() {
                    "createdAt" => SortBy::CreatedAt,
                    "views" => SortBy::Views,
                    _ => return Err(invalid(&name, &value)),
                }
            }
            "sortOrder" => {
                query.filters.sort_order = match value.as_ref() {
                    "asc" => SortOrder::Asc,
                    "desc" => SortOrder::Desc,
                    _ => return Err(invalid(&name, &value)),
                }
            }
            _ => {}
        }
    }
    Ok(query)
}
