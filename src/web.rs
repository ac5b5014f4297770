// Goods Catalog - HTTP surface
// Landing page, greeting and the admin JSON endpoints over one shared store

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::admin::{self, AdminEntry, AdminRow};
use crate::audit::Event;
use crate::error::CatalogError;
use crate::pages;
use crate::schema::EntityKind;
use crate::store::{CatalogStore, DeleteReport, ListFilter};

/// Query parameter holding the free-text search
const SEARCH_PARAM: &str = "q";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<CatalogStore>>,
}

impl AppState {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::internal("catalog store lock poisoned"))
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Error half of every handler, rendered as a failed ApiResponse
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::Validation { .. } => StatusCode::BAD_REQUEST,
            CatalogError::NotFound { .. } | CatalogError::UnknownEntity(_) => StatusCode::NOT_FOUND,
            CatalogError::ReferentialIntegrity { .. } => StatusCode::CONFLICT,
            CatalogError::Database(_)
            | CatalogError::Json(_)
            | CatalogError::Csv(_)
            | CatalogError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn entity_kind(name: &str) -> Result<EntityKind, ApiError> {
    Ok(name.parse::<EntityKind>()?)
}

fn list_filter(mut params: HashMap<String, String>) -> ListFilter {
    let mut filter = ListFilter::new();
    filter.search = params.remove(SEARCH_PARAM);

    let mut references: Vec<_> = params.into_iter().collect();
    references.sort();
    for (field, id) in references {
        filter = filter.with_reference(field, id);
    }
    filter
}

// ============================================================================
// Page Handlers
// ============================================================================

/// GET / - Landing page with every good category
async fn serve_index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let store = state.lock()?;
    Ok(Html(pages::index_page(&store)?))
}

/// GET /hello - Greeting with Minsk time
async fn hello() -> String {
    pages::greeting(chrono::Utc::now())
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// GET /admin - Registered entity kinds
async fn admin_index() -> Json<ApiResponse<Vec<AdminEntry>>> {
    Json(ApiResponse::ok(admin::registry()))
}

/// GET /admin/:entity - List, search and filter
async fn list_records(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<AdminRow>> {
    let kind = entity_kind(&entity)?;
    let store = state.lock()?;
    let rows = admin::list(&store, kind, &list_filter(params))?;
    Ok(Json(ApiResponse::ok(rows)))
}

/// POST /admin/:entity - Create from JSON attributes
async fn create_record(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Json(attributes): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<AdminRow>>), ApiError> {
    let kind = entity_kind(&entity)?;
    let mut store = state.lock()?;
    let row = admin::create(&mut store, kind, attributes)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(row))))
}

/// GET /admin/:entity/:id - One record
async fn get_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<AdminRow> {
    let kind = entity_kind(&entity)?;
    let store = state.lock()?;
    Ok(Json(ApiResponse::ok(admin::get(&store, kind, &id)?)))
}

/// PUT /admin/:entity/:id - Partial update
async fn update_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Json(attributes): Json<Value>,
) -> ApiResult<AdminRow> {
    let kind = entity_kind(&entity)?;
    let mut store = state.lock()?;
    let row = admin::update(&mut store, kind, &id, attributes)?;
    Ok(Json(ApiResponse::ok(row)))
}

/// DELETE /admin/:entity/:id - Delete with cascade
async fn delete_record(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<DeleteReport> {
    let kind = entity_kind(&entity)?;
    let mut store = state.lock()?;
    Ok(Json(ApiResponse::ok(admin::delete(&mut store, kind, &id)?)))
}

/// GET /admin/:entity/:id/history - Change log, newest first
async fn record_history(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<Vec<Event>> {
    let kind = entity_kind(&entity)?;
    let store = state.lock()?;
    Ok(Json(ApiResponse::ok(admin::history(&store, kind, &id)?)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/", get(admin_index))
        .route("/:entity", get(list_records).post(create_record))
        .route(
            "/:entity/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/:entity/:id/history", get(record_history));

    Router::new()
        .route("/", get(serve_index))
        .route("/hello", get(hello))
        .route("/api/health", get(health_check))
        .nest("/admin", admin_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(CatalogStore::open_in_memory().unwrap()))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": "OK"}));
    }

    #[tokio::test]
    async fn test_admin_index_lists_kinds() {
        let (status, body) = send(&app(), Method::GET, "/admin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_crud_round() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/admin/good_category",
            Some(json!({"name": "Dairy"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/admin/good_category/{}", id),
            Some(json!({"name": "Milk products"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["display"], "Milk products");

        let (_, body) = send(&app, Method::GET, "/admin/good_category?q=milk", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::DELETE, &format!("/admin/good_category/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"][0]["id"], id.as_str());

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/admin/good_category/{}/history", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["action"], "deleted");
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/admin/spaceship", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, Method::GET, "/admin/unit/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/admin/good_type",
            Some(json!({"name": "Milk", "category": "missing"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, Method::POST, "/admin/good_category", Some(json!({"name": "Dairy"}))).await;
        let category = body["data"]["id"].as_str().unwrap().to_string();
        send(
            &app,
            Method::POST,
            "/admin/good_type",
            Some(json!({"name": "Milk", "category": category})),
        )
        .await;

        let (status, body) = send(&app, Method::DELETE, &format!("/admin/good_category/{}", category), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("good_type"));
    }

    #[tokio::test]
    async fn test_reference_filter() {
        let app = app();
        let (_, body) = send(&app, Method::POST, "/admin/good_category", Some(json!({"name": "Dairy"}))).await;
        let dairy = body["data"]["id"].as_str().unwrap().to_string();
        let (_, body) = send(&app, Method::POST, "/admin/good_category", Some(json!({"name": "Bakery"}))).await;
        let bakery = body["data"]["id"].as_str().unwrap().to_string();

        for (name, category) in [("Milk", &dairy), ("Kefir", &dairy), ("Bread", &bakery)] {
            send(
                &app,
                Method::POST,
                "/admin/good_type",
                Some(json!({"name": name, "category": category})),
            )
            .await;
        }

        let (status, body) = send(&app, Method::GET, &format!("/admin/good_type?category={}", dairy), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, _) = send(&app, Method::GET, "/admin/good_type?colour=red", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_landing_page_and_greeting() {
        let app = app();
        send(&app, Method::POST, "/admin/good_category", Some(json!({"name": "Dairy"}))).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(bytes.to_vec()).unwrap().contains("<li>Dairy</li>"));

        let response = app
            .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(bytes.to_vec()).unwrap().starts_with("Hello, World!\n"));
    }
}
