use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use reco_core::persist::{load_catalog, load_users, SledStore, UserDirectory};
use reco_core::{
    Catalog, Category, Interaction, InteractionHistory, InteractionStore, Item, ItemId, RecoError, RecommenderConfig,
    Session, UserContext,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Header carrying the username of the logged-in user.
pub const USER_HEADER: &str = "X-USER";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: PathBuf,
    pub users: PathBuf,
    pub history_db: PathBuf,
    pub recommender: RecommenderConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog_path: PathBuf,
    pub users: Arc<UserDirectory>,
    pub store: Arc<dyn InteractionStore>,
    pub recommender: RecommenderConfig,
}

type ApiError = (StatusCode, String);
type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct HomeResponse {
    pub user: Option<String>,
    pub recommended: Vec<Item>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Item>,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<Item>,
}

/// Build the app with a sled-backed interaction store.
pub fn build_app(config: AppConfig) -> Result<Router> {
    let store = SledStore::open(&config.history_db)?;
    build_app_with_store(config, Arc::new(store))
}

pub fn build_app_with_store(config: AppConfig, store: Arc<dyn InteractionStore>) -> Result<Router> {
    // Refuse to start on an unreadable catalog rather than failing every page load.
    load_catalog(&config.catalog)?;
    let users = load_users(&config.users)?;
    let app_state = AppState { catalog_path: config.catalog, users: Arc::new(users), store, recommender: config.recommender };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/home", get(home_handler))
        .route("/products/:id", get(product_handler))
        .route("/products/:id/buy", post(buy_handler))
        .route("/search", get(search_handler))
        .route("/categories/:name", get(category_handler))
        .route("/cart", get(cart_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

pub async fn login_handler(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<UserContext> {
    match state.users.find(&req.username) {
        Some(user) => {
            tracing::info!(user = %user.username, "login");
            Ok(Json(user.clone()))
        }
        None => Err((StatusCode::UNAUTHORIZED, "unknown user".into())),
    }
}

pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<serde_json::Value> {
    let user = require_user(&state, &headers)?;
    state.store.clear(&user).map_err(internal)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// A home page load: reload the catalog, rebuild the index in a fresh session
/// and recommend from the user's view history.
pub async fn home_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<HomeResponse> {
    let user = current_user(&state, &headers);
    let history = match &user {
        Some(user) => state.store.history(user).map_err(internal)?,
        None => InteractionHistory::default(),
    };

    let mut session = Session::new(user.clone(), state.recommender.clone());
    session.load_catalog(read_catalog(&state)?);
    let recommended = session.recommend(&history).map_err(internal)?.into_iter().cloned().collect();
    Ok(Json(HomeResponse { user: user.map(|u| u.username), recommended }))
}

pub async fn product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ItemId>,
) -> ApiResult<Item> {
    let catalog = read_catalog(&state)?;
    let item = find_item(&catalog, id)?;
    if let Some(user) = current_user(&state, &headers) {
        state.store.record(&user, Interaction::View(id)).map_err(internal)?;
    }
    Ok(Json(item))
}

pub async fn buy_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<ItemId>,
) -> ApiResult<Item> {
    let user = require_user(&state, &headers)?;
    let catalog = read_catalog(&state)?;
    let item = find_item(&catalog, id)?;
    state.store.record_purchase(&user, id).map_err(internal)?;
    tracing::info!(user = %user.username, item_id = id, "purchase");
    Ok(Json(item))
}

pub async fn search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> ApiResult<SearchResponse> {
    let start = std::time::Instant::now();
    let query = params.q.trim().to_lowercase();
    if query.is_empty() {
        return Ok(Json(SearchResponse { query, took_s: start.elapsed().as_secs_f64(), total_hits: 0, results: vec![] }));
    }

    let catalog = read_catalog(&state)?;
    if let Some(name) = &params.category {
        if catalog.category(name).is_none() {
            return Err((StatusCode::NOT_FOUND, format!("category {name} not found")));
        }
    }
    if let Some(user) = current_user(&state, &headers) {
        state.store.record(&user, Interaction::Search(query.clone())).map_err(internal)?;
    }
    let results: Vec<Item> = catalog.search(&query, params.category.as_deref()).into_iter().cloned().collect();
    Ok(Json(SearchResponse { query, took_s: start.elapsed().as_secs_f64(), total_hits: results.len(), results }))
}

pub async fn category_handler(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Category> {
    let catalog = read_catalog(&state)?;
    catalog
        .category(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("category {name} not found")))
}

pub async fn cart_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<CartResponse> {
    let user = require_user(&state, &headers)?;
    let purchased = state.store.purchased(&user).map_err(internal)?;
    let catalog = read_catalog(&state)?;
    let items = purchased.into_iter().filter_map(|id| catalog.find(id).cloned()).collect();
    Ok(Json(CartResponse { items }))
}

fn current_user(state: &AppState, headers: &HeaderMap) -> Option<UserContext> {
    let name = headers.get(USER_HEADER).and_then(|v| v.to_str().ok())?;
    state.users.find(name).cloned()
}

fn require_user(state: &AppState, headers: &HeaderMap) -> Result<UserContext, ApiError> {
    current_user(state, headers).ok_or_else(|| (StatusCode::UNAUTHORIZED, "login required".into()))
}

fn read_catalog(state: &AppState) -> Result<Catalog, ApiError> {
    load_catalog(&state.catalog_path).map_err(internal)
}

fn find_item(catalog: &Catalog, id: ItemId) -> Result<Item, ApiError> {
    catalog.find(id).cloned().ok_or_else(|| (StatusCode::NOT_FOUND, format!("product {id} not found")))
}

fn internal(err: RecoError) -> ApiError {
    tracing::error!(error = %err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
