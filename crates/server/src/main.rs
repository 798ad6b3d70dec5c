use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    domain::{ProductId, UserId},
    error::ApiError,
    protocol::{Health, NewProduct, NewUser, Product, ProductPatch, User, UserPatch, Welcome},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod store;

use app_state::AppState;
use config::load_settings;
use store::Store;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let store = if settings.seed_sample_data {
        Store::seeded().await
    } else {
        Store::new()
    };
    let app = build_router(Arc::new(AppState { store }));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:product_id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state)
}

fn not_found(message: &str) -> (StatusCode, Json<ApiError>) {
    (StatusCode::NOT_FOUND, Json(ApiError::not_found(message)))
}

fn invalid(field: &str, message: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiError::invalid_field(field, message)),
    )
}

fn check_price(price: f64) -> ApiResult<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(invalid("price", "must be a non-negative number"))
    }
}

async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to the Product CRUD API".into(),
    })
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy".into(),
    })
}

async fn list_products(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    Json(state.store.list_products().await)
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<Product>> {
    state
        .store
        .get_product(ProductId(product_id))
        .await
        .map(Json)
        .ok_or_else(|| not_found("Product not found"))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewProduct>,
) -> ApiResult<Json<Product>> {
    check_price(req.price)?;
    let product = state.store.create_product(req).await;
    info!(id = %product.id, "product created");
    Ok(Json(product))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Json(req): Json<ProductPatch>,
) -> ApiResult<Json<Product>> {
    if let Some(price) = req.price {
        check_price(price)?;
    }
    state
        .store
        .update_product(ProductId(product_id), req)
        .await
        .map(Json)
        .ok_or_else(|| not_found("Product not found"))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> ApiResult<StatusCode> {
    if state.store.delete_product(ProductId(product_id)).await {
        info!(product_id, "product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Product not found"))
    }
}

async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.store.list_users().await)
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<User>> {
    state
        .store
        .get_user(UserId(user_id))
        .await
        .map(Json)
        .ok_or_else(|| not_found("User not found"))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> Json<User> {
    let user = state.store.create_user(req).await;
    info!(id = %user.id, "user created");
    Json(user)
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(req): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    state
        .store
        .update_user(UserId(user_id), req)
        .await
        .map(Json)
        .ok_or_else(|| not_found("User not found"))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    if state.store.delete_user(UserId(user_id)).await {
        info!(user_id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("User not found"))
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
