use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver as BroadcastReceiver;

use crate::api::ApiError;
use crate::model::{AllCityWeather, City, WeatherObservation};
use crate::validation;

pub fn router(state: Arc<crate::AppState>) -> Router {
    Router::new()
        .route(
            "/weather",
            get(get_all_handler)
                .post(add_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/weather/:city",
            get(get_handler)
                .put(update_handler)
                .delete(delete_handler)
                .fallback(method_not_allowed_handler),
        )
        .fallback(fallback_handler)
        .layer(Extension(state))
}

pub async fn run(
    state: Arc<crate::AppState>,
    addr: SocketAddr,
    mut shutdown: BroadcastReceiver<()>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

// Unknown city names can never be in the store.
fn path_city(city: &str) -> Result<City, ApiError> {
    city.parse::<City>().map_err(|_| ApiError::not_found())
}

async fn add_handler(
    Extension(state): Extension<Arc<crate::AppState>>,
    body: Bytes,
) -> Result<Json<WeatherObservation>, ApiError> {
    let obs = validation::parse(&body)?;
    let stored = state.store.lock().await.add(obs)?;
    Ok(Json(stored))
}

async fn get_handler(
    Extension(state): Extension<Arc<crate::AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<WeatherObservation>, ApiError> {
    let Path(city) = path?;
    let city = path_city(&city)?;
    let store = state.store.lock().await;
    Ok(Json(store.latest(city)?.clone()))
}

async fn get_all_handler(Extension(state): Extension<Arc<crate::AppState>>) -> Json<AllCityWeather> {
    let all_city_weather = state.store.lock().await.all_latest();
    Json(AllCityWeather { all_city_weather })
}

async fn delete_handler(
    Extension(state): Extension<Arc<crate::AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(city) = path?;
    let city = path_city(&city)?;
    state.store.lock().await.delete(city)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_handler(
    Extension(state): Extension<Arc<crate::AppState>>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<WeatherObservation>, ApiError> {
    let obs = validation::parse(&body)?;
    let Path(city) = path?;
    let city = path_city(&city)?;
    let stored = state.store.lock().await.update(city, obs)?;
    Ok(Json(stored))
}

async fn fallback_handler() -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        "The requested URL was not found on the server.",
    )
}

async fn method_not_allowed_handler() -> ApiError {
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "The method is not allowed for the requested URL.",
    )
}
