use poem::{
    get, handler, middleware::Tracing, post, web::Json, Endpoint, EndpointExt, Response, Route,
};
use loyalty_sdk::Network;
use serde::Deserialize;

use crate::{
    render::{self, RenderError},
    state::AppState,
};

mod error;
mod leaderboard;
mod operations;
mod pass;
mod program;

pub use error::ApiError;

/// Build the HTTP application.
pub fn app(state: AppState) -> impl Endpoint<Output = Response> {
    Route::new()
        .at("/health", get(health))
        .at("/api/leaderboard/:program", get(leaderboard::get_leaderboard))
        .at("/api/leaderboard/:program/image", get(leaderboard::get_leaderboard_image))
        .at("/api/pass/:pass", get(pass::get_pass))
        .at("/api/pass/:pass/image", get(pass::get_pass_image))
        .at("/api/program/:program", get(program::get_program))
        .at("/api/program/:program/image", get(program::get_program_image))
        .at("/api/:operation", post(operations::invoke_operation))
        .data(state)
        .with(Tracing)
}

#[handler]
fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Rasterize a laid out card into an uncached PNG response.
pub(crate) async fn png_card(layout: Result<String, std::fmt::Error>) -> Result<Response, ApiError> {
    let svg = layout.map_err(|err| card_error(err.into()))?;
    let png = tokio::task::spawn_blocking(move || render::rasterize(&svg))
        .await
        .map_err(|err| {
            tracing::error!(%err, "card task failed");
            ApiError::internal("Failed to render image")
        })?
        .map_err(card_error)?;
    Ok(render::png_response(png))
}

fn card_error(err: RenderError) -> ApiError {
    tracing::error!(%err, "failed to render card");
    ApiError::internal("Failed to render image")
}

/// `network` query parameter.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NetworkQuery {
    network: Option<String>,
}

impl NetworkQuery {
    pub(crate) fn network(&self) -> Result<Network, ApiError> {
        parse_network(self.network.as_deref())
    }
}

pub(crate) fn parse_network(network: Option<&str>) -> Result<Network, ApiError> {
    match network.map(str::trim).filter(|s| !s.is_empty()) {
        None => Err(ApiError::bad_request("Network parameter is required").with_code("NETWORK_REQUIRED")),
        Some(name) => Network::parse(name).map_err(|_| {
            ApiError::bad_request(format!(
                "Invalid network `{name}`, expected `devnet` or `mainnet-beta`"
            ))
            .with_code("INVALID_NETWORK")
        }),
    }
}
