use poem::{
    handler,
    web::{Data, Json, Path, Query},
    IntoResponse, Response,
};
use loyalty_sdk::{Leaderboard, Network};
use serde::Deserialize;

use super::{
    error::{from_sdk, ErrorCodes},
    parse_network, png_card, ApiError, NetworkQuery,
};
use crate::{render, state::AppState};

const CODES: ErrorCodes = ErrorCodes {
    not_found: "LEADERBOARD_NOT_FOUND",
    failed: "LEADERBOARD_ERROR",
};

async fn build(state: &AppState, network: Network, program: &str) -> Result<Leaderboard, ApiError> {
    Leaderboard::fetch(
        state.index.as_ref(),
        state.protocol.as_ref(),
        network,
        program,
        &state.leaderboard,
    )
    .await
    .map_err(|err| from_sdk(err, &CODES))
}

#[handler]
pub(super) async fn get_leaderboard(
    Path(program): Path<String>,
    Query(query): Query<NetworkQuery>,
    Data(state): Data<&AppState>,
) -> Response {
    let result = async {
        let network = query.network()?;
        let leaderboard = build(state, network, &program).await?;
        Ok::<_, ApiError>(Json(serde_json::json!({ "data": leaderboard })).into_response())
    };
    result.await.unwrap_or_else(IntoResponse::into_response)
}

/// Query of the leaderboard image.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ImageQuery {
    network: Option<String>,
    background_image: Option<String>,
    header_image: Option<String>,
    default_avatar: Option<String>,
}

#[handler]
pub(super) async fn get_leaderboard_image(
    Path(program): Path<String>,
    Query(query): Query<ImageQuery>,
    Data(state): Data<&AppState>,
) -> Response {
    let result = async {
        let network = parse_network(query.network.as_deref())?;
        let leaderboard = build(state, network, &program).await?;
        let options = render::CardOptions {
            background_image: query.background_image.clone(),
            header_image: query.header_image.clone(),
            default_avatar: query.default_avatar.clone(),
        }
        .embed_images(&state.http)
        .await;
        png_card(render::leaderboard_card(&leaderboard, &options)).await
    };
    result.await.unwrap_or_else(IntoResponse::into_response)
}
