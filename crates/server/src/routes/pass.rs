use poem::{
    handler,
    web::{Data, Json, Path, Query},
    IntoResponse, Response,
};
use loyalty_sdk::{utils::parse_address, Network, PassData};

use super::{
    error::{from_sdk, ErrorCodes},
    png_card, ApiError, NetworkQuery,
};
use crate::{render, state::AppState};

const CODES: ErrorCodes = ErrorCodes {
    not_found: "PASS_NOT_FOUND",
    failed: "PASS_ERROR",
};

async fn fetch(state: &AppState, network: Network, pass: &str) -> Result<PassData, ApiError> {
    parse_address(pass).map_err(|err| from_sdk(err, &CODES))?;
    state
        .protocol
        .get_asset_data(network, pass)
        .await
        .map_err(|err| from_sdk(err, &CODES))?
        .ok_or_else(|| ApiError::not_found("Pass not found").with_code(CODES.not_found))
}

#[handler]
pub(super) async fn get_pass(
    Path(pass): Path<String>,
    Query(query): Query<NetworkQuery>,
    Data(state): Data<&AppState>,
) -> Response {
    let result = async {
        let network = query.network()?;
        let data = fetch(state, network, &pass).await?;
        Ok::<_, ApiError>(Json(serde_json::json!({ "data": data })).into_response())
    };
    result.await.unwrap_or_else(IntoResponse::into_response)
}

#[handler]
pub(super) async fn get_pass_image(
    Path(pass): Path<String>,
    Query(query): Query<NetworkQuery>,
    Data(state): Data<&AppState>,
) -> Response {
    let result = async {
        let network = query.network()?;
        let data = fetch(state, network, &pass).await?;
        png_card(render::pass_card(&pass, &data)).await
    };
    result.await.unwrap_or_else(IntoResponse::into_response)
}
