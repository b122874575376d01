use poem::{
    handler,
    web::{Data, Json, Path, Query},
    IntoResponse, Response,
};
use loyalty_sdk::{utils::parse_address, Network, ProgramDetails};

use super::{
    error::{from_sdk, ErrorCodes},
    png_card, ApiError, NetworkQuery,
};
use crate::{render, state::AppState};

const CODES: ErrorCodes = ErrorCodes {
    not_found: "PROGRAM_NOT_FOUND",
    failed: "PROGRAM_ERROR",
};

async fn fetch(
    state: &AppState,
    network: Network,
    program: &str,
) -> Result<ProgramDetails, ApiError> {
    parse_address(program).map_err(|err| from_sdk(err, &CODES))?;
    state
        .protocol
        .get_program_details(network, program)
        .await
        .map_err(|err| from_sdk(err, &CODES))?
        .ok_or_else(|| ApiError::not_found("Program not found").with_code(CODES.not_found))
}

#[handler]
pub(super) async fn get_program(
    Path(program): Path<String>,
    Query(query): Query<NetworkQuery>,
    Data(state): Data<&AppState>,
) -> Response {
    let result = async {
        let network = query.network()?;
        let details = fetch(state, network, &program).await?;
        Ok::<_, ApiError>(Json(serde_json::json!({ "data": details })).into_response())
    };
    result.await.unwrap_or_else(IntoResponse::into_response)
}

#[handler]
pub(super) async fn get_program_image(
    Path(program): Path<String>,
    Query(query): Query<NetworkQuery>,
    Data(state): Data<&AppState>,
) -> Response {
    let result = async {
        let network = query.network()?;
        let details = fetch(state, network, &program).await?;
        png_card(render::program_card(&program, &details)).await
    };
    result.await.unwrap_or_else(IntoResponse::into_response)
}
