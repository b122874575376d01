use std::str::FromStr;

use poem::{
    handler,
    web::{Data, Json, Path},
    IntoResponse, Response,
};
use loyalty_sdk::{Network, Operation};
use serde_json::{json, Value};

use super::ApiError;
use crate::state::AppState;

/// Split the request body into the target network and the SDK parameters.
fn split_params(body: &str) -> Result<(Network, Value), ApiError> {
    let mut params = if body.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str::<Value>(body)
            .map_err(|err| ApiError::bad_request(format!("Invalid JSON body: {err}")))?
    };
    let Some(object) = params.as_object_mut() else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };
    let network = match object.remove("network") {
        None | Some(Value::Null) => Network::default(),
        Some(Value::String(name)) => Network::parse(&name)
            .map_err(|_| ApiError::bad_request(format!("Invalid network `{name}`")))?,
        Some(other) => {
            return Err(ApiError::bad_request(format!("Invalid network `{other}`")));
        }
    };
    Ok((network, params))
}

#[handler]
pub(super) async fn invoke_operation(
    Path(name): Path<String>,
    Data(state): Data<&AppState>,
    body: String,
) -> Response {
    let result = async {
        let operation = Operation::from_str(&name)
            .map_err(|_| ApiError::not_found(format!("Unknown operation `{name}`")))?;
        let (network, params) = split_params(&body)?;
        let result = state
            .protocol
            .invoke(network, operation, params)
            .await
            .map_err(|err| {
                if err.is_bad_request() {
                    ApiError::bad_request(&err)
                } else if err.is_not_found() {
                    ApiError::not_found(&err)
                } else {
                    tracing::error!(%operation, %network, %err, "operation failed");
                    ApiError::internal(&err)
                }
            })?;
        tracing::info!(%operation, %network, "operation succeeded");
        Ok::<_, ApiError>(
            Json(json!({
                "success": true,
                "operation": operation.to_string(),
                "network": network,
                "result": result,
            }))
            .into_response(),
        )
    };
    result.await.unwrap_or_else(IntoResponse::into_response)
}
