use poem::{http::StatusCode, web::Json, IntoResponse, Response};
use serde::Serialize;

/// JSON error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl ToString) -> Self {
        Self {
            status,
            error: error.to_string(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn bad_request(error: impl ToString) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl ToString) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn internal(error: impl ToString) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        Json(self).with_status(status).into_response()
    }
}

/// Error codes of a read endpoint.
pub(crate) struct ErrorCodes {
    pub(crate) not_found: &'static str,
    pub(crate) failed: &'static str,
}

/// Map an SDK error of a read endpoint into an envelope.
pub(crate) fn from_sdk(err: loyalty_sdk::Error, codes: &ErrorCodes) -> ApiError {
    if err.is_bad_request() {
        ApiError::bad_request(&err).with_code("INVALID_ADDRESS")
    } else if err.is_not_found() {
        ApiError::not_found(&err).with_code(codes.not_found)
    } else {
        tracing::error!(%err, "request failed");
        ApiError::internal(&err).with_code(codes.failed)
    }
}
