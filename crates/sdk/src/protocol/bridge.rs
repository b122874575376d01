use futures_util::{future::BoxFuture, FutureExt};
use loyalty_rpc::Network;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    signer::{sign_body, SignerRef},
    types::{PassData, ProgramDetails},
};

use super::{LoyaltyProtocol, Operation};

/// Header carrying the base58 signer address.
pub const SIGNER_HEADER: &str = "x-loyalty-signer";

/// Header carrying the base58 signature over the request body.
pub const SIGNATURE_HEADER: &str = "x-loyalty-signature";

const BODY_SNIPPET_LEN: usize = 1024;

/// Forwards protocol calls to an SDK bridge over HTTP.
///
/// Every call is a `POST {base_url}/{network}/{operation}` whose JSON body is
/// the SDK parameter object. When a signer is configured the body is signed
/// and the signature is attached as headers.
#[derive(Debug, Clone)]
pub struct BridgeProtocol {
    base_url: Url,
    signer: Option<SignerRef>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl BridgeProtocol {
    /// Create a bridge client.
    pub fn try_new(base_url: &str, signer: Option<SignerRef>) -> crate::Result<Self> {
        Self::try_new_with_client(base_url, signer, reqwest::Client::new())
    }

    /// Create a bridge client, reusing a reqwest client.
    pub fn try_new_with_client(
        base_url: &str,
        signer: Option<SignerRef>,
        http: reqwest::Client,
    ) -> crate::Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            signer,
            http,
        })
    }

    fn endpoint(&self, network: Network, operation: Operation) -> crate::Result<Url> {
        Ok(self.base_url.join(&format!("{network}/{operation}"))?)
    }

    /// Call the bridge. Returns `None` when the bridge answers 404.
    async fn call(
        &self,
        network: Network,
        operation: Operation,
        params: &Value,
        require_signer: bool,
    ) -> crate::Result<Option<Value>> {
        let url = self.endpoint(network, operation)?;
        let body = serde_json::to_vec(params)?;

        let mut req = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        match self.signer.as_deref() {
            Some(signer) => {
                let signed = sign_body(signer, &body);
                req = req
                    .header(SIGNER_HEADER, signed.signer.to_string())
                    .header(SIGNATURE_HEADER, signed.signature.to_string());
            }
            None if require_signer => return Err(crate::Error::MissingSecretKey),
            None => {}
        }

        tracing::debug!(%network, %operation, "calling protocol bridge");
        let resp = req.body(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let parsed = serde_json::from_str::<BridgeResponse>(&text);
        if !status.is_success() {
            let message = match parsed {
                Ok(BridgeResponse {
                    error: Some(msg), ..
                }) => msg,
                _ => text.chars().take(BODY_SNIPPET_LEN).collect(),
            };
            return Err(crate::Error::Bridge {
                status: status.as_u16(),
                message,
            });
        }

        match parsed {
            Ok(BridgeResponse {
                error: Some(msg), ..
            }) => Err(crate::Error::Bridge {
                status: status.as_u16(),
                message: msg,
            }),
            Ok(BridgeResponse { result, .. }) => Ok(Some(result)),
            Err(err) => {
                let snippet: String = text.chars().take(BODY_SNIPPET_LEN).collect();
                Err(crate::Error::custom(format!(
                    "failed to decode bridge response: {err} body_snippet: {snippet}"
                )))
            }
        }
    }

    async fn read<T: serde::de::DeserializeOwned>(
        &self,
        network: Network,
        operation: Operation,
        params: Value,
    ) -> crate::Result<Option<T>> {
        match self.call(network, operation, &params, false).await? {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }
}

impl LoyaltyProtocol for BridgeProtocol {
    fn get_asset_data<'a>(
        &'a self,
        network: Network,
        pass: &'a str,
    ) -> BoxFuture<'a, crate::Result<Option<PassData>>> {
        self.read(
            network,
            Operation::GetAssetData,
            json!({ "passAddress": pass }),
        )
        .boxed()
    }

    fn get_program_details<'a>(
        &'a self,
        network: Network,
        collection: &'a str,
    ) -> BoxFuture<'a, crate::Result<Option<ProgramDetails>>> {
        self.read(
            network,
            Operation::GetProgramDetails,
            json!({ "collectionAddress": collection }),
        )
        .boxed()
    }

    fn invoke<'a>(
        &'a self,
        network: Network,
        operation: Operation,
        params: Value,
    ) -> BoxFuture<'a, crate::Result<Value>> {
        async move {
            if !params.is_object() {
                return Err(crate::Error::InvalidParams(
                    "params must be a JSON object".to_string(),
                ));
            }
            self.call(network, operation, &params, !operation.is_read_only())
                .await?
                .ok_or_else(|| crate::Error::NotFound(format!("{operation} target")))
        }
        .boxed()
    }
}
