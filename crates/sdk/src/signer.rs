use std::sync::Arc;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};

/// Shared server signer.
pub type SignerRef = Arc<Keypair>;

/// Decode the server signing key.
///
/// Accepts a base58 encoded 64-byte keypair, or the JSON byte array
/// written by `solana-keygen`.
pub fn load_signer(secret: Option<&str>) -> crate::Result<SignerRef> {
    let secret = secret
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(crate::Error::MissingSecretKey)?;
    let bytes = if secret.starts_with('[') {
        serde_json::from_str::<Vec<u8>>(secret)
            .map_err(|err| crate::Error::InvalidSecretKey(err.to_string()))?
    } else {
        bs58::decode(secret)
            .into_vec()
            .map_err(|err| crate::Error::InvalidSecretKey(err.to_string()))?
    };
    let keypair =
        Keypair::from_bytes(&bytes).map_err(|err| crate::Error::InvalidSecretKey(err.to_string()))?;
    Ok(Arc::new(keypair))
}

/// A detached signature over a request body.
#[derive(Debug, Clone)]
pub struct BodySignature {
    /// Signer address.
    pub signer: Pubkey,
    /// Signature over the body bytes.
    pub signature: Signature,
}

/// Sign a request body.
pub fn sign_body(signer: &Keypair, body: &[u8]) -> BodySignature {
    BodySignature {
        signer: signer.pubkey(),
        signature: signer.sign_message(body),
    }
}
