use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use types::{Error, Result};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Signs session ids so cookie values cannot be forged or guessed.
///
/// Tokens look like `<uuid simple>.<base64url hmac>`.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SecretString,
}

impl TokenSigner {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| types::err!("invalid signing key"))
    }

    pub fn sign(&self, id: Uuid) -> Result<String> {
        let id_str = id.simple().to_string();
        let mut mac = self.mac()?;
        mac.update(id_str.as_bytes());
        let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{id_str}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Uuid> {
        let (id_str, signature_b64) = token
            .split_once('.')
            .ok_or_else(|| Error::unauthorized("invalid session token format"))?;

        let signature = BASE64_URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| Error::unauthorized("invalid session token encoding"))?;

        let mut mac = self.mac()?;
        mac.update(id_str.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Error::unauthorized("invalid session token signature"))?;

        Uuid::parse_str(id_str).map_err(|_| Error::unauthorized("invalid session id"))
    }
}
