use async_trait::async_trait;
use serde_json::Value;
use tinyfs::Op;

use crate::entry::{Envelope, Payload};
use crate::error::{OpLogError, Result};

/// Encryption capability for log payloads
///
/// The primitive itself lives outside this crate; implementations map
/// their own failures into [`crate::OpLogError::Crypter`].
#[async_trait]
pub trait Crypter: Send + Sync {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope>;
    async fn decrypt(&self, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>>;
}

/// Turns a descriptor into a log payload, encrypting it when a crypter is given.
pub async fn seal(op: &Op, crypter: Option<&dyn Crypter>) -> Result<Payload> {
    match crypter {
        Some(crypter) => {
            let plaintext = serde_json::to_vec(op)?;
            Ok(Payload::Sealed(crypter.encrypt(&plaintext).await?))
        }
        None => Ok(Payload::Plain(serde_json::to_value(op)?)),
    }
}

/// Recovers the raw descriptor carried by a payload.
///
/// A sealed payload needs a crypter; decryption failures come back as
/// [`OpLogError::Crypter`] and undecodable plaintext as [`OpLogError::Json`].
/// The descriptor itself is not interpreted here.
pub async fn unseal(payload: &Payload, crypter: Option<&dyn Crypter>) -> Result<Value> {
    match payload {
        Payload::Plain(value) => Ok(value.clone()),
        Payload::Sealed(envelope) => {
            let crypter =
                crypter.ok_or_else(|| OpLogError::crypter("sealed entry but no crypter configured"))?;
            let plaintext = crypter.decrypt(&envelope.ciphertext, &envelope.iv).await?;
            Ok(serde_json::from_slice(&plaintext)?)
        }
    }
}
