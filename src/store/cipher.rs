//! Encryption of stored period records

use anyhow::{Context, Result, anyhow, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};

const CURRENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SealedRecord {
    version: u32,
    nonce: String,
    ciphertext: String,
}

/// ChaCha20-Poly1305 with a fresh random nonce per record.
pub struct RecordCipher {
    key: [u8; 32],
}

impl std::fmt::Debug for RecordCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecordCipher(..)")
    }
}

impl RecordCipher {
    /// Accepts a base64 encoded 32-byte key or a 32 character ascii key.
    pub fn from_secret(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let decoded = match BASE64.decode(trimmed) {
            Ok(bytes) if bytes.len() == 32 => bytes,
            _ if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
            Ok(_) => bail!("Secret key must decode to exactly 32 bytes"),
            Err(_) => bail!("Secret key must be a base64 string or a 32-byte ascii value"),
        };

        let mut key = [0u8; 32];
        key.copy_from_slice(&decoded);
        Ok(Self { key })
    }

    #[allow(deprecated)]
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| anyhow!("Failed to encrypt period record"))?;
        let record = SealedRecord {
            version: CURRENT_VERSION,
            nonce: BASE64.encode(nonce_bytes),
            ciphertext: BASE64.encode(ciphertext),
        };
        Ok(serde_json::to_vec(&record)?)
    }

    #[allow(deprecated)]
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        let record: SealedRecord =
            serde_json::from_slice(sealed).context("Malformed encrypted record")?;
        if record.version != CURRENT_VERSION {
            bail!("Unsupported encrypted record version {}", record.version);
        }
        let nonce_bytes = BASE64
            .decode(record.nonce)
            .map_err(|e| anyhow!("Failed to decode nonce: {e}"))?;
        if nonce_bytes.len() != 12 {
            bail!("Encrypted record has a bad nonce");
        }
        let ciphertext = BASE64
            .decode(record.ciphertext)
            .map_err(|e| anyhow!("Failed to decode ciphertext: {e}"))?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| anyhow!("Failed to decrypt period record, check the secret key"))
    }
}

/// Whether a stored value is an encrypted envelope rather than plain JSON.
pub fn is_sealed(raw: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(raw)
        .map(|v| v.get("ciphertext").is_some())
        .unwrap_or(false)
}
