//! Digital signing pipeline for Invoice Reference Numbers
//!
//! Builds the canonical `{"irn", "certificate"}` payload, encrypts it
//! with the authority's RSA public key using PKCS#1 v1.5 padding, and
//! base64-encodes the ciphertext. Key order, the integer-seconds
//! timestamp inside the payload, and the padding scheme are externally
//! fixed contracts: the authority decrypts and re-parses this exact
//! JSON.

use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::types::{EinvoiceError, EinvoiceResult};

/// Payload encrypted for the authority; field order is the wire contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningPayload {
    pub irn: String,
    pub certificate: String,
}

/// Raw encryption output with millisecond metadata timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptionResult {
    /// Base64-encoded ciphertext
    pub encrypted_base64: String,
    /// When the encryption ran (milliseconds; metadata only, never part
    /// of the payload)
    pub timestamp_millis: i64,
}

/// Result of signing an IRN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningResult {
    /// Base64-encoded ciphertext, ready for QR encoding
    pub encrypted_data: String,
    /// Raw encryption metadata
    pub encryption_result: EncryptionResult,
    /// Unix timestamp (seconds) embedded in the payload
    pub timestamp: i64,
    /// The `{irn}.{timestamp}` string that was signed
    pub irn_with_timestamp: String,
}

impl SigningResult {
    /// The string to encode into a QR code
    pub fn qr_data(&self) -> &str {
        &self.encrypted_data
    }
}

/// Step-by-step trace of a signing run, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningFlow {
    pub base_irn: String,
    pub timestamp: i64,
    pub irn_with_timestamp: String,
    pub payload: SigningPayload,
    pub payload_json: String,
    pub encrypted_data: String,
}

/// IRN signing pipeline holding the authority's key material
///
/// The parsed public key is cached after the first successful load; the
/// cache is swapped out whole on reconfiguration, never mutated while a
/// signing operation is in flight.
#[derive(Debug)]
pub struct Signer {
    public_key_pem: Option<String>,
    certificate: Option<String>,
    cached_key: RwLock<Option<Arc<RsaPublicKey>>>,
}

impl Signer {
    /// Create an unconfigured signer; all operations fail until key
    /// material is supplied
    pub fn new() -> Self {
        Self {
            public_key_pem: None,
            certificate: None,
            cached_key: RwLock::new(None),
        }
    }

    /// Create a signer from key material: the public key as a raw PEM
    /// string or a base64-encoded PEM blob, plus the certificate
    pub fn configured(public_key_input: &str, certificate: &str) -> EinvoiceResult<Self> {
        let mut signer = Self::new();
        signer.configure(public_key_input, certificate)?;
        Ok(signer)
    }

    /// Supply or replace key material, invalidating the cached key
    pub fn configure(&mut self, public_key_input: &str, certificate: &str) -> EinvoiceResult<()> {
        let pem = decode_public_key(public_key_input)?;
        self.public_key_pem = Some(pem);
        self.certificate = Some(certificate.to_string());
        *self.cached_key.write().unwrap() = None;
        Ok(())
    }

    /// Whether both public key and certificate are present
    pub fn is_configured(&self) -> bool {
        self.public_key_pem.is_some() && self.certificate.is_some()
    }

    /// The configured public key in PEM form
    pub fn public_key_pem(&self) -> Option<&str> {
        self.public_key_pem.as_deref()
    }

    /// The configured certificate
    pub fn certificate(&self) -> Option<&str> {
        self.certificate.as_deref()
    }

    /// Sign an IRN: build `{irn}.{timestamp}`, encrypt the canonical
    /// payload, and return the base64 ciphertext with timestamps.
    ///
    /// `timestamp` is Unix seconds; when absent the current time is
    /// used. A failure is terminal for this invocation; retry policy
    /// belongs to the caller.
    pub fn sign_irn(&self, irn: &str, timestamp: Option<i64>) -> EinvoiceResult<SigningResult> {
        let certificate = self.require_certificate()?;

        let ts = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
        let irn_with_timestamp = format!("{}.{}", irn, ts);

        let payload = SigningPayload {
            irn: irn_with_timestamp.clone(),
            certificate: certificate.to_string(),
        };
        let encryption_result = self.encrypt_payload(&payload)?;

        Ok(SigningResult {
            encrypted_data: encryption_result.encrypted_base64.clone(),
            encryption_result,
            timestamp: ts,
            irn_with_timestamp,
        })
    }

    /// Run a signing pass and return every intermediate step
    pub fn signing_flow(&self, irn: &str) -> EinvoiceResult<SigningFlow> {
        let certificate = self.require_certificate()?;

        let timestamp = chrono::Utc::now().timestamp();
        let irn_with_timestamp = format!("{}.{}", irn, timestamp);

        let payload = SigningPayload {
            irn: irn_with_timestamp.clone(),
            certificate: certificate.to_string(),
        };
        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| EinvoiceError::Crypto(format!("Payload serialization failed: {}", e)))?;
        let encryption_result = self.encrypt_payload(&payload)?;

        Ok(SigningFlow {
            base_irn: irn.to_string(),
            timestamp,
            irn_with_timestamp,
            payload,
            payload_json,
            encrypted_data: encryption_result.encrypted_base64,
        })
    }

    fn require_certificate(&self) -> EinvoiceResult<&str> {
        if !self.is_configured() {
            return Err(EinvoiceError::Configuration(
                "Public key and certificate must be configured before signing".to_string(),
            ));
        }
        // is_configured checked both fields
        Ok(self.certificate.as_deref().unwrap_or_default())
    }

    fn encrypt_payload(&self, payload: &SigningPayload) -> EinvoiceResult<EncryptionResult> {
        let key = self.load_public_key()?;

        let payload_bytes = serde_json::to_vec(payload)
            .map_err(|e| EinvoiceError::Crypto(format!("Payload serialization failed: {}", e)))?;

        let ciphertext = key
            .encrypt(&mut rand::thread_rng(), Pkcs1v15Encrypt, &payload_bytes)
            .map_err(|e| EinvoiceError::Crypto(format!("RSA encryption failed: {}", e)))?;

        Ok(EncryptionResult {
            encrypted_base64: general_purpose::STANDARD.encode(ciphertext),
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
        })
    }

    fn load_public_key(&self) -> EinvoiceResult<Arc<RsaPublicKey>> {
        let pem = self.public_key_pem.as_deref().ok_or_else(|| {
            EinvoiceError::Configuration(
                "Public key must be configured before encryption".to_string(),
            )
        })?;

        if let Some(key) = self.cached_key.read().unwrap().as_ref() {
            return Ok(Arc::clone(key));
        }

        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| EinvoiceError::Crypto(format!("Public key import failed: {}", e)))?;

        let key = Arc::new(key);
        *self.cached_key.write().unwrap() = Some(Arc::clone(&key));
        Ok(key)
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a public key supplied either as a raw PEM string or as a
/// base64-encoded PEM blob
pub fn decode_public_key(input: &str) -> EinvoiceResult<String> {
    if input.contains("-----BEGIN") {
        return Ok(input.to_string());
    }

    let decoded = general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| EinvoiceError::Validation(format!("Failed to decode public key: {}", e)))?;

    String::from_utf8(decoded)
        .map_err(|e| EinvoiceError::Validation(format!("Public key is not valid UTF-8: {}", e)))
}
