//! Signing and QR code generation for invoice submission

pub mod qr;
pub mod signing;

pub use qr::{ErrorCorrection, QrEncoder, QrInfo, QrOptions};
pub use signing::{EncryptionResult, Signer, SigningFlow, SigningPayload, SigningResult};
