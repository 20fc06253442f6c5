//! Signing and QR code generation examples
//!
//! Generates a throwaway RSA keypair so the demo can also play the
//! authority's role and decrypt what it signed. In production the
//! public key and certificate come from the authority's configuration.

use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};

use einvoice_core::{QrEncoder, QrOptions, Signer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔐 E-Invoice Core - Signing and QR Examples\n");

    // 1. Key material (demo keypair; normally supplied by the authority)
    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), 2048)?;
    let public_pem = private_key.to_public_key().to_public_key_pem(LineEnding::LF)?;
    let certificate = general_purpose::STANDARD.encode("demo-certificate");

    let signer = Signer::configured(&public_pem, &certificate)?;
    println!("🔑 Signer configured: {}", signer.is_configured());
    println!();

    // 2. Sign an IRN
    let irn = "INV-2024-001-94ND90NR-20240611";
    let result = signer.sign_irn(irn, None)?;
    println!("✍️  Signed {}", result.irn_with_timestamp);
    println!("  Ciphertext (base64): {}...", &result.encrypted_data[..40]);
    println!();

    // 3. The authority's view: decrypt and re-parse the payload
    let ciphertext = general_purpose::STANDARD.decode(&result.encrypted_data)?;
    let payload = private_key.decrypt(Pkcs1v15Encrypt, &ciphertext)?;
    println!("📬 Decrypted payload: {}", String::from_utf8(payload)?);
    println!();

    // 4. Render the ciphertext as a QR code
    let encoder = QrEncoder::new();
    let qr_base64 = encoder.render_to_base64(result.qr_data())?;
    println!("🖼️  QR PNG (base64, {} chars)", qr_base64.len());

    let output = std::env::temp_dir().join("einvoice_demo/qr.png");
    encoder.render_to_file(result.qr_data(), &output)?;
    println!("  written to {:?}", output);
    println!();

    // 5. Options are configurable; defaults are box size 10, border 4,
    // black on white
    let options = QrOptions::default();
    println!(
        "⚙️  Defaults: box size {}, border {}, error correction {:?}",
        options.box_size, options.border, options.error_correction
    );

    Ok(())
}
