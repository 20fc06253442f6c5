//! QR code rendering for signed invoice data
//!
//! The encoder treats its input as an opaque string (typically the
//! base64 ciphertext from the signing pipeline) and renders it to PNG
//! bytes, base64 PNG, or a file. Rendering is deterministic for a given
//! input and option set.

use base64::{engine::general_purpose, Engine as _};
use image::Luma;
use qrcode::{EcLevel, QrCode, Version};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

use crate::types::{EinvoiceError, EinvoiceResult};

/// QR error correction levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl ErrorCorrection {
    fn to_ec_level(self) -> EcLevel {
        match self {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// QR rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrOptions {
    /// Fixed QR version (symbol size); auto-detected when absent
    pub version: Option<i16>,
    /// Error correction level
    pub error_correction: ErrorCorrection,
    /// Pixels per module
    pub box_size: u32,
    /// Quiet zone width in modules; 0 disables it. Non-zero values use
    /// the standard 4-module quiet zone.
    pub border: u32,
    /// Module color (RGB)
    pub fill: [u8; 3],
    /// Background color (RGB)
    pub background: [u8; 3],
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            version: None,
            error_correction: ErrorCorrection::M,
            box_size: 10,
            border: 4,
            fill: [0, 0, 0],
            background: [255, 255, 255],
        }
    }
}

/// Diagnostic information about QR input data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrInfo {
    pub data_length: usize,
    pub is_base64: bool,
    pub data_preview: String,
}

/// QR code encoder producing PNG output
#[derive(Debug, Clone)]
pub struct QrEncoder {
    options: QrOptions,
}

impl QrEncoder {
    /// Create an encoder with default options
    pub fn new() -> Self {
        Self {
            options: QrOptions::default(),
        }
    }

    /// Create an encoder with the given options
    pub fn with_options(options: QrOptions) -> Self {
        Self { options }
    }

    /// The options this encoder renders with
    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    /// Render data as a QR code and return PNG bytes
    pub fn render(&self, data: &str) -> EinvoiceResult<Vec<u8>> {
        let ec_level = self.options.error_correction.to_ec_level();
        let code = match self.options.version {
            Some(version) => QrCode::with_version(data, Version::Normal(version), ec_level),
            None => QrCode::with_error_correction_level(data, ec_level),
        }
        .map_err(|e| EinvoiceError::Validation(format!("QR encoding failed: {}", e)))?;

        let module_size = self.options.box_size.max(1);
        let matrix = code
            .render::<Luma<u8>>()
            .module_dimensions(module_size, module_size)
            .quiet_zone(self.options.border > 0)
            .build();

        let (width, height) = matrix.dimensions();
        let mut rgb = image::RgbImage::new(width, height);
        for (x, y, pixel) in matrix.enumerate_pixels() {
            let color = if pixel.0[0] == 0 {
                self.options.fill
            } else {
                self.options.background
            };
            rgb.put_pixel(x, y, image::Rgb(color));
        }

        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(rgb)
            .write_to(&mut buffer, image::ImageOutputFormat::Png)
            .map_err(|e| EinvoiceError::Io(format!("PNG encoding failed: {}", e)))?;

        Ok(buffer.into_inner())
    }

    /// Render data as a QR code and return the PNG as base64
    pub fn render_to_base64(&self, data: &str) -> EinvoiceResult<String> {
        let png = self.render(data)?;
        Ok(general_purpose::STANDARD.encode(png))
    }

    /// Render data as a QR code and write the PNG to a file, creating
    /// parent directories as needed
    pub fn render_to_file(&self, data: &str, path: &Path) -> EinvoiceResult<()> {
        let png = self.render(data)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EinvoiceError::Io(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        std::fs::write(path, png)
            .map_err(|e| EinvoiceError::Io(format!("Failed to write {:?}: {}", path, e)))
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether QR input data is valid base64
pub fn is_base64(data: &str) -> bool {
    general_purpose::STANDARD.decode(data).is_ok()
}

/// Diagnostic summary of QR input data
pub fn qr_info(data: &str) -> QrInfo {
    let data_preview = if data.len() > 50 {
        format!("{}...", &data[..50])
    } else {
        data.to_string()
    };

    QrInfo {
        data_length: data.len(),
        is_base64: is_base64(data),
        data_preview,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_render_produces_png() {
        let png = QrEncoder::new().render("INV001-94ND90NR-20240611").unwrap();
        assert_eq!(&png[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_render_is_deterministic() {
        let encoder = QrEncoder::new();
        let first = encoder.render("some opaque data").unwrap();
        let second = encoder.render("some opaque data").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_to_base64_round_trips() {
        let encoded = QrEncoder::new().render_to_base64("payload").unwrap();
        let decoded = general_purpose::STANDARD.decode(&encoded).unwrap();
        assert_eq!(&decoded[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_border_widens_the_image() {
        let with_border = QrEncoder::new().render("payload").unwrap();

        let mut options = QrOptions::default();
        options.border = 0;
        let without_border = QrEncoder::with_options(options).render("payload").unwrap();

        let bordered = image::load_from_memory(&with_border).unwrap();
        let bare = image::load_from_memory(&without_border).unwrap();
        use image::GenericImageView;
        assert!(bordered.dimensions().0 > bare.dimensions().0);
    }

    #[test]
    fn test_box_size_scales_the_image() {
        let mut options = QrOptions::default();
        options.box_size = 2;
        let small = QrEncoder::with_options(options.clone()).render("payload").unwrap();
        options.box_size = 4;
        let large = QrEncoder::with_options(options).render("payload").unwrap();

        use image::GenericImageView;
        let small_width = image::load_from_memory(&small).unwrap().dimensions().0;
        let large_width = image::load_from_memory(&large).unwrap().dimensions().0;
        assert_eq!(large_width, small_width * 2);
    }

    #[test]
    fn test_custom_colors_change_the_output() {
        let default_png = QrEncoder::new().render("payload").unwrap();

        let mut options = QrOptions::default();
        options.fill = [0, 0, 128];
        let colored_png = QrEncoder::with_options(options).render("payload").unwrap();

        assert_ne!(default_png, colored_png);
    }

    #[test]
    fn test_render_to_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/output/qr.png");

        QrEncoder::new().render_to_file("payload", &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_is_base64() {
        assert!(is_base64("aGVsbG8="));
        assert!(!is_base64("not base64!!!"));
    }

    #[test]
    fn test_qr_info_preview_truncates() {
        let info = qr_info(&"A".repeat(80));
        assert_eq!(info.data_length, 80);
        assert_eq!(info.data_preview.len(), 53);
        assert!(info.data_preview.ends_with("..."));

        let short = qr_info("abcd");
        assert_eq!(short.data_preview, "abcd");
    }
}
