//! QR code rendering.
//!
//! Symbol encoding is delegated to the `qrcode` crate; this module only fixes
//! the geometry (module size and quiet-zone border) and produces PNG bytes.

use std::io::Cursor;

use image::{imageops, DynamicImage, ImageBuffer, ImageFormat, Luma};
use qrcode::QrCode;
use tracing::debug;

use crate::config::QrConfig;
use crate::error::Result;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Renders text payloads as black-on-white PNG QR codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrRenderer {
    module_size: u32,
    border: u32,
}

impl QrRenderer {
    /// Create a renderer with the given pixel size per module and border width
    /// in modules.
    #[must_use]
    pub fn new(module_size: u32, border: u32) -> Self {
        Self {
            module_size,
            border,
        }
    }

    /// Render `payload` to PNG bytes at the default error-correction level.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not fit in a QR symbol or if PNG
    /// encoding fails.
    pub fn render_png(&self, payload: &str) -> Result<Vec<u8>> {
        let code = QrCode::new(payload.as_bytes())?;
        let symbol = code
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .module_dimensions(self.module_size, self.module_size)
            .dark_color(DARK)
            .light_color(LIGHT)
            .build();

        let margin = self.border * self.module_size;
        let mut canvas = ImageBuffer::from_pixel(
            symbol.width() + 2 * margin,
            symbol.height() + 2 * margin,
            LIGHT,
        );
        imageops::overlay(
            &mut canvas,
            &symbol,
            i64::from(margin),
            i64::from(margin),
        );

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        debug!(
            "Rendered QR code ({} bytes payload, {} bytes png)",
            payload.len(),
            png.len()
        );
        Ok(png)
    }
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self::from(&QrConfig::default())
    }
}

impl From<&QrConfig> for QrRenderer {
    fn from(config: &QrConfig) -> Self {
        Self::new(config.module_size, config.border)
    }
}
