use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

use crate::error::{Error, Result};

const QR_MIN_SIZE: u32 = 300;

#[derive(Clone)]
pub struct QrService {
    default_channel: String,
}

impl QrService {
    pub fn new(default_channel: String) -> Self {
        Self { default_channel }
    }

    /// Explicit text wins; otherwise a `t.me` link to the given or default channel.
    pub fn resolve_target(&self, text: Option<&str>, channel_username: Option<&str>) -> String {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            return text.to_string();
        }
        let channel = channel_username
            .map(|c| c.trim().trim_start_matches('@'))
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_channel);
        format!("https://t.me/{}", channel)
    }

    /// Renders `text` as a PNG data URL.
    pub fn generate_data_url(&self, text: &str) -> Result<String> {
        let code = QrCode::new(text.as_bytes()).map_err(|e| Error::Qr(e.to_string()))?;
        let img = code
            .render::<Luma<u8>>()
            .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
            .quiet_zone(true)
            .build();

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| Error::Qr(e.to_string()))?;

        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}
