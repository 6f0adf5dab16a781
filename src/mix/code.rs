//! Compact scannable code
//!
//! A record is projected onto a small payload (id, strength, age, date),
//! serialized as compact JSON and encoded as a QR code at medium error
//! correction. The composition is not part of the payload; the report
//! carries it.

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

use super::MixRecord;
use crate::error::EncodingError;

/// Redundancy level used for every code: tolerates print/scan wear.
pub const ERROR_CORRECTION: EcLevel = EcLevel::M;
/// Smallest rendered edge in pixels, quiet zone included.
pub const MIN_DIMENSION: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactPayload {
    pub id: String,
    pub strength: String,
    pub age: u32,
    pub date: String,
}

impl CompactPayload {
    pub fn from_record(record: &MixRecord) -> Self {
        Self {
            id: record.name.clone(),
            strength: record.formatted_strength(),
            age: record.age_days(),
            date: record.timestamp_label(),
        }
    }

    /// Compact JSON with keys in declaration order.
    pub fn to_text(&self) -> Result<String, EncodingError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_text(text: &str) -> Result<Self, EncodingError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Payload, the exact text placed in the code, and the rendered raster.
#[derive(Debug, Clone)]
pub struct CompactCode {
    pub payload: CompactPayload,
    pub text: String,
    pub image: GrayImage,
}

impl CompactCode {
    pub fn to_png(&self) -> Result<Vec<u8>, EncodingError> {
        let mut buffer = Vec::new();
        DynamicImage::ImageLuma8(self.image.clone())
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| EncodingError::Image(e.to_string()))?;
        Ok(buffer)
    }

    pub fn to_data_uri(&self) -> Result<String, EncodingError> {
        let png = self.to_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(png)
        ))
    }

    pub fn save_png(&self, path: &Path) -> Result<(), EncodingError> {
        let png = self.to_png()?;
        std::fs::write(path, png)
            .map_err(|e| EncodingError::Image(format!("{}: {}", path.display(), e)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompactCodeEncoder;

impl CompactCodeEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, record: &MixRecord) -> Result<CompactCode, EncodingError> {
        self.encode_payload(CompactPayload::from_record(record))
    }

    pub fn encode_payload(&self, payload: CompactPayload) -> Result<CompactCode, EncodingError> {
        let text = payload.to_text()?;
        let code = QrCode::with_error_correction_level(text.as_bytes(), ERROR_CORRECTION).map_err(|e| match e {
            QrError::DataTooLong => {
                warn!("Compact payload too large for a code: {} bytes", text.len());
                EncodingError::PayloadTooLarge(text.len())
            }
            other => EncodingError::Code(other.to_string()),
        })?;
        debug!("Encoded {} byte payload as {:?}", text.len(), code.version());

        let image = code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
            .build();

        Ok(CompactCode { payload, text, image })
    }
}

/// Recover the exact text stored in a code image.
pub fn decode_code(image: &GrayImage) -> Result<String, EncodingError> {
    let mut prepared = rqrr::PreparedImage::prepare(image.clone());
    let grids = prepared.detect_grids();
    let grid = grids.first().ok_or(EncodingError::NoCodeFound)?;
    let (_, content) = grid
        .decode()
        .map_err(|e| EncodingError::Decode(format!("{:?}", e)))?;
    Ok(content)
}
