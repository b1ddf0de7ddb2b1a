//! Barcode decoding integrations.
//!
//! Solvers only depend on the [`BarcodeDecoder`] trait; the concrete decoder is
//! injected so tests can substitute a deterministic stub.

mod rqrr_decoder;

pub use rqrr_decoder::RqrrBarcodeDecoder;

use image::RgbaImage;
use thiserror::Error;

/// Capability that turns a bitmap into the text encoded by its barcode.
pub trait BarcodeDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Decode the first readable symbol in `image`.
    fn decode(&self, image: &RgbaImage) -> Result<String, DecodeError>;
}

/// Image payload or barcode decoding failures.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unable to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("no barcode found in image")]
    NotFound,
    #[error("barcode could not be read: {0}")]
    Barcode(String),
}
