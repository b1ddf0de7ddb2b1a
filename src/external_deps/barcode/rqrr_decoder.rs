use image::RgbaImage;
use image::imageops::grayscale;

use super::{BarcodeDecoder, DecodeError};

/// QR decoder backed by the `rqrr` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrBarcodeDecoder;

impl RqrrBarcodeDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl BarcodeDecoder for RqrrBarcodeDecoder {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn decode(&self, image: &RgbaImage) -> Result<String, DecodeError> {
        let gray = grayscale(image);
        let (width, height) = gray.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| gray.get_pixel(x as u32, y as u32)[0],
        );

        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return Err(DecodeError::NotFound);
        }

        let mut last_error = None;
        for grid in &grids {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(content),
                Err(err) => last_error = Some(err.to_string()),
            }
        }

        Err(DecodeError::Barcode(
            last_error.unwrap_or_else(|| "unknown error".into()),
        ))
    }
}
