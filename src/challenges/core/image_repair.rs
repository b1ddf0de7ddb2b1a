//! Finder pattern reconstruction for defaced QR images.
//!
//! The challenge server always renders its barcode at the same scale and
//! position, then scribbles over the three position markers. Decoders locate a
//! symbol by the dark/light/dark ring signature of those markers, so redrawing
//! them in canonical form is enough to make the image scannable again.
//!
//! Scale and anchor positions are fixed by [`FinderLayout`]; nothing is
//! auto-detected. A server-side change of rendering size yields an image that
//! will not decode.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Dark ring colour.
pub const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Light ring colour.
pub const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Pixel geometry of the three finder patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderLayout {
    /// Side of one module in pixels.
    pub module: u32,
    /// `(x, y)` origins of the top-left, bottom-left and top-right markers.
    pub anchors: [(u32, u32); 3],
}

impl FinderLayout {
    /// Side of a whole finder pattern in pixels (7 modules).
    pub fn pattern_side(&self) -> u32 {
        self.module.saturating_mul(7)
    }

    /// Whether every marker's far corner is representable in `u32` pixels.
    pub fn fits_pixel_range(&self) -> bool {
        self.module.checked_mul(7).is_some_and(|side| {
            self.anchors
                .iter()
                .all(|&(x, y)| x.checked_add(side).is_some() && y.checked_add(side).is_some())
        })
    }
}

impl Default for FinderLayout {
    fn default() -> Self {
        Self {
            module: 9,
            anchors: [(18, 18), (18, 216), (216, 18)],
        }
    }
}

/// Return a copy of `image` with all three finder patterns redrawn.
pub fn repair_finder_patterns(image: &RgbaImage, layout: &FinderLayout) -> RgbaImage {
    let mut repaired = image.clone();
    repair_in_place(&mut repaired, layout);
    repaired
}

/// Redraw the finder patterns directly on `image`.
///
/// Layers are painted outer ring, light ring, core, each one overwriting only
/// its own square.
pub fn repair_in_place(image: &mut RgbaImage, layout: &FinderLayout) {
    let m = layout.module;
    for &(x, y) in &layout.anchors {
        let (x1, y1) = (x.saturating_add(m), y.saturating_add(m));
        let (x2, y2) = (x1.saturating_add(m), y1.saturating_add(m));
        fill_square(image, x, y, m.saturating_mul(7), DARK);
        fill_square(image, x1, y1, m.saturating_mul(5), LIGHT);
        fill_square(image, x2, y2, m.saturating_mul(3), DARK);
    }
}

/// Fill `[x, x + side) × [y, y + side)`, clipped to the image bounds.
fn fill_square(image: &mut RgbaImage, x: u32, y: u32, side: u32, color: Rgba<u8>) {
    let x_end = x.saturating_add(side).min(image.width());
    let y_end = y.saturating_add(side).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, color);
        }
    }
}
