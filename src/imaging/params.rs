//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the chainable [`Raster`](super::raster::Raster) handle and the
//! [`backend`](super::backend), so a mock backend can stand in for the real
//! codecs in tests.
//!
//! ## Types
//!
//! - [`Quality`] — JPEG quality (1–100, default 80). Clamped on construction.
//! - [`PngCompression`] — PNG compression level (0–9, default 0).
//! - [`Opacity`] — Percentage used by the opacity pass (0–100).
//! - [`FillColor`] — RGB color behind letterbox margins.
//! - [`AlphaMode`] — Alpha blending / alpha saving flags.
//! - [`Anchor`] — Placement of a watermark along one axis.
//! - [`SourceFormat`] / [`OutputFormat`] — Decoded and encoded formats.
//! - [`EncodeParams`] — Everything the backend needs to write a file.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// PNG compression level, 0 (none) to 9 (smallest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PngCompression(pub u32);

impl PngCompression {
    pub fn new(value: u32) -> Self {
        Self(value.min(9))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Opacity percentage, 0 (fully transparent) to 100 (unchanged).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opacity(u8);

impl Opacity {
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn factor(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

/// RGB color used for canvas regions not covered by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FillColor(pub [u8; 3]);

impl FillColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Fully opaque pixel of this color.
    pub fn to_rgba(self) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, 255])
    }
}

/// Alpha channel handling for the current image.
///
/// - `blending`: draw with alpha compositing instead of replacing pixels, and
///   start new canvases transparent.
/// - `save_alpha`: keep the alpha channel when encoding formats that can
///   store it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlphaMode {
    pub blending: bool,
    pub save_alpha: bool,
}

impl AlphaMode {
    pub fn new(blending: bool, save_alpha: bool) -> Self {
        Self {
            blending,
            save_alpha,
        }
    }
}

/// Where an overlay sits along one axis of the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Left or top edge.
    Start,
    /// Centered, rounded half away from zero.
    Center,
    /// Right or bottom edge.
    End,
    /// Explicit pixel offset; may be negative.
    Offset(i64),
}

/// Format of a decoded source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Gif,
    Jpeg,
    Png,
    WebP,
}

impl SourceFormat {
    /// Short type name (`gif`, `jpg`, `png`, `webp`).
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Gif => "gif",
            SourceFormat::Jpeg => "jpg",
            SourceFormat::Png => "png",
            SourceFormat::WebP => "webp",
        }
    }

    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Gif => Some(SourceFormat::Gif),
            image::ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            image::ImageFormat::Png => Some(SourceFormat::Png),
            image::ImageFormat::WebP => Some(SourceFormat::WebP),
            _ => None,
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            SourceFormat::Gif => image::ImageFormat::Gif,
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Png => image::ImageFormat::Png,
            SourceFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Format written by `save`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Gif,
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Map a format name to an encoder.
    ///
    /// `png8` and `png24` are accepted as PNG. Unknown names fall back to JPEG.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "gif" => OutputFormat::Gif,
            "png" | "png8" | "png24" => OutputFormat::Png,
            _ => OutputFormat::Jpeg,
        }
    }
}

/// Full specification for an encode: target format and codec settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub jpeg_quality: Quality,
    pub png_compression: PngCompression,
    /// Write the alpha channel (PNG only; JPEG never has one).
    pub keep_alpha: bool,
}
