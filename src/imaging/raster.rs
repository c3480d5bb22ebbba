//! The chainable image handle.
//!
//! A [`Raster`] owns a decoded RGBA buffer plus the settings that shape later
//! operations: alpha mode, fill color and encoder settings. Operations mutate
//! the handle in place and return it, so calls chain:
//!
//! ```no_run
//! # use raster_fit::imaging::{Anchor, Opacity, Raster};
//! # fn main() -> Result<(), raster_fit::imaging::BackendError> {
//! let mut logo = Raster::open("logo.png")?;
//! logo.opacity(Opacity::new(30)).save("newlogo.png")?;
//!
//! Raster::open("test.jpg")?
//!     .resize(300, 200, true, true)?
//!     .merge(&logo, Anchor::End, Anchor::End)
//!     .save("new.jpg")?;
//! # Ok(())
//! # }
//! ```
//!
//! Geometry is decided by the pure functions in
//! [`geometry`](super::geometry) and [`calculations`](super::calculations);
//! pixels are moved by [`operations`](super::operations); files go through an
//! [`ImageBackend`].

use super::backend::{BackendError, ImageBackend};
use super::calculations::{
    crop_rect, decoded_size, output_format_for, overlay_origin, quarter_turns, rotation_canvas,
};
use super::geometry::{Dimensions, plan};
use super::operations;
use super::params::{
    AlphaMode, Anchor, EncodeParams, FillColor, Opacity, OutputFormat, PngCompression, Quality,
    SourceFormat,
};
use super::rust_backend::RustBackend;
use crate::config::ImagingConfig;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Largest RGBA8 buffer the platform can address.
const MAX_BUFFER: u64 = usize::MAX as u64;

/// Fail with [`BackendError::ResourceExceeded`] unless `required` fits `limit`.
///
/// `None` means the size overflowed and never fits.
fn check_budget(required: Option<u64>, limit: u64) -> Result<()> {
    match required {
        Some(required) if required <= limit => Ok(()),
        required => Err(BackendError::ResourceExceeded {
            required: required.unwrap_or(u64::MAX),
            limit,
        }),
    }
}

/// A decoded image and the settings applied to it.
#[derive(Debug, Clone)]
pub struct Raster {
    pixels: RgbaImage,
    format: Option<SourceFormat>,
    source: Option<PathBuf>,
    alpha: AlphaMode,
    fill_color: FillColor,
    jpeg_quality: Quality,
    png_compression: PngCompression,
    memory_limit: Option<u64>,
}

impl Raster {
    /// Open a file with the default backend and default config.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(&RustBackend::new(), path.as_ref(), &ImagingConfig::default())
    }

    /// Open a file through `backend`, applying `config`.
    ///
    /// Fails with [`BackendError::NotFound`] for a missing file and
    /// [`BackendError::ResourceExceeded`] when the decoded image would exceed
    /// the configured memory limit. The limit is checked against the header
    /// before any pixels are decoded.
    pub fn open_with(
        backend: &impl ImageBackend,
        path: &Path,
        config: &ImagingConfig,
    ) -> Result<Self> {
        Ok(Self::load(backend, path, config.memory_limit())?.with_config(config))
    }

    fn load(backend: &impl ImageBackend, path: &Path, memory_limit: Option<u64>) -> Result<Self> {
        let info = backend.identify(path)?;
        if let Some(limit) = memory_limit {
            check_budget(
                decoded_size(info.dimensions, info.channels, info.bits_per_channel),
                limit,
            )?;
        }

        let decoded = backend.decode(path)?;
        let mut raster = Self::from_pixels(decoded.pixels);
        raster.format = Some(decoded.format);
        raster.source = Some(path.to_path_buf());
        raster.memory_limit = memory_limit;
        Ok(raster)
    }

    /// Wrap an in-memory buffer. No source file, no format.
    ///
    /// New canvases are held to the default memory limit until
    /// [`with_config`](Self::with_config) or
    /// [`set_memory_limit`](Self::set_memory_limit) says otherwise.
    pub fn from_pixels(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            format: None,
            source: None,
            alpha: AlphaMode::default(),
            fill_color: FillColor::default(),
            jpeg_quality: Quality::default(),
            png_compression: PngCompression::default(),
            memory_limit: ImagingConfig::default().memory_limit(),
        }
    }

    /// Take fill color, encoder settings and memory limit from `config`.
    pub fn with_config(mut self, config: &ImagingConfig) -> Self {
        self.fill_color = config.fill_color();
        self.jpeg_quality = config.jpeg_quality();
        self.png_compression = config.png_compression();
        self.memory_limit = config.memory_limit();
        self
    }

    /// Budget for new canvases and opened overlays; `None` disables it.
    pub fn set_memory_limit(&mut self, limit: Option<u64>) -> &mut Self {
        self.memory_limit = limit;
        self
    }

    pub fn memory_limit(&self) -> Option<u64> {
        self.memory_limit
    }

    /// Check that an RGBA8 canvas of `dims` fits the memory limit and the
    /// address space before it is allocated.
    fn ensure_canvas(&self, dims: Dimensions) -> Result<()> {
        let limit = self.memory_limit.map_or(MAX_BUFFER, |limit| limit.min(MAX_BUFFER));
        check_budget(decoded_size(dims, 4, 8), limit)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Format the image was decoded from, if it came from a file.
    pub fn image_type(&self) -> Option<SourceFormat> {
        self.format
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha
    }

    pub fn fill(&self) -> FillColor {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color: FillColor) -> &mut Self {
        self.fill_color = color;
        self
    }

    pub fn set_jpeg_quality(&mut self, quality: Quality) -> &mut Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn set_png_compression(&mut self, level: PngCompression) -> &mut Self {
        self.png_compression = level;
        self
    }

    /// Set alpha blending and alpha saving.
    pub fn alpha(&mut self, blending: bool, save_alpha: bool) -> &mut Self {
        self.alpha = AlphaMode::new(blending, save_alpha);
        self
    }

    /// Cut out the rectangle between two corners, given in any order.
    ///
    /// Fails with [`BackendError::ResourceExceeded`] when the new canvas
    /// would not fit the memory limit.
    pub fn crop(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) -> Result<&mut Self> {
        let rect = crop_rect(x1, y1, x2, y2);
        self.ensure_canvas(Dimensions::new(rect.width, rect.height))?;
        self.pixels = operations::crop_region(&self.pixels, rect);
        Ok(self)
    }

    /// Resize to `width` x `height` (0 keeps the current size on that axis).
    ///
    /// With `crop` the image fills the target and the overflow is cut off;
    /// without it the image is letterboxed and the margins painted with the
    /// fill color, or left transparent while alpha blending is on.
    /// `proportional = false` stretches to the target instead.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        crop: bool,
        proportional: bool,
    ) -> Result<&mut Self> {
        let plan = plan(
            (self.width(), self.height()),
            (width, height),
            crop,
            proportional,
        )?;
        debug!(
            case = ?plan.case,
            source = ?plan.source,
            dest = ?plan.dest,
            canvas = ?plan.canvas,
            "resize plan"
        );
        if plan.is_identity() {
            return Ok(self);
        }
        self.ensure_canvas(plan.canvas)?;

        let fill = plan.canvas_fill(self.alpha.blending, self.fill_color);
        self.pixels = operations::render_plan(&self.pixels, &plan, fill, self.alpha.blending);
        Ok(self)
    }

    /// Rotate counter-clockwise by `degrees`.
    ///
    /// Uncovered corners take `background`, transparent when `None`. Alpha
    /// blending is switched off and alpha saving on.
    pub fn rotate(&mut self, degrees: f64, background: Option<Rgba<u8>>) -> Result<&mut Self> {
        if quarter_turns(degrees).is_none() {
            self.ensure_canvas(rotation_canvas(self.dimensions(), degrees))?;
        }
        self.alpha(false, true);
        let background = background.unwrap_or(Rgba([0, 0, 0, 0]));
        self.pixels = operations::rotate(&self.pixels, degrees, background);
        Ok(self)
    }

    pub fn flip_horizontal(&mut self) -> &mut Self {
        image::imageops::flip_horizontal_in_place(&mut self.pixels);
        self
    }

    pub fn flip_vertical(&mut self) -> &mut Self {
        image::imageops::flip_vertical_in_place(&mut self.pixels);
        self
    }

    /// Draw `overlay` on top of this image, e.g. a watermark.
    ///
    /// Turns alpha blending on and alpha saving off.
    pub fn merge(&mut self, overlay: &Raster, x: Anchor, y: Anchor) -> &mut Self {
        let (left, top) = overlay_origin(self.dimensions(), overlay.dimensions(), x, y);
        self.alpha(true, false);
        operations::composite(&mut self.pixels, &overlay.pixels, left, top, true);
        self
    }

    /// Open `path` with the default backend and [`merge`](Self::merge) it.
    pub fn merge_file(
        &mut self,
        path: impl AsRef<Path>,
        x: Anchor,
        y: Anchor,
    ) -> Result<&mut Self> {
        self.merge_file_with(&RustBackend::new(), path.as_ref(), x, y)
    }

    /// Open `path` through `backend` and [`merge`](Self::merge) it.
    ///
    /// The overlay is held to this image's memory limit.
    pub fn merge_file_with(
        &mut self,
        backend: &impl ImageBackend,
        path: &Path,
        x: Anchor,
        y: Anchor,
    ) -> Result<&mut Self> {
        let overlay = Self::load(backend, path, self.memory_limit)?;
        Ok(self.merge(&overlay, x, y))
    }

    /// Fade the image toward full transparency; 100 keeps opaque pixels opaque.
    pub fn opacity(&mut self, opacity: Opacity) -> &mut Self {
        self.alpha(false, true);
        operations::apply_opacity(&mut self.pixels, opacity);
        self
    }

    /// Save with the default backend, format taken from the file name.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<&Self> {
        self.save_with(&RustBackend::new(), path.as_ref(), None)
    }

    /// Save with the default backend in an explicit format.
    pub fn save_as(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<&Self> {
        self.save_with(&RustBackend::new(), path.as_ref(), Some(format))
    }

    /// Save through `backend`. `None` infers the format from `path`.
    pub fn save_with(
        &self,
        backend: &impl ImageBackend,
        path: &Path,
        format: Option<OutputFormat>,
    ) -> Result<&Self> {
        let params = self.encode_params(format.unwrap_or_else(|| output_format_for(path)));
        backend.encode(&self.pixels, path, &params)?;
        Ok(self)
    }

    fn encode_params(&self, format: OutputFormat) -> EncodeParams {
        EncodeParams {
            format,
            jpeg_quality: self.jpeg_quality,
            png_compression: self.png_compression,
            keep_alpha: self.alpha.save_alpha,
        }
    }

    /// True when the image was opened from a GIF with several frames.
    pub fn is_animated(&self) -> Result<bool> {
        self.is_animated_with(&RustBackend::new())
    }

    pub fn is_animated_with(&self, backend: &impl ImageBackend) -> Result<bool> {
        match (&self.source, self.format) {
            (Some(path), Some(SourceFormat::Gif)) => backend.is_animated(path),
            _ => Ok(false),
        }
    }
}
