//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `ImageReader::with_guessed_format` (magic bytes, extension as fallback) |
//! | Identify | `ImageReader::into_decoder` header only |
//! | Decode (GIF, JPEG, PNG, WebP) | `ImageReader::decode` → RGBA8 |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder::new_with_quality` |
//! | Encode → GIF | `GifEncoder::encode_frame` |
//! | Animated GIF check | byte scan for frame signatures |

use super::backend::{BackendError, Decoded, ImageBackend, ImageInfo};
use super::geometry::Dimensions;
use super::params::{EncodeParams, OutputFormat, PngCompression, SourceFormat};
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, Frame, ImageDecoder, ImageFormat, ImageReader, RgbaImage};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Extensions of the formats this backend can open.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("gif", ImageFormat::Gif),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Graphic control extension, preceded by the previous block terminator.
const GIF_CONTROL_EXT: &[u8] = &[0x00, 0x21, 0xF9, 0x04];
/// Image descriptor, preceded by the control extension's terminator.
const GIF_IMAGE_DESC: &[u8] = &[0x00, 0x2C];

/// Codec backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open `path` and detect its format from the file contents.
fn open_reader(path: &Path) -> Result<(ImageReader<BufReader<File>>, SourceFormat), BackendError> {
    if !path.exists() {
        return Err(BackendError::NotFound(path.to_path_buf()));
    }
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader
        .format()
        .and_then(SourceFormat::from_image_format)
        .ok_or_else(|| {
            BackendError::InvalidArgument(format!(
                "{}: supported formats are gif, jpg, png and webp only",
                path.display()
            ))
        })?;
    if !format.image_format().reading_enabled() {
        return Err(BackendError::ResourceUnavailable(format!(
            "no {} decoder compiled in",
            format.as_str()
        )));
    }
    Ok((reader, format))
}

fn compression_type(level: PngCompression) -> CompressionType {
    match level.value() {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Find `needle` in `haystack` at or after `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}

/// True when a GIF byte stream holds at least two frames.
///
/// A frame is a graphic control extension whose image descriptor starts
/// exactly 8 bytes later. Scanning stops at the second frame.
pub fn has_multiple_frames(bytes: &[u8]) -> bool {
    let mut position = 0;
    let mut frames = 0;
    while frames < 2 {
        let Some(control) = find(bytes, GIF_CONTROL_EXT, position) else {
            break;
        };
        position = control + 1;
        let Some(descriptor) = find(bytes, GIF_IMAGE_DESC, position) else {
            break;
        };
        if control + 8 == descriptor {
            frames += 1;
        }
        position = descriptor + 1;
    }
    frames > 1
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError> {
        let (reader, format) = open_reader(path)?;
        let decoder = reader.into_decoder().map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read header of {}: {}",
                path.display(),
                e
            ))
        })?;
        let (width, height) = decoder.dimensions();
        let color = decoder.color_type();
        let channels = color.channel_count();
        Ok(ImageInfo {
            dimensions: Dimensions::new(width, height),
            format,
            channels,
            bits_per_channel: color.bits_per_pixel() / u16::from(channels),
        })
    }

    fn decode(&self, path: &Path) -> Result<Decoded, BackendError> {
        let (reader, format) = open_reader(path)?;
        let img = reader.decode().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        debug!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            format = format.as_str(),
            "decoded image"
        );
        Ok(Decoded {
            pixels: img.into_rgba8(),
            format,
        })
    }

    fn encode(
        &self,
        pixels: &RgbaImage,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), BackendError> {
        let writer = BufWriter::new(File::create(path)?);
        let img = DynamicImage::ImageRgba8(pixels.clone());

        let result = match params.format {
            OutputFormat::Jpeg => {
                let encoder =
                    JpegEncoder::new_with_quality(writer, params.jpeg_quality.value() as u8);
                DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
            }
            OutputFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    writer,
                    compression_type(params.png_compression),
                    FilterType::Adaptive,
                );
                if params.keep_alpha {
                    img.write_with_encoder(encoder)
                } else {
                    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
                }
            }
            OutputFormat::Gif => {
                let mut encoder = GifEncoder::new(writer);
                encoder.encode_frame(Frame::new(img.into_rgba8()))
            }
        };
        result.map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "{:?} encode failed for {}: {}",
                params.format,
                path.display(),
                e
            ))
        })?;

        debug!(
            path = %path.display(),
            width = pixels.width(),
            height = pixels.height(),
            format = ?params.format,
            "encoded image"
        );
        Ok(())
    }

    fn is_animated(&self, path: &Path) -> Result<bool, BackendError> {
        let (_, format) = open_reader(path)?;
        if format != SourceFormat::Gif {
            return Ok(false);
        }
        let bytes = std::fs::read(path)?;
        Ok(has_multiple_frames(&bytes))
    }
}
