//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers everything that touches the filesystem:
//! identify, decode, encode and the animated-GIF check. Pixel work on decoded
//! buffers lives in [`operations`](super::operations).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::geometry::{Dimensions, GeometryError};
use super::params::{EncodeParams, SourceFormat};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("Image {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("Image needs {required} bytes, larger than memory limit {limit}")]
    ResourceExceeded { required: u64, limit: u64 },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Result of an identify operation: header data only, no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub dimensions: Dimensions,
    pub format: SourceFormat,
    pub channels: u8,
    pub bits_per_channel: u16,
}

/// A fully decoded image, normalized to 8-bit RGBA.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub pixels: RgbaImage,
    pub format: SourceFormat,
}

/// Trait for codec backends.
///
/// The rest of the crate only talks to codecs through this trait, so tests
/// can swap in a recording mock.
pub trait ImageBackend: Sync {
    /// Read format, dimensions and pixel layout from the file header.
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError>;

    /// Decode the whole image.
    fn decode(&self, path: &Path) -> Result<Decoded, BackendError>;

    /// Encode `pixels` to `path`.
    fn encode(
        &self,
        pixels: &RgbaImage,
        path: &Path,
        params: &EncodeParams,
    ) -> Result<(), BackendError>;

    /// True when `path` is a GIF with more than one frame.
    fn is_animated(&self, path: &Path) -> Result<bool, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{OutputFormat, PngCompression, Quality};
    use image::Rgba;
    use std::sync::Mutex;

    /// Mock backend that records operations without touching the filesystem.
    ///
    /// `decode` returns a solid image sized from the queued [`ImageInfo`].
    #[derive(Default)]
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<ImageInfo>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Decode(String),
        Encode {
            output: String,
            width: u32,
            height: u32,
            format: OutputFormat,
            jpeg_quality: u32,
            png_compression: u32,
            keep_alpha: bool,
        },
        IsAnimated(String),
    }

    pub fn info(width: u32, height: u32, format: SourceFormat) -> ImageInfo {
        ImageInfo {
            dimensions: Dimensions::new(width, height),
            format,
            channels: 3,
            bits_per_channel: 8,
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_images(infos: Vec<ImageInfo>) -> Self {
            Self {
                identify_results: Mutex::new(infos),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn next_info(&self) -> Result<ImageInfo, BackendError> {
            self.identify_results
                .lock()
                .unwrap()
                .last()
                .copied()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock image".to_string()))
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));
            self.next_info()
        }

        fn decode(&self, path: &Path) -> Result<Decoded, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));
            let info = self.next_info()?;
            self.identify_results.lock().unwrap().pop();
            Ok(Decoded {
                pixels: RgbaImage::from_pixel(
                    info.dimensions.width,
                    info.dimensions.height,
                    Rgba([200, 100, 50, 255]),
                ),
                format: info.format,
            })
        }

        fn encode(
            &self,
            pixels: &RgbaImage,
            path: &Path,
            params: &EncodeParams,
        ) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                output: path.to_string_lossy().to_string(),
                width: pixels.width(),
                height: pixels.height(),
                format: params.format,
                jpeg_quality: params.jpeg_quality.value(),
                png_compression: params.png_compression.value(),
                keep_alpha: params.keep_alpha,
            });
            Ok(())
        }

        fn is_animated(&self, path: &Path) -> Result<bool, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::IsAnimated(path.to_string_lossy().to_string()));
            Ok(false)
        }
    }

    #[test]
    fn mock_identify_does_not_consume() {
        let backend = MockBackend::with_images(vec![info(800, 600, SourceFormat::Jpeg)]);

        let first = backend.identify(Path::new("/test/image.jpg")).unwrap();
        let second = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.dimensions, Dimensions::new(800, 600));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_decode_consumes_queue() {
        let backend = MockBackend::with_images(vec![info(40, 30, SourceFormat::Png)]);

        let decoded = backend.decode(Path::new("/a.png")).unwrap();
        assert_eq!(decoded.pixels.dimensions(), (40, 30));
        assert_eq!(decoded.format, SourceFormat::Png);
        assert!(backend.decode(Path::new("/a.png")).is_err());
    }

    #[test]
    fn mock_records_encode() {
        let backend = MockBackend::new();

        backend
            .encode(
                &RgbaImage::new(8, 6),
                Path::new("/out.png"),
                &EncodeParams {
                    format: OutputFormat::Png,
                    jpeg_quality: Quality::default(),
                    png_compression: PngCompression::new(6),
                    keep_alpha: true,
                },
            )
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Encode {
                width: 8,
                height: 6,
                format: OutputFormat::Png,
                png_compression: 6,
                keep_alpha: true,
                ..
            }
        ));
    }

    #[test]
    fn error_messages() {
        let err = BackendError::NotFound(PathBuf::from("/missing.jpg"));
        assert_eq!(err.to_string(), "Image /missing.jpg does not exist");
        let err = BackendError::ResourceExceeded {
            required: 300,
            limit: 200,
        };
        assert_eq!(
            err.to_string(),
            "Image needs 300 bytes, larger than memory limit 200"
        );
        let err: BackendError = GeometryError::InvalidArgument("bad".into()).into();
        assert_eq!(err.to_string(), "invalid argument: bad");
    }
}
