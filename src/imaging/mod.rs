//! Image processing built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::with_guessed_format` + `ImageDecoder` |
//! | **Resize / crop / letterbox** | [`geometry::plan`] + Lanczos3 |
//! | **Rotate** | `imageops::rotate*`, `imageproc` for free angles |
//! | **Merge / opacity** | `imageops::overlay` + 7-bit alpha scaling |
//! | **Save** | JPEG / PNG / GIF encoders |
//!
//! The module is split into:
//! - **Geometry**: The resize resolver (which rectangle goes where)
//! - **Calculations**: Pure functions for crop, merge, rotate and opacity math
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Pixel work on decoded buffers
//! - **Raster**: The chainable [`Raster`] handle tying it all together

pub mod backend;
pub mod calculations;
pub mod geometry;
pub mod operations;
pub mod params;
pub mod raster;
pub mod rust_backend;

pub use backend::{BackendError, Decoded, ImageBackend, ImageInfo};
pub use geometry::{CanvasFill, Dimensions, GeometryError, Rect, ResizeCase, ResizePlan, plan};
pub use params::{
    AlphaMode, Anchor, EncodeParams, FillColor, Opacity, OutputFormat, PngCompression, Quality,
    SourceFormat,
};
pub use raster::Raster;
pub use rust_backend::RustBackend;
