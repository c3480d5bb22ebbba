//! # Raster Fit
//!
//! Chainable raster image operations: open a file, resize it to fit a box,
//! crop, rotate, flip, fade, stamp a watermark, save.
//!
//! ```no_run
//! use raster_fit::imaging::{Anchor, Raster};
//!
//! # fn main() -> Result<(), raster_fit::imaging::BackendError> {
//! let logo = Raster::open("logo.png")?;
//! Raster::open("photo.jpg")?
//!     .resize(300, 200, false, true)?
//!     .merge(&logo, Anchor::End, Anchor::End)
//!     .save("thumb.jpg")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Resize geometry, pixel operations, codecs and the [`Raster`](imaging::Raster) handle |
//! | [`config`] | `imaging.toml` loading, validation and merging |
//!
//! # Resize Geometry
//!
//! A resize takes a source size, a target size and two flags, and produces a
//! [`ResizePlan`](imaging::ResizePlan): which rectangle of the source is
//! sampled, where it lands, and how big the canvas is. The plan is computed by
//! a pure function, so every case can be tested without pixels:
//!
//! - **crop** fills the target completely and cuts off what sticks out,
//!   keeping the center.
//! - **letterbox** (no crop) fits the whole source inside the target and
//!   pads the margins with the fill color, or leaves them transparent while
//!   alpha blending is on.
//! - **stretch** (not proportional) maps the whole source onto the whole
//!   target.
//!
//! A zero target dimension keeps the source dimension. Aspect ratios are
//! compared at two decimal places, so near-equal shapes are treated as equal
//! and simply scaled.
//!
//! # Backends
//!
//! Codecs sit behind the [`ImageBackend`](imaging::ImageBackend) trait. The
//! shipped [`RustBackend`](imaging::RustBackend) uses the `image` crate; tests
//! use a recording mock so operation sequences can be asserted without
//! touching the filesystem.

pub mod config;
pub mod imaging;
