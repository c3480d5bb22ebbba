//! Pure calculation functions for image operations.
//!
//! All functions here are pure and testable without any I/O or images.
//! The resize resolver lives in [`geometry`](super::geometry); this module
//! holds the smaller helpers used by crop, merge, rotate, opacity and save.

use super::geometry::{Dimensions, Rect};
use super::params::{Anchor, Opacity, OutputFormat};
use std::path::Path;

/// Normalize two crop corners into a rectangle.
///
/// Corners may be given in any order; reversed coordinates are swapped.
///
/// # Examples
/// ```
/// # use raster_fit::imaging::calculations::crop_rect;
/// # use raster_fit::imaging::geometry::Rect;
/// assert_eq!(crop_rect(50, 80, 10, 20), Rect::new(10, 20, 40, 60));
/// ```
pub fn crop_rect(x1: u32, y1: u32, x2: u32, y2: u32) -> Rect {
    let (left, right) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
    let (top, bottom) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
    Rect::new(left, top, right - left, bottom - top)
}

/// Offset of an overlay along one axis of the base image.
pub fn anchor_offset(base: u32, overlay: u32, anchor: Anchor) -> i64 {
    let free = i64::from(base) - i64::from(overlay);
    match anchor {
        Anchor::Start => 0,
        Anchor::End => free,
        Anchor::Center => (free as f64 / 2.0).round() as i64,
        Anchor::Offset(offset) => offset,
    }
}

/// Top-left position of an overlay on a base image.
pub fn overlay_origin(base: Dimensions, overlay: Dimensions, x: Anchor, y: Anchor) -> (i64, i64) {
    (
        anchor_offset(base.width, overlay.width, x),
        anchor_offset(base.height, overlay.height, y),
    )
}

/// Number of counter-clockwise quarter turns if `degrees` is a multiple of 90.
pub fn quarter_turns(degrees: f64) -> Option<u8> {
    let normalized = degrees.rem_euclid(360.0);
    let turns = (normalized / 90.0).round();
    if (normalized - turns * 90.0).abs() < 1e-9 {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

/// Bounding box of a `dims` image rotated by `degrees`.
///
/// Quarter turns are exact; other angles are rounded up so the rotated
/// corners always fit.
pub fn rotated_bounds(dims: Dimensions, degrees: f64) -> Dimensions {
    match quarter_turns(degrees) {
        Some(0) | Some(2) => dims,
        Some(_) => Dimensions::new(dims.height, dims.width),
        None => {
            let (sin, cos) = degrees.to_radians().sin_cos();
            let (w, h) = (f64::from(dims.width), f64::from(dims.height));
            let width = w * cos.abs() + h * sin.abs();
            let height = w * sin.abs() + h * cos.abs();
            // Shave float noise so e.g. 100.0000000001 doesn't become 101
            Dimensions::new(
                (width - 1e-6).ceil().max(1.0) as u32,
                (height - 1e-6).ceil().max(1.0) as u32,
            )
        }
    }
}

/// Canvas needed while rotating by a free angle: large enough to hold both
/// the source and the rotated bounds.
pub fn rotation_canvas(dims: Dimensions, degrees: f64) -> Dimensions {
    let bounds = rotated_bounds(dims, degrees);
    Dimensions::new(bounds.width.max(dims.width), bounds.height.max(dims.height))
}

/// Bytes needed to hold a decoded image, or `None` if that overflows `u64`.
pub fn decoded_size(dims: Dimensions, channels: u8, bits_per_channel: u16) -> Option<u64> {
    u64::from(dims.width)
        .checked_mul(u64::from(dims.height))?
        .checked_mul(u64::from(channels))?
        .checked_mul(u64::from(bits_per_channel))
        .map(|bits| bits / 8)
}

/// Scale an 8-bit alpha value by `opacity`.
///
/// The computation runs on a 7-bit scale where 0 is opaque and 127 is fully
/// transparent, then maps back to 8 bits. Full opacity stays full and zero
/// opacity always yields a transparent pixel; values in between lose the low
/// bit, as they did on 7-bit alpha backends.
pub fn scale_alpha(alpha: u8, opacity: Opacity) -> u8 {
    let transparency = 127 - (alpha >> 1);
    let scaled = 127.0 + opacity.factor() * (f64::from(transparency) - 127.0);
    let transparency = scaled as u8;
    255 - ((transparency << 1) + (transparency >> 6))
}

/// Output format implied by a file name.
///
/// Everything after the last dot is the format name; a name without a dot
/// (or starting with one) has no format and falls back to JPEG.
pub fn output_format_for(path: &Path) -> OutputFormat {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let ext = match name.rfind('.') {
        Some(pos) if pos > 0 => &name[pos + 1..],
        _ => "",
    };
    OutputFormat::from_name(ext)
}
