//! Pixel operations on decoded buffers.
//!
//! These functions take geometry computed by [`geometry`](super::geometry) and
//! [`calculations`](super::calculations) and hand the actual pixel work to
//! `image::imageops` and `imageproc`. Nothing here decides *where* pixels go.

use super::calculations::{quarter_turns, rotated_bounds, rotation_canvas, scale_alpha};
use super::geometry::{CanvasFill, Dimensions, Rect, ResizePlan};
use super::params::Opacity;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

/// Draw `src` onto a fresh canvas following `plan`.
///
/// The canvas is prepared according to `fill`, the plan's source rectangle is
/// sampled, resampled with Lanczos3 if the destination size differs, and drawn
/// at the destination rectangle.
pub fn render_plan(
    src: &RgbaImage,
    plan: &ResizePlan,
    fill: CanvasFill,
    blending: bool,
) -> RgbaImage {
    if plan.is_identity() {
        return src.clone();
    }

    let Dimensions { width, height } = plan.canvas;
    let mut canvas = match fill {
        CanvasFill::Color(color) => RgbaImage::from_pixel(width, height, color.to_rgba()),
        CanvasFill::None | CanvasFill::Transparent => RgbaImage::new(width, height),
    };
    if plan.source.is_empty() || plan.dest.is_empty() {
        return canvas;
    }

    let Rect {
        x,
        y,
        width: sample_w,
        height: sample_h,
    } = plan.source;
    let sample = imageops::crop_imm(src, x, y, sample_w, sample_h).to_image();
    let drawn = if plan.needs_resample() {
        imageops::resize(&sample, plan.dest.width, plan.dest.height, FilterType::Lanczos3)
    } else {
        sample
    };
    composite(
        &mut canvas,
        &drawn,
        i64::from(plan.dest.x),
        i64::from(plan.dest.y),
        blending,
    );
    canvas
}

/// Copy `rect` out of `src` into a new `rect`-sized canvas.
///
/// Parts of `rect` outside the source stay transparent. Callers check the
/// canvas against the memory budget first.
pub fn crop_region(src: &RgbaImage, rect: Rect) -> RgbaImage {
    let mut canvas = RgbaImage::new(rect.width, rect.height);
    imageops::replace(&mut canvas, src, -i64::from(rect.x), -i64::from(rect.y));
    canvas
}

/// Draw `top` onto `base` at `(x, y)`.
///
/// With `blending` the pixels are alpha-composited; otherwise they replace
/// what is underneath. Offsets may be negative or run past the edges.
pub fn composite(base: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64, blending: bool) {
    if blending {
        imageops::overlay(base, top, x, y);
    } else {
        imageops::replace(base, top, x, y);
    }
}

/// Rescale every pixel's alpha by `opacity`.
pub fn apply_opacity(pixels: &mut RgbaImage, opacity: Opacity) {
    for pixel in pixels.pixels_mut() {
        pixel.0[3] = scale_alpha(pixel.0[3], opacity);
    }
}

/// Rotate counter-clockwise by `degrees`.
///
/// Quarter turns are lossless. Any other angle grows the canvas to the
/// rotated bounding box, with uncovered corners set to `background`.
pub fn rotate(src: &RgbaImage, degrees: f64, background: Rgba<u8>) -> RgbaImage {
    match quarter_turns(degrees) {
        Some(0) => src.clone(),
        Some(1) => imageops::rotate270(src),
        Some(2) => imageops::rotate180(src),
        Some(_) => imageops::rotate90(src),
        None => rotate_free(src, degrees, background),
    }
}

fn rotate_free(src: &RgbaImage, degrees: f64, background: Rgba<u8>) -> RgbaImage {
    let (src_w, src_h) = src.dimensions();
    let source = Dimensions::new(src_w, src_h);
    let bounds = rotated_bounds(source, degrees);
    let Dimensions {
        width: work_w,
        height: work_h,
    } = rotation_canvas(source, degrees);
    let mut work = RgbaImage::from_pixel(work_w, work_h, background);
    imageops::replace(
        &mut work,
        src,
        i64::from((work_w - src_w) / 2),
        i64::from((work_h - src_h) / 2),
    );

    // imageproc turns clockwise for positive angles
    let turned = rotate_about_center(
        &work,
        -(degrees.to_radians() as f32),
        Interpolation::Bilinear,
        background,
    );
    imageops::crop_imm(
        &turned,
        (work_w - bounds.width) / 2,
        (work_h - bounds.height) / 2,
        bounds.width,
        bounds.height,
    )
    .to_image()
}
