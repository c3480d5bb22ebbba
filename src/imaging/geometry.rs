//! Resize geometry: which part of the source to sample, and where to draw it.
//!
//! [`plan`] is a pure function of the source size, the target size and two
//! flags. It never touches pixels; the result is a [`ResizePlan`] that the
//! [`operations`](super::operations) module hands to the raster backend.
//!
//! ## Case selection
//!
//! The first matching case wins:
//!
//! | Case | When | Effect |
//! |---|---|---|
//! | [`Identity`](ResizeCase::Identity) | target == source | nothing to do |
//! | [`CropWidth`](ResizeCase::CropWidth) | narrower, same height, `crop` | center strip, unscaled |
//! | [`CropHeight`](ResizeCase::CropHeight) | shorter, same width, `crop` | center strip, unscaled |
//! | [`PadWidth`](ResizeCase::PadWidth) | wider, same height, `!crop` | source centered, unscaled |
//! | [`PadHeight`](ResizeCase::PadHeight) | taller, same width, `!crop` | source centered, unscaled |
//! | [`ProportionalCrop`](ResizeCase::ProportionalCrop) | aspect differs, `crop` | sample narrowed to target aspect |
//! | [`ProportionalPad`](ResizeCase::ProportionalPad) | aspect differs, `!crop` | destination shrunk, letterboxed |
//! | [`Stretch`](ResizeCase::Stretch) | `!proportional`, or equal aspect | full source into full canvas |
//!
//! ## Ratio quantization
//!
//! Aspect ratios are rounded to two decimals before they are compared. Two
//! ratios that differ only past the second decimal count as equal and the
//! resize becomes a plain [`Stretch`](ResizeCase::Stretch). Output produced by
//! earlier versions depends on this, so it is kept.

use super::params::FillColor;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Extent of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The rectangle covering the whole extent.
    pub fn full_rect(self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// Axis-aligned sampling or placement region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the rectangle lies entirely inside `bounds`.
    pub fn fits_within(&self, bounds: Dimensions) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(bounds.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(bounds.height)
    }
}

/// Which branch of the resolver produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeCase {
    Identity,
    CropWidth,
    CropHeight,
    PadWidth,
    PadHeight,
    ProportionalCrop,
    ProportionalPad,
    Stretch,
}

/// How the destination canvas is initialized before the sample is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasFill {
    /// The sample covers the canvas exactly (or no new canvas is made).
    None,
    /// Fully transparent; used whenever alpha blending is on.
    Transparent,
    /// Solid fill color behind the letterbox margins.
    Color(FillColor),
}

/// Geometry for a single resize.
///
/// `source` lies within the source dimensions and `dest` lies within
/// `canvas`. Either rectangle may be empty for extreme aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResizePlan {
    pub case: ResizeCase,
    pub source: Rect,
    pub dest: Rect,
    pub canvas: Dimensions,
}

impl ResizePlan {
    pub fn is_identity(&self) -> bool {
        self.case == ResizeCase::Identity
    }

    /// True when the sample has to be resampled to fit the destination.
    pub fn needs_resample(&self) -> bool {
        self.source.width != self.dest.width || self.source.height != self.dest.height
    }

    /// Decide how the canvas is prepared before drawing.
    pub fn canvas_fill(&self, alpha_blending: bool, fill_color: FillColor) -> CanvasFill {
        match self.case {
            ResizeCase::Identity | ResizeCase::CropWidth | ResizeCase::CropHeight => {
                CanvasFill::None
            }
            ResizeCase::PadWidth | ResizeCase::PadHeight => {
                if alpha_blending {
                    CanvasFill::Transparent
                } else {
                    CanvasFill::Color(fill_color)
                }
            }
            ResizeCase::ProportionalCrop
            | ResizeCase::ProportionalPad
            | ResizeCase::Stretch => {
                if alpha_blending {
                    CanvasFill::Transparent
                } else if self.dest.x > 0 || self.dest.y > 0 {
                    CanvasFill::Color(fill_color)
                } else {
                    CanvasFill::None
                }
            }
        }
    }
}

/// Compute the resize geometry for `source` → `target`.
///
/// A zero in `target` keeps the corresponding source dimension. `crop`
/// selects crop-to-fill over letterboxing; `proportional = false` stretches
/// whenever the trivial cases don't apply.
///
/// # Examples
/// ```
/// # use raster_fit::imaging::geometry::{plan, Rect, ResizeCase};
/// // 400x200 → 200x200 with crop: keep the center 200px strip
/// let p = plan((400, 200), (200, 200), true, true).unwrap();
/// assert_eq!(p.case, ResizeCase::CropWidth);
/// assert_eq!(p.source, Rect::new(100, 0, 200, 200));
/// ```
pub fn plan(
    source: (u32, u32),
    target: (u32, u32),
    crop: bool,
    proportional: bool,
) -> Result<ResizePlan, GeometryError> {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return Err(GeometryError::InvalidArgument(format!(
            "source dimensions must be positive, got {src_w}x{src_h}"
        )));
    }

    let dst_w = if target.0 == 0 { src_w } else { target.0 };
    let dst_h = if target.1 == 0 { src_h } else { target.1 };
    let src = Dimensions::new(src_w, src_h);
    let dst = Dimensions::new(dst_w, dst_h);

    let plan = if dst == src {
        identity(src)
    } else if src_w > dst_w && src_h == dst_h && crop {
        crop_width(src, dst)
    } else if src_h > dst_h && src_w == dst_w && crop {
        crop_height(src, dst)
    } else if dst_w > src_w && src_h == dst_h && !crop {
        pad_width(src, dst)
    } else if dst_h > src_h && src_w == dst_w && !crop {
        pad_height(src, dst)
    } else {
        general(src, dst, crop, proportional)
    };
    Ok(plan)
}

fn identity(src: Dimensions) -> ResizePlan {
    ResizePlan {
        case: ResizeCase::Identity,
        source: src.full_rect(),
        dest: src.full_rect(),
        canvas: src,
    }
}

fn crop_width(src: Dimensions, dst: Dimensions) -> ResizePlan {
    let x = centered(src.width, f64::from(dst.width));
    ResizePlan {
        case: ResizeCase::CropWidth,
        source: Rect::new(x, 0, dst.width, src.height),
        dest: dst.full_rect(),
        canvas: dst,
    }
}

fn crop_height(src: Dimensions, dst: Dimensions) -> ResizePlan {
    let y = centered(src.height, f64::from(dst.height));
    ResizePlan {
        case: ResizeCase::CropHeight,
        source: Rect::new(0, y, src.width, dst.height),
        dest: dst.full_rect(),
        canvas: dst,
    }
}

fn pad_width(src: Dimensions, dst: Dimensions) -> ResizePlan {
    let x = centered(dst.width, f64::from(src.width));
    ResizePlan {
        case: ResizeCase::PadWidth,
        source: src.full_rect(),
        dest: Rect::new(x, 0, src.width, src.height),
        canvas: dst,
    }
}

fn pad_height(src: Dimensions, dst: Dimensions) -> ResizePlan {
    let y = centered(dst.height, f64::from(src.height));
    ResizePlan {
        case: ResizeCase::PadHeight,
        source: src.full_rect(),
        dest: Rect::new(0, y, src.width, src.height),
        canvas: dst,
    }
}

fn general(src: Dimensions, dst: Dimensions, crop: bool, proportional: bool) -> ResizePlan {
    let stretch = ResizePlan {
        case: ResizeCase::Stretch,
        source: src.full_rect(),
        dest: dst.full_rect(),
        canvas: dst,
    };
    if !proportional {
        return stretch;
    }

    let old_ratio = quantized_ratio(src);
    let new_ratio = quantized_ratio(dst);

    match old_ratio.partial_cmp(&new_ratio) {
        // Source is relatively wider (album → book)
        Some(Ordering::Greater) => {
            if crop {
                let sample_w = f64::from(src.height) * new_ratio;
                ResizePlan {
                    case: ResizeCase::ProportionalCrop,
                    source: Rect::new(
                        centered(src.width, sample_w),
                        0,
                        round_px(sample_w),
                        src.height,
                    ),
                    ..stretch
                }
            } else {
                let dest_h = round_px(f64::from(dst.width) / old_ratio);
                ResizePlan {
                    case: ResizeCase::ProportionalPad,
                    dest: Rect::new(
                        0,
                        centered(dst.height, f64::from(dest_h)),
                        dst.width,
                        dest_h,
                    ),
                    ..stretch
                }
            }
        }
        // Source is relatively taller (book → album)
        Some(Ordering::Less) => {
            if crop {
                let sample_h = f64::from(src.width) / new_ratio;
                ResizePlan {
                    case: ResizeCase::ProportionalCrop,
                    source: Rect::new(
                        0,
                        centered(src.height, sample_h),
                        src.width,
                        round_px(sample_h),
                    ),
                    ..stretch
                }
            } else {
                let dest_w = round_px(f64::from(dst.height) * old_ratio);
                ResizePlan {
                    case: ResizeCase::ProportionalPad,
                    dest: Rect::new(
                        centered(dst.width, f64::from(dest_w)),
                        0,
                        dest_w,
                        dst.height,
                    ),
                    ..stretch
                }
            }
        }
        _ => stretch,
    }
}

/// Width over height, rounded to two decimals.
fn quantized_ratio(dims: Dimensions) -> f64 {
    (f64::from(dims.width) / f64::from(dims.height) * 100.0).round() / 100.0
}

/// Offset that centers a span of `inner` pixels inside `outer`.
fn centered(outer: u32, inner: f64) -> u32 {
    round_px((f64::from(outer) - inner) / 2.0)
}

/// Round half away from zero; negative values clamp to 0.
fn round_px(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
