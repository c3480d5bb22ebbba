//! End-to-end tests against real files: open, transform, save, reopen.
//!
//! Run with: cargo test --test pipeline

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, Rgba, RgbaImage};
use raster_fit::config::{CONFIG_FILE, load_config};
use raster_fit::imaging::{
    Anchor, BackendError, Dimensions, FillColor, Opacity, OutputFormat, Raster, RustBackend,
    SourceFormat,
};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tempfile::TempDir;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn write_png(path: &Path, width: u32, height: u32, color: Rgba<u8>) {
    RgbaImage::from_pixel(width, height, color).save(path).unwrap();
}

/// Within JPEG tolerance of `expected`.
fn close_to(px: &Rgba<u8>, expected: [u8; 3]) -> bool {
    px.0.iter()
        .zip(expected)
        .all(|(&got, want)| got.abs_diff(want) <= 24)
}

#[test]
fn letterbox_then_watermark_then_jpeg() {
    let tmp = TempDir::new().unwrap();
    let photo = tmp.path().join("photo.png");
    let logo = tmp.path().join("logo.png");
    let out = tmp.path().join("thumb.jpg");
    write_png(&photo, 200, 100, RED);
    write_png(&logo, 40, 20, BLUE);

    Raster::open(&photo)
        .unwrap()
        .set_fill_color(FillColor::new(255, 255, 255))
        .resize(300, 300, false, true)
        .unwrap()
        .merge_file(&logo, Anchor::End, Anchor::End)
        .unwrap()
        .save(&out)
        .unwrap();

    let result = Raster::open(&out).unwrap();
    assert_eq!(result.image_type(), Some(SourceFormat::Jpeg));
    assert_eq!(result.dimensions(), Dimensions::new(300, 300));
    // 200x100 scaled to 300x150, centered at y = 75
    assert!(close_to(result.pixels().get_pixel(150, 20), [255, 255, 255]));
    assert!(close_to(result.pixels().get_pixel(150, 150), [255, 0, 0]));
    assert!(close_to(result.pixels().get_pixel(290, 290), [0, 0, 255]));
}

#[test]
fn crop_and_save_png_is_lossless() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("grid.png");
    let out = tmp.path().join("cropped.png");
    RgbaImage::from_fn(50, 50, |x, y| Rgba([x as u8, y as u8, 7, 255]))
        .save(&src)
        .unwrap();

    Raster::open(&src)
        .unwrap()
        .crop(40, 30, 10, 20)
        .unwrap()
        .save(&out)
        .unwrap();

    let cropped = Raster::open(&out).unwrap();
    assert_eq!(cropped.dimensions(), Dimensions::new(30, 10));
    assert_eq!(cropped.pixels().get_pixel(0, 0), &Rgba([10, 20, 7, 255]));
    assert_eq!(cropped.pixels().get_pixel(29, 9), &Rgba([39, 29, 7, 255]));
}

#[test]
fn faded_logo_keeps_alpha_in_png() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("logo.png");
    let out = tmp.path().join("newlogo.png");
    write_png(&src, 10, 10, BLUE);

    Raster::open(&src)
        .unwrap()
        .opacity(Opacity::new(30))
        .save(&out)
        .unwrap();

    let faded = Raster::open(&out).unwrap();
    assert_eq!(faded.pixels().get_pixel(5, 5), &Rgba([0, 0, 255, 78]));
}

#[test]
fn crop_fill_and_rotate() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("wide.png");
    write_png(&src, 400, 100, RED);

    let mut raster = Raster::open(&src).unwrap();
    raster
        .resize(100, 100, true, true)
        .unwrap()
        .rotate(90.0, None)
        .unwrap();
    assert_eq!(raster.dimensions(), Dimensions::new(100, 100));

    raster
        .resize(100, 50, false, false)
        .unwrap()
        .rotate(270.0, None)
        .unwrap();
    assert_eq!(raster.dimensions(), Dimensions::new(50, 100));
}

#[test]
fn save_as_overrides_extension() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("in.png");
    let out = tmp.path().join("out.png");
    write_png(&src, 12, 12, RED);

    Raster::open(&src)
        .unwrap()
        .save_as(&out, OutputFormat::Gif)
        .unwrap();

    assert_eq!(
        Raster::open(&out).unwrap().image_type(),
        Some(SourceFormat::Gif)
    );
}

#[test]
fn animated_gif_is_detected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("spinner.gif");
    {
        let mut encoder = GifEncoder::new(BufWriter::new(File::create(&path).unwrap()));
        let frames = [RED, BLUE].map(|color| {
            Frame::from_parts(
                RgbaImage::from_pixel(8, 8, color),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            )
        });
        encoder.encode_frames(frames).unwrap();
    }

    let raster = Raster::open(&path).unwrap();
    assert_eq!(raster.image_type(), Some(SourceFormat::Gif));
    assert!(raster.is_animated().unwrap());

    let still = tmp.path().join("still.png");
    write_png(&still, 8, 8, RED);
    assert!(!Raster::open(&still).unwrap().is_animated().unwrap());
}

#[test]
fn missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let result = Raster::open(tmp.path().join("nope.jpg"));
    assert!(matches!(result, Err(BackendError::NotFound(_))));
}

#[test]
fn memory_limit_from_config_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(CONFIG_FILE), "[limits]\nmemory = 1000\n").unwrap();
    let src = tmp.path().join("big.png");
    write_png(&src, 20, 20, RED);

    let config = load_config(tmp.path()).unwrap();
    let result = Raster::open_with(&RustBackend::new(), &src, &config);
    assert!(matches!(
        result,
        Err(BackendError::ResourceExceeded {
            required: 1600,
            limit: 1000
        })
    ));
}
