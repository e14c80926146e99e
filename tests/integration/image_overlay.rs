//! End-to-end raster image watermarking flows.

use aquamark::attributes::Color;
use aquamark::render::ImageTarget;
use image::ImageFormat;
use tempfile::TempDir;

use crate::common::{service, write_png_fixture};

fn changed_pixels(target: &ImageTarget) -> usize {
    target
        .pixels()
        .pixels()
        .filter(|p| p.0 != [255, 255, 255, 255])
        .count()
}

#[tokio::test]
async fn test_watermark_image_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_png_fixture(dir.path(), "input.png", 400, 300);
    let output = dir.path().join("output.png");

    service()
        .image_file(&input)
        .await
        .unwrap()
        .text("DRAFT")
        .color(Color::black())
        .opacity(1.0)
        .apply_to_file(&output)
        .await
        .unwrap();

    let stamped = ImageTarget::from_file(&output).await.unwrap();
    assert_eq!(stamped.dimensions(), (400, 300));
    assert_eq!(stamped.format(), ImageFormat::Png);
    assert!(changed_pixels(&stamped) > 0);
}

#[tokio::test]
async fn test_tiled_watermark_reaches_every_quadrant() {
    let dir = TempDir::new().unwrap();
    let input = write_png_fixture(dir.path(), "input.png", 400, 300);

    let stamped = service()
        .image_file(&input)
        .await
        .unwrap()
        .text("DRAFT")
        .color(Color::black())
        .opacity(1.0)
        .tiled(30.0)
        .apply()
        .await
        .unwrap();

    let pixels = stamped.pixels();
    let quadrant_marked = |x0: u32, y0: u32| {
        (x0..x0 + 200)
            .any(|x| (y0..y0 + 150).any(|y| pixels.get_pixel(x, y).0 != [255, 255, 255, 255]))
    };
    assert!(quadrant_marked(0, 0));
    assert!(quadrant_marked(200, 0));
    assert!(quadrant_marked(0, 150));
    assert!(quadrant_marked(200, 150));
}

#[tokio::test]
async fn test_trademark_adds_extra_ink() {
    let dir = TempDir::new().unwrap();
    let input = write_png_fixture(dir.path(), "input.png", 400, 300);

    let plain = service()
        .image_file(&input)
        .await
        .unwrap()
        .text("Acme")
        .color(Color::black())
        .opacity(1.0)
        .apply()
        .await
        .unwrap();

    let marked = service()
        .image_file(&input)
        .await
        .unwrap()
        .text("Acme")
        .color(Color::black())
        .opacity(1.0)
        .trademark()
        .apply()
        .await
        .unwrap();

    assert!(changed_pixels(&marked) > changed_pixels(&plain));
}

#[tokio::test]
async fn test_rotated_watermark_stays_centered() {
    let dir = TempDir::new().unwrap();
    let input = write_png_fixture(dir.path(), "input.png", 400, 400);

    let stamped = service()
        .image_file(&input)
        .await
        .unwrap()
        .text("DRAFT")
        .color(Color::black())
        .opacity(1.0)
        .rotation(45)
        .apply()
        .await
        .unwrap();

    // Ink must be distributed around the image center, none at the edges.
    let pixels = stamped.pixels();
    for (x, y, p) in pixels.enumerate_pixels() {
        if p.0 != [255, 255, 255, 255] {
            assert!(
                x > 80 && x < 320 && y > 80 && y < 320,
                "ink outside the central region at ({x}, {y})"
            );
        }
    }
    assert!(changed_pixels(&stamped) > 0);
}

#[tokio::test]
async fn test_unsupported_input_bytes_rejected() {
    let err = service().image_bytes(&[0u8; 64]).unwrap_err();
    assert!(matches!(
        err,
        aquamark::WatermarkError::UnsupportedImageFormat
    ));
}
