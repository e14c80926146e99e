//! End-to-end video frame watermarking flows.

use aquamark::attributes::Color;
use aquamark::render::RenderContext;
use aquamark::WatermarkService;
use image::{Rgba, RgbaImage};

fn tagged_frames(count: usize) -> Vec<RgbaImage> {
    (0..count)
        .map(|i| {
            let mut frame = RgbaImage::from_pixel(320, 240, Rgba([255, 255, 255, 255]));
            frame.put_pixel(0, 0, Rgba([i as u8, 0, 0, 255]));
            frame
        })
        .collect()
}

#[tokio::test]
async fn test_all_frames_watermarked_in_order() {
    let service = WatermarkService::with_context(
        RenderContext::with_system_font()
            .expect("system font available")
            .workers(3),
    );

    let stamped = service
        .video_frames(tagged_frames(10), 24.0)
        .unwrap()
        .text("DRAFT")
        .color(Color::black())
        .opacity(1.0)
        .apply()
        .await
        .unwrap();

    assert_eq!(stamped.frame_count(), 10);
    assert_eq!(stamped.fps(), 24.0);

    for (i, frame) in stamped.frames().iter().enumerate() {
        // Order tag survives in the corner.
        assert_eq!(frame.get_pixel(0, 0).0[0], i as u8);
        // And the centered watermark left ink on the frame.
        let marked = frame
            .pixels()
            .filter(|p| p.0 != [255, 255, 255, 255])
            .count();
        assert!(marked > 1, "frame {i} missing watermark");
    }
}

#[tokio::test]
async fn test_empty_frame_sequence_rejected() {
    let err = crate::common::service()
        .video_frames(vec![], 24.0)
        .unwrap_err();
    assert!(err.is_validation());
}
