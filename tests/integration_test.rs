#[path = "integration/common.rs"]
mod common;

#[path = "integration/pdf_overlay.rs"]
mod pdf_overlay;

#[path = "integration/image_overlay.rs"]
mod image_overlay;

#[path = "integration/video_overlay.rs"]
mod video_overlay;
