//! Shared fixtures for the integration tests.
//!
//! Fixtures are generated on the fly instead of being checked in: a minimal
//! valid PDF built with lopdf and a plain white PNG.

use std::path::{Path, PathBuf};

use aquamark::WatermarkService;
use image::{Rgba, RgbaImage};
use lopdf::{dictionary, Document};

/// Build a minimal valid PDF with the given number of US Letter pages.
pub fn test_pdf(page_count: usize) -> Document {
    let mut doc = Document::with_version("1.4");

    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for _ in 0..page_count {
        let page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        kids.push(doc.add_object(page).into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
    };
    doc.objects.insert(pages_id, pages.into());

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a generated PDF fixture into `dir` and return its path.
pub fn write_pdf_fixture(dir: &Path, name: &str, page_count: usize) -> PathBuf {
    let path = dir.join(name);
    test_pdf(page_count)
        .save(&path)
        .expect("failed to write PDF fixture");
    path
}

/// Write a white PNG fixture into `dir` and return its path.
pub fn write_png_fixture(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
        .save(&path)
        .expect("failed to write PNG fixture");
    path
}

/// A service backed by a discovered system font.
pub fn service() -> WatermarkService {
    WatermarkService::new().expect("system font available")
}
