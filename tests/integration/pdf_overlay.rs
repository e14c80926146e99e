//! End-to-end PDF watermarking flows.

use aquamark::attributes::Anchor;
use aquamark::render::PdfTarget;
use lopdf::content::Content;
use lopdf::Document;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{service, write_pdf_fixture};

fn show_text_count(doc: &Document) -> usize {
    doc.get_pages()
        .values()
        .map(|page_id| {
            let bytes = doc.get_page_content(*page_id).unwrap();
            Content::decode(&bytes)
                .unwrap()
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .count()
        })
        .sum()
}

#[tokio::test]
async fn test_watermark_pdf_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf_fixture(dir.path(), "input.pdf", 1);
    let output = dir.path().join("output.pdf");

    service()
        .pdf_file(&input)
        .await
        .unwrap()
        .text("CONFIDENTIAL")
        .size(36.0)
        .opacity(0.3)
        .rotation(45)
        .apply_to_file(&output)
        .await
        .unwrap();

    let stamped = Document::load(&output).unwrap();
    assert_eq!(stamped.get_pages().len(), 1);
    assert_eq!(show_text_count(&stamped), 1);
}

#[tokio::test]
async fn test_every_page_gets_stamped() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf_fixture(dir.path(), "input.pdf", 3);
    let output = dir.path().join("output.pdf");

    service()
        .pdf_file(&input)
        .await
        .unwrap()
        .text("DRAFT")
        .apply_to_file(&output)
        .await
        .unwrap();

    let stamped = Document::load(&output).unwrap();
    assert_eq!(stamped.get_pages().len(), 3);
    assert_eq!(show_text_count(&stamped), 3);
}

#[tokio::test]
async fn test_chained_watermarks_stamp_independently() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf_fixture(dir.path(), "input.pdf", 1);

    let stamped = service()
        .pdf_file(&input)
        .await
        .unwrap()
        .text("CONFIDENTIAL")
        .rotation(45)
        .and()
        .text("Acme Corp")
        .position(Anchor::BottomRight)
        .apply()
        .await
        .unwrap();

    assert_eq!(show_text_count(stamped.document()), 2);

    // Each chained watermark carries its own opacity state.
    let page_id = *stamped.document().get_pages().values().next().unwrap();
    let page = stamped
        .document()
        .get_object(page_id)
        .unwrap()
        .as_dict()
        .unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let states = resources.get(b"ExtGState").unwrap().as_dict().unwrap();
    assert!(states.has(b"AqGS1"));
    assert!(states.has(b"AqGS2"));
}

#[tokio::test]
async fn test_trademark_glyph_stamped_alongside_text() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf_fixture(dir.path(), "input.pdf", 1);

    let stamped = service()
        .pdf_file(&input)
        .await
        .unwrap()
        .text("Acme")
        .trademark()
        .apply()
        .await
        .unwrap();

    assert_eq!(show_text_count(stamped.document()), 2);
}

#[tokio::test]
async fn test_tiled_watermark_covers_the_page() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf_fixture(dir.path(), "input.pdf", 1);

    let stamped = service()
        .pdf_file(&input)
        .await
        .unwrap()
        .text("DRAFT")
        .tiled(80.0)
        .apply()
        .await
        .unwrap();

    assert!(show_text_count(stamped.document()) > 4);
}

#[rstest]
#[case(Anchor::TopLeft)]
#[case(Anchor::Center)]
#[case(Anchor::BottomRight)]
#[case(Anchor::Custom { x: 100.0, y: 200.0 })]
#[tokio::test]
async fn test_anchor_variants_round_trip(#[case] anchor: Anchor) {
    let dir = TempDir::new().unwrap();
    let input = write_pdf_fixture(dir.path(), "input.pdf", 1);
    let output = dir.path().join("output.pdf");

    service()
        .pdf_file(&input)
        .await
        .unwrap()
        .text("DRAFT")
        .position(anchor)
        .apply_to_file(&output)
        .await
        .unwrap();

    assert!(Document::load(&output).is_ok());
}

#[tokio::test]
async fn test_missing_input_reports_file_not_found() {
    let err = PdfTarget::from_file("/definitely/not/here.pdf")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        aquamark::WatermarkError::FileNotFound { .. }
    ));
}

#[tokio::test]
async fn test_invalid_attributes_leave_no_output() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf_fixture(dir.path(), "input.pdf", 1);
    let output = dir.path().join("output.pdf");

    let result = service()
        .pdf_file(&input)
        .await
        .unwrap()
        .text("")
        .apply_to_file(&output)
        .await;

    assert!(result.unwrap_err().is_validation());
    assert!(!output.exists());
}
