//! End-to-end tests: synthetic PDFs through span collection, analysis and JSON.

mod common;

use std::fs;

use common::{chapter_and_section, hello_world, PdfBuilder};
use pdf_outline::batch::output_path_for;
use pdf_outline::render::{to_json, JsonFormat};
use pdf_outline::{
    extract_outline_bytes, extract_outline_file, run_batch, BatchOptions, DocumentOutline,
    HeadingLevel, OutlineEntry, ParseOptions, PdfSpanCollector, SpanSource,
};

fn quarterly_report() -> PdfBuilder {
    let mut builder = PdfBuilder::new();
    for page in 1..=3 {
        builder = builder
            .page()
            .text("Company Confidential", 14.0, true, 72.0, 760.0)
            .text(&page.to_string(), 10.0, false, 300.0, 40.0);
        builder = match page {
            1 => builder.text("Quarterly Review", 24.0, true, 72.0, 700.0),
            2 => builder.text("Financial Results", 16.0, true, 72.0, 700.0),
            _ => builder,
        };
        builder = builder.body(&format!("page {}", page), 660.0, 20);
    }
    builder
}

fn technical_manual() -> PdfBuilder {
    PdfBuilder::new()
        .page()
        .text("Technical Manual", 26.0, true, 72.0, 740.0)
        .text("1. Introduction", 18.0, true, 72.0, 700.0)
        .text("1.1 Background", 14.0, true, 72.0, 670.0)
        .body("the introduction", 640.0, 10)
        .page()
        .text("1.1.1 Scope", 12.5, true, 72.0, 740.0)
        .body("the scope", 710.0, 10)
        .text("1.2 Goals", 14.0, true, 72.0, 500.0)
        .body("the goals", 470.0, 10)
        .page()
        .text("1.2.1 Metrics", 12.5, true, 72.0, 740.0)
        .body("the metrics", 710.0, 20)
}

#[test]
fn test_collects_spans_from_generated_pdf() {
    let bytes = hello_world().build();
    let collector = PdfSpanCollector::from_bytes(&bytes).unwrap();
    assert_eq!(collector.page_count(), 1);

    let spans = collector.collect_spans().unwrap();
    assert_eq!(spans.len(), 13);

    let title = &spans[0];
    assert_eq!(title.text, "Hello World");
    assert_eq!(title.page, 1);
    assert!(title.is_bold);
    assert!((title.font_size - 24.0).abs() < 0.01);
    assert!(spans[1..].iter().all(|s| !s.is_bold && (s.font_size - 10.0).abs() < 0.01));
    // top-down coordinates: reading order means growing y0
    assert!(spans.windows(2).all(|w| w[0].bbox.y0 < w[1].bbox.y0));
}

#[test]
fn test_title_only_document() {
    let outline = extract_outline_bytes(&hello_world().build()).unwrap();
    assert_eq!(outline.title, "Hello World");
    assert!(outline.outline.is_empty());
}

#[test]
fn test_chapter_and_section_levels() {
    let outline = extract_outline_bytes(&chapter_and_section().build()).unwrap();
    assert_eq!(outline.title, "");
    assert_eq!(
        outline.outline,
        vec![
            OutlineEntry::new(HeadingLevel::H1, "Chapter 1", 1),
            OutlineEntry::new(HeadingLevel::H2, "Section 1.1", 1),
        ]
    );
}

#[test]
fn test_running_header_and_page_numbers_ignored() {
    let outline = extract_outline_bytes(&quarterly_report().build()).unwrap();
    assert_eq!(outline.title, "Quarterly Review");
    assert_eq!(
        outline.outline,
        vec![OutlineEntry::new(HeadingLevel::H1, "Financial Results", 2)]
    );
}

#[test]
fn test_dated_title_and_same_size_heading() {
    let bytes = PdfBuilder::new()
        .page()
        .text("Annual Report 2024", 24.0, true, 72.0, 740.0)
        .body("the summary", 700.0, 10)
        .text("Overview", 24.0, true, 72.0, 500.0)
        .body("the overview", 460.0, 10)
        .page()
        .body("the appendix", 720.0, 20)
        .build();

    let outline = extract_outline_bytes(&bytes).unwrap();
    assert_eq!(outline.title, "Annual Report 2024");
    assert_eq!(
        outline.outline,
        vec![OutlineEntry::new(HeadingLevel::H1, "Overview", 1)]
    );
}

#[test]
fn test_three_level_hierarchy() {
    let outline = extract_outline_bytes(&technical_manual().build()).unwrap();
    assert_eq!(outline.title, "Technical Manual");
    assert_eq!(
        outline.outline,
        vec![
            OutlineEntry::new(HeadingLevel::H1, "1. Introduction", 1),
            OutlineEntry::new(HeadingLevel::H2, "1.1 Background", 1),
            OutlineEntry::new(HeadingLevel::H3, "1.1.1 Scope", 2),
            OutlineEntry::new(HeadingLevel::H2, "1.2 Goals", 2),
            OutlineEntry::new(HeadingLevel::H3, "1.2.1 Metrics", 3),
        ]
    );
}

#[test]
fn test_entries_in_document_order() {
    let outline = extract_outline_bytes(&technical_manual().build()).unwrap();
    let pages: Vec<u32> = outline.outline.iter().map(|e| e.page).collect();
    let mut sorted = pages.clone();
    sorted.sort();
    assert_eq!(pages, sorted);
    assert!(outline.outline.iter().all(|e| e.page >= 1 && e.page <= 3));
}

#[test]
fn test_page_selection_limits_outline() {
    let bytes = technical_manual().build();
    let options = ParseOptions::new().with_pages(pdf_outline::PageSelection::Pages(vec![2]));
    let collector = PdfSpanCollector::from_bytes_with_options(&bytes, options).unwrap();
    let spans = collector.collect_spans().unwrap();
    assert!(!spans.is_empty());
    assert!(spans.iter().all(|s| s.page == 2));
}

#[test]
fn test_document_without_text() {
    let outline = extract_outline_bytes(&PdfBuilder::new().page().build()).unwrap();
    assert_eq!(outline, DocumentOutline::empty());
    assert_eq!(
        to_json(&outline, JsonFormat::Compact).unwrap(),
        r#"{"title":"","outline":[]}"#
    );
}

#[test]
fn test_extraction_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manual.pdf");
    technical_manual().save(&path);

    let first = to_json(&extract_outline_file(&path).unwrap(), JsonFormat::Pretty).unwrap();
    let second = to_json(&extract_outline_file(&path).unwrap(), JsonFormat::Pretty).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_batch_skips_corrupt_files() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    hello_world().save(&input.path().join("hello.pdf"));
    chapter_and_section().save(&input.path().join("chapters.PDF"));
    fs::write(input.path().join("corrupt.pdf"), b"\x00\x01garbage bytes").unwrap();
    fs::write(input.path().join("notes.txt"), b"not a pdf").unwrap();

    let report = run_batch(input.path(), output.path(), &BatchOptions::new()).unwrap();
    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].input.ends_with("corrupt.pdf"));

    let hello_json = fs::read_to_string(output.path().join("hello.json")).unwrap();
    let hello: DocumentOutline = serde_json::from_str(&hello_json).unwrap();
    assert_eq!(hello.title, "Hello World");
    assert!(hello_json.ends_with('\n'));

    assert!(output.path().join("chapters.json").exists());
    assert!(!output_path_for(&input.path().join("corrupt.pdf"), output.path()).exists());
    assert!(!output.path().join("notes.json").exists());
}

#[test]
fn test_batch_output_matches_across_runs() {
    let input = tempfile::tempdir().unwrap();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    technical_manual().save(&input.path().join("manual.pdf"));
    quarterly_report().save(&input.path().join("report.pdf"));

    run_batch(input.path(), first.path(), &BatchOptions::new()).unwrap();
    run_batch(input.path(), second.path(), &BatchOptions::new().sequential()).unwrap();

    for name in ["manual.json", "report.json"] {
        let a = fs::read(first.path().join(name)).unwrap();
        let b = fs::read(second.path().join(name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", name);
    }
}
