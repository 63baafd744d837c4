//! Builds small text-only PDFs with lopdf for integration tests.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One line of text placed at an absolute position.
#[derive(Debug, Clone)]
pub struct TextItem {
    pub text: String,
    pub size: f32,
    pub bold: bool,
    pub x: f32,
    pub y: f32,
}

/// Incrementally describes a document, one page at a time.
#[derive(Debug, Default)]
pub struct PdfBuilder {
    pages: Vec<Vec<TextItem>>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new page; following `text` calls land on it.
    pub fn page(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    /// Place a line of text on the current page (PDF coordinates, y up).
    pub fn text(mut self, text: &str, size: f32, bold: bool, x: f32, y: f32) -> Self {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        self.pages.last_mut().unwrap().push(TextItem {
            text: text.to_string(),
            size,
            bold,
            x,
            y,
        });
        self
    }

    /// Add `count` lines of 11pt body text, 14pt apart, starting at `top`.
    pub fn body(mut self, page_label: &str, top: f32, count: usize) -> Self {
        for i in 0..count {
            let line = format!(
                "Body line {} of {} keeps going with ordinary words here",
                i, page_label
            );
            self = self.text(&line, 11.0, false, 72.0, top - i as f32 * 14.0);
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        let mut kids = Vec::new();
        for items in &self.pages {
            let mut operations = Vec::new();
            for item in items {
                let font = if item.bold { "F2" } else { "F1" };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font.as_bytes().to_vec()), Object::Real(item.size)],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Real(item.x), Object::Real(item.y)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(item.text.as_str())],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    pub fn save(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

/// Single page: a 24pt bold "Hello World" above 10pt body text.
pub fn hello_world() -> PdfBuilder {
    let mut builder = PdfBuilder::new()
        .page()
        .text("Hello World", 24.0, true, 72.0, 720.0);
    for i in 0..12 {
        builder = builder.text(
            &format!("Plain paragraph text number {} for the body", i),
            10.0,
            false,
            72.0,
            640.0 - i as f32 * 13.0,
        );
    }
    builder
}

/// Three pages: "Chapter 1" (20pt bold) and "Section 1.1" (16pt bold) on
/// page 1, 12pt body text throughout.
pub fn chapter_and_section() -> PdfBuilder {
    let mut builder = PdfBuilder::new()
        .page()
        .text("Chapter 1", 20.0, true, 72.0, 720.0)
        .text("Section 1.1", 16.0, true, 72.0, 680.0);
    for page in 1..=3 {
        if page > 1 {
            builder = builder.page();
        }
        let top = if page == 1 { 640.0 } else { 720.0 };
        for i in 0..20 {
            builder = builder.text(
                &format!("Page {} body sentence {} with enough words to count.", page, i),
                12.0,
                false,
                72.0,
                top - i as f32 * 15.0,
            );
        }
    }
    builder
}
