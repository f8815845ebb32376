//! Integration tests for session PDF export.

use std::io::Cursor;

use chrono::Utc;
use lab_core::{Gallery, ImageData};
use lab_export::{ExportConfig, SessionExporter};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 44, 52]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encodes");
    bytes
}

fn gallery_with(images: Vec<ImageData>) -> Gallery {
    let mut gallery = Gallery::new();
    gallery.append(images);
    gallery
}

#[test]
fn text_only_export_is_one_page() {
    let exporter = SessionExporter::with_defaults();
    let doc = exporter
        .render("Brushed chrome hero with deep gloss shadows.", &[], Utc::now())
        .expect("export succeeds");

    assert!(doc.bytes.starts_with(b"%PDF-"));
    assert_eq!(doc.pages, 1);
    assert_eq!(doc.images_embedded, 0);
    assert_eq!(doc.images_failed, 0);
}

#[test]
fn one_page_per_gallery_entry() {
    let gallery = gallery_with(vec![
        ImageData::new(png_bytes(32, 18)),
        ImageData::new(png_bytes(16, 16)),
    ]);

    let doc = SessionExporter::with_defaults()
        .render("Concept", gallery.entries(), Utc::now())
        .expect("export succeeds");

    assert_eq!(doc.pages, 3);
    assert_eq!(doc.images_embedded, 2);
    assert_eq!(doc.images_failed, 0);
}

#[test]
fn undecodable_image_leaves_blank_page() {
    let gallery = gallery_with(vec![
        ImageData::new(vec![0x89, 0x50, 0x4E, 0x47, 0x00]),
        ImageData::new(png_bytes(8, 8)),
    ]);

    let doc = SessionExporter::with_defaults()
        .render("Concept", gallery.entries(), Utc::now())
        .expect("export still succeeds");

    assert_eq!(doc.pages, 3);
    assert_eq!(doc.images_embedded, 1);
    assert_eq!(doc.images_failed, 1);
}

#[test]
fn long_text_continues_on_extra_pages() {
    let paragraph = "Liquid metal surfaces catch studio light across layered glass panels. ".repeat(12);
    let text = vec![paragraph; 12].join("\n");

    let doc = SessionExporter::with_defaults()
        .render(&text, &[], Utc::now())
        .expect("export succeeds");
    assert!(doc.pages > 1, "expected overflow, got {} page(s)", doc.pages);
}

#[test]
fn custom_page_size() {
    let exporter = SessionExporter::new(ExportConfig {
        page_width_mm: 148.0,
        page_height_mm: 210.0,
        margin_mm: 10.0,
        ..ExportConfig::default()
    });
    assert!((exporter.content_width_mm() - 128.0).abs() < f32::EPSILON);

    let doc = exporter
        .render("A5 export", &[], Utc::now())
        .expect("export succeeds");
    assert!(doc.bytes.starts_with(b"%PDF-"));
}
