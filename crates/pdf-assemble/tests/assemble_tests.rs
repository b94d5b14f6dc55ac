mod common;

use common::*;
use lopdf::Document;
use pdf_assemble::*;

fn import(session: &mut Session, files: Vec<(&str, Vec<u8>)>) {
    let report = session.import(
        files
            .into_iter()
            .map(|(name, bytes)| ImportFile::new(name, bytes))
            .collect(),
    );
    assert!(report.failures.is_empty());
}

fn content_of(doc: &Document, page_index: usize) -> String {
    let page_id = page_ids(doc)[page_index];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

#[tokio::test]
async fn test_export_empty_session_fails() {
    let session = Session::new();
    let result = session.export(&ExportOptions::default()).await;
    assert!(matches!(result, Err(AssembleError::EmptyDocument)));
}

#[tokio::test]
async fn test_export_image_then_rotated_pdf_page() {
    let mut session = Session::new();
    import(
        &mut session,
        vec![
            ("photo.png", png_bytes(300, 200)),
            ("scan.pdf", pdf_bytes(2, Some(90))),
        ],
    );

    // Keep the image and the second PDF page, turned a quarter turn
    let ids: Vec<PageId> = session.pages().iter().map(|p| p.id).collect();
    let _ = session.delete(ids[1]);
    let _ = session.rotate(ids[2]);

    let exported = session.export(&ExportOptions::default()).await.unwrap();
    assert_eq!(exported.page_count, 2);
    assert!(exported.skipped.is_empty());

    let doc = Document::load_mem(&exported.bytes).unwrap();
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 2);

    assert_eq!(media_box(&doc, pages[0]), (0.0, 0.0, 300.0, 200.0));
    assert_eq!(rotate_of(&doc, pages[0]), 0);
    assert!(content_of(&doc, 0).contains("Do"));

    // Inherited /Rotate 90 plus one user quarter turn
    assert_eq!(media_box(&doc, pages[1]), (0.0, 0.0, 612.0, 792.0));
    assert_eq!(rotate_of(&doc, pages[1]), 180);
    assert!(content_of(&doc, 1).contains("Page 2"));
}

#[tokio::test]
async fn test_export_preserves_ledger_order() {
    let mut session = Session::new();
    import(&mut session, vec![("doc.pdf", pdf_bytes(3, None))]);

    let ids: Vec<PageId> = session.pages().iter().map(|p| p.id).collect();
    let _ = session.reorder(ids[2], ids[0]);

    let exported = session.export(&ExportOptions::default()).await.unwrap();
    let doc = Document::load_mem(&exported.bytes).unwrap();

    assert!(content_of(&doc, 0).contains("Page 3"));
    assert!(content_of(&doc, 1).contains("Page 1"));
    assert!(content_of(&doc, 2).contains("Page 2"));
}

#[tokio::test]
async fn test_export_same_page_twice_after_undo_redo() {
    let mut session = Session::new();
    import(&mut session, vec![("doc.pdf", pdf_bytes(1, None)), ("pic.jpg", jpeg_bytes(50, 80))]);

    let _ = session.rotate(session.pages()[1].id);
    let _ = session.undo();

    let exported = session.export(&ExportOptions::default()).await.unwrap();
    let doc = Document::load_mem(&exported.bytes).unwrap();
    let pages = page_ids(&doc);

    assert_eq!(pages.len(), 2);
    assert_eq!(media_box(&doc, pages[1]), (0.0, 0.0, 50.0, 80.0));
    assert_eq!(rotate_of(&doc, pages[1]), 0);
}

#[tokio::test]
async fn test_export_with_watermark() {
    let mut session = Session::new();
    import(&mut session, vec![("wide.png", png_bytes(600, 400))]);

    let options = ExportOptions {
        output_name: "stamped".to_string(),
        watermark: Some(WatermarkOptions {
            text: "DRAFT".to_string(),
            color_hex: "#0000FF".to_string(),
            opacity: 0.25,
        }),
    };
    let exported = session.export(&options).await.unwrap();
    let doc = Document::load_mem(&exported.bytes).unwrap();

    let content = content_of(&doc, 0);
    assert!(content.contains("72.0000 Tf"));
    assert!(content.contains("0.0000 0.0000 1.0000 rg"));
    // Original content is isolated before the stamp
    assert!(content.starts_with("q"));
    assert!(content.contains("Tj"));

    let font_found = doc.objects.values().any(|obj| {
        obj.as_dict()
            .ok()
            .and_then(|d| d.get(b"BaseFont").ok())
            .and_then(|n| n.as_name().ok())
            == Some(&b"Helvetica-Bold"[..])
    });
    assert!(font_found);
}

#[tokio::test]
async fn test_blank_watermark_is_skipped() {
    let mut session = Session::new();
    import(&mut session, vec![("doc.pdf", pdf_bytes(1, None))]);

    let options = ExportOptions {
        watermark: Some(WatermarkOptions::new("   ")),
        ..ExportOptions::default()
    };
    let exported = session.export(&options).await.unwrap();
    let doc = Document::load_mem(&exported.bytes).unwrap();
    assert!(!content_of(&doc, 0).contains("Tm"));
}

#[tokio::test]
async fn test_unencodable_watermark_is_skipped() {
    let mut session = Session::new();
    import(&mut session, vec![("photo.png", png_bytes(60, 40))]);

    let options = ExportOptions {
        watermark: Some(WatermarkOptions::new("機密")),
        ..ExportOptions::default()
    };
    let exported = session.export(&options).await.unwrap();
    assert_eq!(exported.page_count, 1);

    let doc = Document::load_mem(&exported.bytes).unwrap();
    let content = content_of(&doc, 0);
    assert!(!content.contains("Tj"));
    assert!(!content.contains("3F3F"));
}

#[tokio::test]
async fn test_export_rejects_invalid_watermark() {
    let mut session = Session::new();
    import(&mut session, vec![("doc.pdf", pdf_bytes(1, None))]);

    let options = ExportOptions {
        watermark: Some(WatermarkOptions {
            color_hex: "red".to_string(),
            ..WatermarkOptions::default()
        }),
        ..ExportOptions::default()
    };
    let result = session.export(&options).await;
    assert!(matches!(result, Err(AssembleError::Config(_))));
}

#[test]
fn test_assemble_skips_unreadable_source() {
    use std::sync::Arc;

    let mut session = Session::new();
    import(
        &mut session,
        vec![("pic.png", png_bytes(10, 10)), ("doc.pdf", pdf_bytes(2, None))],
    );
    let mut input = session.export_input();

    // Swap the PDF payload for garbage after import
    let pdf_file = input.pages[1].source_file;
    let broken = SourceFile {
        data: Arc::from(b"%PDF-1.7 garbage".to_vec()),
        ..(*input.files[&pdf_file]).clone()
    };
    input.files.insert(pdf_file, Arc::new(broken));

    let assembled = assemble_sync(&input.pages, &input.files, &ExportOptions::default()).unwrap();
    assert_eq!(assembled.page_count, 1);
    assert_eq!(assembled.skipped.len(), 2);
    assert_eq!(assembled.skipped[0].page_id, input.pages[1].id);

    // Nothing left once the image is gone too
    let only_pdf: Vec<PageDescriptor> = input.pages[1..].to_vec();
    let result = assemble_sync(&only_pdf, &input.files, &ExportOptions::default());
    assert!(matches!(result, Err(AssembleError::EmptyOutput)));
}

#[test]
fn test_assemble_skips_page_with_unknown_file() {
    let mut session = Session::new();
    import(&mut session, vec![("doc.pdf", pdf_bytes(1, None))]);
    let mut input = session.export_input();

    let mut orphan = input.pages[0].clone();
    orphan.id = PageId(4242);
    orphan.source_file = FileId(4242);
    input.pages.push(orphan);

    let assembled = assemble_sync(&input.pages, &input.files, &ExportOptions::default()).unwrap();
    assert_eq!(assembled.page_count, 1);
    assert_eq!(assembled.skipped[0].page_id, PageId(4242));
    assert_eq!(
        assembled.skipped[0].reason,
        AssembleError::UnknownSource(FileId(4242)).to_string()
    );
}

#[tokio::test]
async fn test_save_pdf() {
    use tempfile::TempDir;

    let mut session = Session::new();
    import(&mut session, vec![("doc.pdf", pdf_bytes(1, None))]);
    let options = ExportOptions::default();
    let exported = session.export(&options).await.unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join(options.file_name());
    save_pdf(&exported.bytes, &path).await.unwrap();

    assert!(path.ends_with("document-fusionne.pdf"));
    let loaded = Document::load(&path).unwrap();
    assert_eq!(loaded.get_pages().len(), 1);
}
