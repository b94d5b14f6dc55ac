use pdf_assemble::*;

#[test]
fn test_default_options() {
    let options = ExportOptions::default();
    assert_eq!(options.output_name, DEFAULT_OUTPUT_NAME);
    assert!(options.watermark.is_none());
    assert_eq!(options.file_name(), "document-fusionne.pdf");
    assert!(options.validate().is_ok());
}

#[test]
fn test_blank_output_name_falls_back() {
    let options = ExportOptions {
        output_name: "  ".to_string(),
        ..ExportOptions::default()
    };
    assert_eq!(options.file_name(), "document.pdf");
}

#[test]
fn test_watermark_defaults() {
    let watermark = WatermarkOptions::default();
    assert_eq!(watermark.text, DEFAULT_WATERMARK_TEXT);
    assert_eq!(watermark.color_hex, DEFAULT_WATERMARK_COLOR);
    assert_eq!(watermark.opacity, DEFAULT_WATERMARK_OPACITY);
}

#[test]
fn test_validation_opacity_range() {
    let mut options = ExportOptions {
        watermark: Some(WatermarkOptions::default()),
        ..ExportOptions::default()
    };
    assert!(options.validate().is_ok());

    for bad in [-0.1, 1.5, f32::NAN] {
        options.watermark.as_mut().unwrap().opacity = bad;
        match options.validate() {
            Err(AssembleError::Config(msg)) => assert!(msg.contains("opacity")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    // Blank text disables the watermark, so nothing is checked
    options.watermark.as_mut().unwrap().text = String::new();
    assert!(options.validate().is_ok());
    assert!(options.active_watermark().is_none());
}

#[test]
fn test_validation_colour() {
    let mut watermark = WatermarkOptions::new("TOP SECRET");
    watermark.color_hex = "00ff00".to_string();
    let options = ExportOptions {
        watermark: Some(watermark),
        ..ExportOptions::default()
    };
    assert!(options.validate().is_ok());

    let color = options.active_watermark().unwrap().color().unwrap();
    assert_eq!(color, Rgb { r: 0.0, g: 1.0, b: 0.0 });

    let bad = ExportOptions {
        watermark: Some(WatermarkOptions {
            color_hex: "#12345".to_string(),
            ..WatermarkOptions::default()
        }),
        ..ExportOptions::default()
    };
    assert!(matches!(bad.validate(), Err(AssembleError::Config(_))));
}

#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let options = ExportOptions {
        output_name: "rapport".to_string(),
        watermark: Some(WatermarkOptions {
            text: "BROUILLON".to_string(),
            color_hex: "#336699".to_string(),
            opacity: 0.3,
        }),
    };

    let temp = NamedTempFile::new().unwrap();
    options.save(temp.path()).await.unwrap();
    let loaded = ExportOptions::load(temp.path()).await.unwrap();

    assert_eq!(loaded, options);
}

#[tokio::test]
async fn test_load_partial_options_uses_defaults() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), r#"{ "watermark": { "text": "COPIE" } }"#).unwrap();

    let loaded = ExportOptions::load(temp.path()).await.unwrap();
    assert_eq!(loaded.output_name, DEFAULT_OUTPUT_NAME);

    let watermark = loaded.watermark.unwrap();
    assert_eq!(watermark.text, "COPIE");
    assert_eq!(watermark.color_hex, DEFAULT_WATERMARK_COLOR);
    assert_eq!(watermark.opacity, DEFAULT_WATERMARK_OPACITY);
}

#[tokio::test]
async fn test_load_invalid_json() {
    use tempfile::NamedTempFile;

    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), "not json").unwrap();

    let result = ExportOptions::load(temp.path()).await;
    assert!(matches!(result, Err(AssembleError::Config(_))));
}
