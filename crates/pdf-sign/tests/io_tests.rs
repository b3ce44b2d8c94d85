use lopdf::{Dictionary, Document, Object};
use pdf_sign::*;
use tempfile::TempDir;

/// Helper to create a test PDF with the given page sizes
fn create_test_pdf(page_sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids = page_sizes
        .iter()
        .map(|&(width, height)| {
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(width),
                        Object::Integer(height),
                    ]),
                ),
            ]));
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(page_sizes.len() as i64)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

async fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, bytes).await.unwrap();
    path
}

#[tokio::test]
async fn test_load_reads_page_sizes() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "mixed.pdf", &create_test_pdf(&[(612, 792), (842, 595)])).await;

    let document = load_document(&path, &Limits::default()).await.unwrap();
    assert_eq!(document.name, "mixed.pdf");
    assert_eq!(document.page_count(), 2);
    assert_eq!(document.page_size(1), Some(PageSize::new(612.0, 792.0)));
    assert_eq!(document.page_size(2), Some(PageSize::new(842.0, 595.0)));
    assert_eq!(document.page_size(3), None);
    assert!(document.display_uri.starts_with("data:application/pdf;base64,"));
}

#[tokio::test]
async fn test_load_rejects_oversized_file() {
    let dir = TempDir::new().unwrap();
    let bytes = create_test_pdf(&[(612, 792)]);
    let path = write_file(&dir, "big.pdf", &bytes).await;

    let limits = Limits {
        max_document_bytes: 16,
        ..Limits::default()
    };
    match load_document(&path, &limits).await {
        Err(SignError::DocumentTooLarge { size, limit }) => {
            assert_eq!(size, bytes.len() as u64);
            assert_eq!(limit, 16);
        }
        other => panic!("expected size error, got {:?}", other.map(|d| d.name)),
    }
}

#[tokio::test]
async fn test_load_rejects_non_pdf() {
    let result = load_document_bytes("notes.txt", b"just some text".to_vec(), &Limits::default()).await;
    assert!(matches!(result, Err(SignError::InvalidDocument(_))));
}

#[tokio::test]
async fn test_load_rejects_corrupt_pdf() {
    let result = load_document_bytes("broken.pdf", b"%PDF-1.7\ngarbage".to_vec(), &Limits::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_rejects_document_without_pages() {
    let result = load_document_bytes("empty.pdf", create_test_pdf(&[]), &Limits::default()).await;
    assert!(matches!(result, Err(SignError::NoPages)));
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = load_document(dir.path().join("absent.pdf"), &Limits::default()).await;
    assert!(matches!(result, Err(SignError::Io(_))));
}

#[test]
fn test_output_naming() {
    assert_eq!(signed_output_path("/tmp/docs/lease.pdf"), std::path::PathBuf::from("/tmp/docs/signed_lease.pdf"));
    assert_eq!(io::signed_file_name(""), "signed_document.pdf");
}

#[tokio::test]
async fn test_options_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.json");

    let mut options = SignOptions::default();
    options.interaction.edge_threshold_px = 12.0;
    options.limits.max_image_bytes = 1024;
    options.save(&path).await.unwrap();

    let loaded = SignOptions::load(&path).await.unwrap();
    assert_eq!(loaded, options);
}

#[tokio::test]
async fn test_options_fill_missing_fields() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "partial.json", br#"{ "interaction": { "min_size": 0.1 } }"#).await;

    let loaded = SignOptions::load(&path).await.unwrap();
    assert_eq!(loaded.interaction.min_size, 0.1);
    assert_eq!(loaded.interaction.edge_threshold_px, InteractionConfig::default().edge_threshold_px);
    assert_eq!(loaded.limits, Limits::default());
}

#[tokio::test]
async fn test_invalid_options_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.json", br#"{ "interaction": { "min_size": 2.0 } }"#).await;
    assert!(matches!(SignOptions::load(&path).await, Err(SignError::Config(_))));

    let path = write_file(&dir, "junk.json", b"not json").await;
    assert!(matches!(SignOptions::load(&path).await, Err(SignError::Config(_))));
}

#[tokio::test]
async fn test_drawn_signature_survives_export() {
    let document = load_document_bytes("form.pdf", create_test_pdf(&[(612, 792)]), &Limits::default())
        .await
        .unwrap();

    let mut pad = creation::SignaturePad::default();
    pad.begin_stroke(20.0, 100.0);
    pad.line_to(120.0, 40.0);
    pad.line_to(220.0, 110.0);
    let data = pad.to_png_data_uri().unwrap();

    let mut state = AppState::new(InteractionConfig::default());
    let ticket = state.begin_load();
    assert!(state.document_loaded(ticket, document));
    let id = state
        .finalize_signature(
            SignatureKind::Drawn,
            data,
            Some(PagePoint {
                page_number: 1,
                x: 0.5,
                y: 0.8,
            }),
        )
        .unwrap()
        .unwrap();
    assert!(state.proceed_to_preview());

    let document = state.document().unwrap();
    let signed = export_signed_pdf(document, state.signatures().as_slice()).await.unwrap();
    assert_eq!(signed.report.placed, vec![id]);

    let doc = Document::load_mem(&signed.bytes).unwrap();
    let has_smask = doc.objects.values().any(|obj| match obj {
        Object::Stream(stream) => stream.dict.get(b"SMask").is_ok(),
        _ => false,
    });
    assert!(has_smask);
}
