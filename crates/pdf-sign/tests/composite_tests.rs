use lopdf::{Dictionary, Document, Object, Stream};
use pdf_sign::*;

/// Helper to create a test PDF with N pages
fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    // Create pages array
    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"1 0 0 1 50 50 cm".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // Page size and resources live on the tree root and are inherited
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
        (
            "Resources",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "Font",
                Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
            )])),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn pdf_bytes(num_pages: usize) -> Vec<u8> {
    let mut doc = create_test_pdf(num_pages);
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn png_data_uri() -> String {
    let img = image::RgbaImage::from_fn(8, 4, |x, _| {
        if x % 2 == 0 {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    payload::encode_data_uri("image/png", &out.into_inner())
}

fn jpeg_data_uri() -> String {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([20, 20, 20]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
    payload::encode_data_uri("image/jpeg", &out.into_inner())
}

fn signature(data: String, rect: NormalizedRect, page_number: u32) -> Signature {
    SignatureDraft::new(SignatureKind::Drawn, data, rect, page_number).into_signature()
}

/// Image XObject names registered on a page of the output
fn xobject_names(doc: &Document, page_number: u32) -> Vec<String> {
    let page_id = doc.get_pages()[&page_number];
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = match page.get(b"Resources") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).unwrap(),
        Ok(Object::Dictionary(dict)) => dict,
        _ => return Vec::new(),
    };
    match resources.get(b"XObject") {
        Ok(Object::Dictionary(xobjects)) => xobjects
            .iter()
            .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}

#[test]
fn test_places_signature_on_target_page() {
    let sig = signature(png_data_uri(), NormalizedRect::new(0.5, 0.5, 0.2, 0.1), 2);
    let (bytes, report) = sign_pdf_bytes(&pdf_bytes(3), &[sig.clone()]).unwrap();

    assert_eq!(report.placed, vec![sig.id]);
    assert!(report.is_complete());

    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
    assert!(xobject_names(&doc, 1).is_empty());
    assert_eq!(xobject_names(&doc, 2).len(), 1);

    let content = String::from_utf8_lossy(&doc.get_page_content(doc.get_pages()[&2]).unwrap()).into_owned();
    assert!(content.contains("q 122.400 0 0 79.200 306.000 316.800 cm /Sig1 Do Q"));
}

#[test]
fn test_existing_content_is_isolated() {
    let sig = signature(png_data_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.1), 1);
    let (bytes, _) = sign_pdf_bytes(&pdf_bytes(1), &[sig]).unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    let content = doc.get_page_content(doc.get_pages()[&1]).unwrap();
    let content = String::from_utf8_lossy(&content);

    let original = content.find("1 0 0 1 50 50 cm").unwrap();
    let restore = content[original..].find('Q').unwrap() + original;
    let draw = content.find("/Sig1 Do").unwrap();
    assert!(content.trim_start().starts_with('q'));
    assert!(restore < draw);
}

#[test]
fn test_inherited_resources_are_kept() {
    let sig = signature(png_data_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.1), 1);
    let (bytes, _) = sign_pdf_bytes(&pdf_bytes(1), &[sig]).unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    let page = doc.get_dictionary(doc.get_pages()[&1]).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    assert!(resources.get(b"Font").is_ok());
    assert!(resources.get(b"XObject").is_ok());
}

#[test]
fn test_page_overflow_is_skipped() {
    let kept = signature(png_data_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.1), 1);
    let overflow = signature(png_data_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.1), 5);

    let (bytes, report) = sign_pdf_bytes(&pdf_bytes(3), &[overflow.clone(), kept.clone()]).unwrap();

    assert_eq!(report.placed, vec![kept.id]);
    assert_eq!(
        report.skipped,
        vec![SkippedSignature {
            id: overflow.id,
            reason: SkipReason::PageOutOfRange {
                page_number: 5,
                page_count: 3,
            },
        }]
    );
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[test]
fn test_degenerate_rect_is_skipped() {
    let flat = signature(png_data_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.0), 1);
    let kept = signature(png_data_uri(), NormalizedRect::new(0.3, 0.3, 0.2, 0.1), 1);

    let (_, report) = sign_pdf_bytes(&pdf_bytes(1), &[flat.clone(), kept.clone()]).unwrap();

    assert_eq!(report.placed, vec![kept.id]);
    assert_eq!(report.skipped[0].id, flat.id);
    assert_eq!(report.skipped[0].reason, SkipReason::DegenerateRect);
}

#[test]
fn test_corrupt_image_fails_export() {
    let good = signature(png_data_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.1), 1);
    let corrupt = signature(
        payload::encode_data_uri("image/png", b"definitely not a png"),
        NormalizedRect::new(0.3, 0.3, 0.2, 0.1),
        1,
    );

    match sign_pdf_bytes(&pdf_bytes(1), &[good, corrupt.clone()]) {
        Err(SignError::Decode { id, .. }) => assert_eq!(id, corrupt.id),
        other => panic!("expected decode failure, got {:?}", other.map(|(_, report)| report)),
    }
}

#[test]
fn test_jpeg_passes_through() {
    let sig = signature(jpeg_data_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.1), 1);
    let (bytes, report) = sign_pdf_bytes(&pdf_bytes(1), &[sig]).unwrap();
    assert_eq!(report.placed.len(), 1);

    let doc = Document::load_mem(&bytes).unwrap();
    let has_dct = doc.objects.values().any(|obj| match obj {
        Object::Stream(stream) => stream
            .dict
            .get(b"Filter")
            .and_then(|f| f.as_name())
            .map(|name| name == b"DCTDecode")
            .unwrap_or(false),
        _ => false,
    });
    assert!(has_dct);
}

#[test]
fn test_each_signature_gets_unique_name() {
    let sigs: Vec<Signature> = (0..3)
        .map(|i| signature(png_data_uri(), NormalizedRect::new(0.1 * i as f32, 0.1, 0.2, 0.1), 1))
        .collect();
    let (bytes, report) = sign_pdf_bytes(&pdf_bytes(1), &sigs).unwrap();
    assert_eq!(report.placed.len(), 3);

    let doc = Document::load_mem(&bytes).unwrap();
    let mut names = xobject_names(&doc, 1);
    names.sort();
    assert_eq!(names, vec!["Sig1", "Sig2", "Sig3"]);
}

#[test]
fn test_document_without_pages() {
    let mut doc = create_test_pdf(0);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    let sig = signature(png_data_uri(), NormalizedRect::new(0.1, 0.1, 0.2, 0.1), 1);
    assert!(matches!(sign_pdf_bytes(&bytes, &[sig]), Err(SignError::NoPages)));
}

#[tokio::test]
async fn test_export_writes_signed_copy() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("contract.pdf");
    tokio::fs::write(&input, pdf_bytes(2)).await.unwrap();

    let document = load_document(&input, &Limits::default()).await.unwrap();
    let sig = signature(png_data_uri(), NormalizedRect::new(0.4, 0.4, 0.2, 0.1), 2);
    let signed = export_signed_pdf(&document, &[sig]).await.unwrap();
    assert_eq!(signed.file_name, "signed_contract.pdf");

    let output = dir.path().join(&signed.file_name);
    save_pdf_bytes(&signed.bytes, &output).await.unwrap();
    let reloaded = load_document(&output, &Limits::default()).await.unwrap();
    assert_eq!(reloaded.page_count(), 2);
}

#[tokio::test]
async fn test_failed_export_produces_nothing() {
    let document = load_document_bytes("a.pdf", pdf_bytes(1), &Limits::default())
        .await
        .unwrap();
    let corrupt = signature(
        "data:image/png;base64,@@@@".to_string(),
        NormalizedRect::new(0.1, 0.1, 0.2, 0.1),
        1,
    );
    assert!(export_signed_pdf(&document, &[corrupt]).await.is_err());
}
