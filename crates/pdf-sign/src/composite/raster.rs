//! Signature payload decoding into PDF image data

use crate::payload::{PayloadFormat, parse_data_uri};
use crate::signature::Signature;
use crate::types::*;
use image::GenericImageView;
use std::io::Write;

/// Raster ready to become an image XObject
#[derive(Debug, Clone)]
pub struct PdfImage {
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    pub bits_per_component: u8,
    pub filter: &'static str,
    pub data: Vec<u8>,
    /// Flate-compressed 8-bit alpha channel, when any pixel is not opaque
    pub alpha: Option<Vec<u8>>,
}

/// A payload after decoding, before it is turned into PDF image data
enum Decoded {
    /// Baseline JPEG whose DCT stream can be embedded unchanged
    Jpeg {
        width: u32,
        height: u32,
        color_space: &'static str,
    },
    Raster(image::DynamicImage),
}

/// Decode a signature's payload.
///
/// The declared MIME type picks the decoder. When that fails the bytes are
/// retried as PNG; a second failure is a decode error for the signature.
pub fn decode_signature_image(signature: &Signature) -> Result<PdfImage> {
    let payload = parse_data_uri(&signature.data).ok_or_else(|| SignError::Decode {
        id: signature.id,
        reason: "malformed data URI".to_string(),
    })?;

    let declared = payload.format();
    let decoded = match decode_as(&payload.bytes, declared) {
        Ok(decoded) => decoded,
        Err(first) => {
            log::debug!(
                "Signature {} did not decode as {:?} ({}), retrying as PNG",
                signature.id,
                declared,
                first
            );
            decode_as(&payload.bytes, PayloadFormat::Png).map_err(|e| SignError::Decode {
                id: signature.id,
                reason: e.to_string(),
            })?
        }
    };

    match decoded {
        Decoded::Jpeg {
            width,
            height,
            color_space,
        } => Ok(PdfImage {
            width,
            height,
            color_space,
            bits_per_component: 8,
            filter: "DCTDecode",
            data: payload.bytes,
            alpha: None,
        }),
        Decoded::Raster(image) => Ok(flate_image(&image)?),
    }
}

fn decode_as(data: &[u8], format: PayloadFormat) -> std::result::Result<Decoded, image::ImageError> {
    let decoded = image::load_from_memory_with_format(data, format.image_format())?;
    if format == PayloadFormat::Jpeg {
        if let Some(color_space) = jpeg_color_space(data) {
            let (width, height) = decoded.dimensions();
            return Ok(Decoded::Jpeg {
                width,
                height,
                color_space,
            });
        }
        log::debug!("JPEG is not gray or RGB, re-encoding as Flate");
    }
    Ok(Decoded::Raster(decoded))
}

/// Colour space for embedding a JPEG unchanged, from its frame header.
///
/// Only 1- and 3-component frames map onto a device colour space; CMYK and
/// YCCK frames (4 components) return `None`.
fn jpeg_color_space(data: &[u8]) -> Option<&'static str> {
    match jpeg_components(data)? {
        1 => Some("DeviceGray"),
        3 => Some("DeviceRGB"),
        _ => None,
    }
}

/// Number of components in the first SOF segment of a JPEG stream
fn jpeg_components(data: &[u8]) -> Option<u8> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    loop {
        while *data.get(pos)? != 0xFF {
            pos += 1;
        }
        while *data.get(pos)? == 0xFF {
            pos += 1;
        }
        let marker = *data.get(pos)?;
        pos += 1;
        match marker {
            // Markers without a length field
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return None,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                // length(2) precision(1) height(2) width(2) components(1)
                return data.get(pos + 7).copied();
            }
            _ => {
                let length = u16::from_be_bytes([*data.get(pos)?, *data.get(pos + 1)?]) as usize;
                pos += length;
            }
        }
    }
}

/// Split into Flate-compressed RGB plus a soft mask when any pixel is translucent
fn flate_image(image: &image::DynamicImage) -> std::io::Result<PdfImage> {
    let (width, height) = image.dimensions();
    let rgba = image.to_rgba8();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    let mut has_alpha = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        if a != 255 {
            has_alpha = true;
        }
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let alpha = if has_alpha { Some(flate_compress(&alpha)?) } else { None };
    Ok(PdfImage {
        width,
        height,
        color_space: "DeviceRGB",
        bits_per_component: 8,
        filter: "FlateDecode",
        data: flate_compress(&rgb)?,
        alpha,
    })
}

fn flate_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NormalizedRect;
    use crate::payload::encode_data_uri;
    use crate::types::SignatureKind;

    fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, alpha]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn signature_with(data: String) -> Signature {
        Signature {
            id: SignatureId::new(),
            kind: SignatureKind::Uploaded,
            data,
            rect: NormalizedRect::new(0.1, 0.1, 0.2, 0.1),
            page_number: 1,
        }
    }

    #[test]
    fn test_png_with_transparency_gets_alpha() {
        let sig = signature_with(encode_data_uri("image/png", &png_bytes(4, 2, 128)));
        let image = decode_signature_image(&sig).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.filter, "FlateDecode");
        assert!(image.alpha.is_some());
    }

    #[test]
    fn test_opaque_png_has_no_alpha() {
        let sig = signature_with(encode_data_uri("image/png", &png_bytes(3, 3, 255)));
        assert!(decode_signature_image(&sig).unwrap().alpha.is_none());
    }

    #[test]
    fn test_mislabelled_png_falls_back() {
        let sig = signature_with(encode_data_uri("image/jpeg", &png_bytes(2, 2, 255)));
        let image = decode_signature_image(&sig).unwrap();
        assert_eq!(image.filter, "FlateDecode");
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    /// SOI, an APP0 segment, then a baseline frame header with `components` components
    fn jpeg_header(components: u8) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46];
        let length = 8 + 3 * components as u16;
        bytes.extend_from_slice(&[0xFF, 0xC0]);
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(&[8, 0x00, 0x10, 0x00, 0x10, components]);
        for id in 1..=components {
            bytes.extend_from_slice(&[id, 0x11, 0x00]);
        }
        bytes
    }

    #[test]
    fn test_frame_header_components() {
        assert_eq!(jpeg_components(&jpeg_bytes()), Some(3));
        assert_eq!(jpeg_components(&jpeg_header(1)), Some(1));
        assert_eq!(jpeg_components(&jpeg_header(4)), Some(4));
        assert_eq!(jpeg_components(&[0x89, b'P', b'N', b'G']), None);
        assert_eq!(jpeg_components(&[0xFF, 0xD8, 0xFF, 0xC0, 0x00]), None);
    }

    #[test]
    fn test_cmyk_jpeg_is_not_embedded_as_rgb() {
        assert_eq!(jpeg_color_space(&jpeg_header(1)), Some("DeviceGray"));
        assert_eq!(jpeg_color_space(&jpeg_header(3)), Some("DeviceRGB"));
        assert_eq!(jpeg_color_space(&jpeg_header(4)), None);
    }

    #[test]
    fn test_rgb_jpeg_passes_through() {
        let bytes = jpeg_bytes();
        let sig = signature_with(encode_data_uri("image/jpeg", &bytes));
        let image = decode_signature_image(&sig).unwrap();
        assert_eq!(image.filter, "DCTDecode");
        assert_eq!(image.color_space, "DeviceRGB");
        assert_eq!(image.data, bytes);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let sig = signature_with(encode_data_uri("image/png", b"not an image"));
        let id = sig.id;
        match decode_signature_image(&sig) {
            Err(SignError::Decode { id: failed, .. }) => assert_eq!(failed, id),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
