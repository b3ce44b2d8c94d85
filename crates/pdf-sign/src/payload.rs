//! `data:` URI handling for signature images

use base64::Engine;

/// Raster format a signature payload claims to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Png,
    Jpeg,
}

impl PayloadFormat {
    /// Classify by MIME type; anything unrecognized is treated as PNG
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("jpeg") || mime.contains("jpg") {
            PayloadFormat::Jpeg
        } else {
            PayloadFormat::Png
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            PayloadFormat::Png => image::ImageFormat::Png,
            PayloadFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            PayloadFormat::Png => "image/png",
            PayloadFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Decoded contents of a `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn format(&self) -> PayloadFormat {
        PayloadFormat::from_mime(&self.mime)
    }
}

/// Split a `data:` URI into MIME type and raw bytes.
///
/// Returns `None` for anything that is not a well-formed data URI.
pub fn parse_data_uri(uri: &str) -> Option<ImagePayload> {
    let rest = uri.strip_prefix("data:")?;
    let (header, data_part) = rest.split_once(',')?;

    let mime = header
        .split(';')
        .next()
        .filter(|mime| !mime.is_empty())
        .unwrap_or("application/octet-stream")
        .to_string();

    let bytes = if header.split(';').any(|param| param == "base64") {
        base64::engine::general_purpose::STANDARD
            .decode(data_part.trim())
            .ok()?
    } else {
        data_part.as_bytes().to_vec()
    };

    Some(ImagePayload { mime, bytes })
}

/// Encode bytes as a base64 `data:` URI
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let uri = encode_data_uri("image/png", &[1, 2, 3, 4]);
        assert!(uri.starts_with("data:image/png;base64,"));
        let payload = parse_data_uri(&uri).unwrap();
        assert_eq!(payload.mime, "image/png");
        assert_eq!(payload.bytes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_data_uri("image/png;base64,AAAA").is_none());
        assert!(parse_data_uri("data:image/png;base64").is_none());
        assert!(parse_data_uri("data:image/png;base64,!!!").is_none());
    }

    #[test]
    fn test_format_classification() {
        assert_eq!(PayloadFormat::from_mime("image/png"), PayloadFormat::Png);
        assert_eq!(PayloadFormat::from_mime("image/jpeg"), PayloadFormat::Jpeg);
        assert_eq!(PayloadFormat::from_mime("image/JPG"), PayloadFormat::Jpeg);
        assert_eq!(PayloadFormat::from_mime("image/webp"), PayloadFormat::Png);
    }
}
