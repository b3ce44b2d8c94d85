//! Turning user input into signature image payloads

use crate::constants::*;
use crate::options::Limits;
use crate::payload::{PayloadFormat, encode_data_uri, parse_data_uri};
use crate::types::*;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Freehand strokes captured on a signature pad
#[derive(Debug, Clone, PartialEq)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    stroke_width: f32,
    strokes: Vec<Vec<(f32, f32)>>,
}

impl Default for SignaturePad {
    fn default() -> Self {
        let (width, height) = SIGNATURE_PAD_SIZE;
        Self::new(width, height)
    }
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            stroke_width: SIGNATURE_STROKE_WIDTH,
            strokes: Vec::new(),
        }
    }

    pub fn with_stroke_width(mut self, stroke_width: f32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        self.strokes.push(vec![(x, y)]);
    }

    /// Extend the current stroke; starts one if none is open
    pub fn line_to(&mut self, x: f32, y: f32) {
        match self.strokes.last_mut() {
            Some(stroke) => stroke.push((x, y)),
            None => self.begin_stroke(x, y),
        }
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Rasterize the strokes to a transparent PNG `data:` URI.
    ///
    /// Fails when nothing visible was drawn.
    pub fn to_png_data_uri(&self) -> Result<String> {
        let canvas = self.rasterize();
        if !has_visible_pixel(&canvas) {
            return Err(SignError::InvalidSignature("signature pad is empty".to_string()));
        }
        let png = encode_png(&canvas)?;
        Ok(encode_data_uri(PayloadFormat::Png.mime(), &png))
    }

    fn rasterize(&self) -> RgbaImage {
        let mut canvas = RgbaImage::new(self.width, self.height);
        let radius = (self.stroke_width / 2.0).max(0.5);
        let lo = (-radius, -radius);
        let hi = (self.width as f32 + radius, self.height as f32 + radius);

        for stroke in &self.strokes {
            let Some(&first) = stroke.first() else {
                continue;
            };
            stamp(&mut canvas, first, radius);
            for pair in stroke.windows(2) {
                let Some((start, end)) = clip_segment(pair[0], pair[1], lo, hi) else {
                    continue;
                };
                stamp(&mut canvas, start, radius);
                let length = ((end.0 - start.0).powi(2) + (end.1 - start.1).powi(2)).sqrt();
                let steps = (length / 0.5).ceil().max(1.0) as u32;
                for step in 1..=steps {
                    let t = step as f32 / steps as f32;
                    let point = (start.0 + (end.0 - start.0) * t, start.1 + (end.1 - start.1) * t);
                    stamp(&mut canvas, point, radius);
                }
            }
        }
        canvas
    }
}

/// Clip the segment `start..end` to the box `lo..hi` (Liang-Barsky).
///
/// Returns `None` when no part of it lies inside or a coordinate is not finite.
fn clip_segment(start: (f32, f32), end: (f32, f32), lo: (f32, f32), hi: (f32, f32)) -> Option<((f32, f32), (f32, f32))> {
    if ![start.0, start.1, end.0, end.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [
        (-dx, start.0 - lo.0),
        (dx, hi.0 - start.0),
        (-dy, start.1 - lo.1),
        (dy, hi.1 - start.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        (start.0 + t0 * dx, start.1 + t0 * dy),
        (start.0 + t1 * dx, start.1 + t1 * dy),
    ))
}

/// Paint an opaque black disc centred on `center`
fn stamp(canvas: &mut RgbaImage, center: (f32, f32), radius: f32) {
    let (width, height) = canvas.dimensions();
    let min_x = (center.0 - radius).floor().max(0.0) as u32;
    let min_y = (center.1 - radius).floor().max(0.0) as u32;
    let max_x = ((center.0 + radius).ceil().max(0.0) as u32).min(width);
    let max_y = ((center.1 + radius).ceil().max(0.0) as u32).min(height);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let dx = x as f32 + 0.5 - center.0;
            let dy = y as f32 + 0.5 - center.1;
            if dx * dx + dy * dy <= radius * radius {
                canvas.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
    }
}

fn has_visible_pixel(canvas: &RgbaImage) -> bool {
    canvas.pixels().any(|pixel| pixel.0[3] != 0)
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    canvas
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| SignError::Render(format!("Failed to encode signature: {}", e)))?;
    Ok(out.into_inner())
}

/// Accept an uploaded image file as a signature payload
pub fn uploaded_image(mime: &str, bytes: &[u8], limits: &Limits) -> Result<String> {
    if !mime.starts_with("image/") {
        return Err(SignError::InvalidSignature(format!("{} is not an image type", mime)));
    }
    let size = bytes.len() as u64;
    if size > limits.max_image_bytes {
        return Err(SignError::ImageTooLarge {
            size,
            limit: limits.max_image_bytes,
        });
    }
    image::load_from_memory(bytes)
        .map_err(|e| SignError::InvalidSignature(format!("unreadable image: {}", e)))?;
    Ok(encode_data_uri(mime, bytes))
}

/// Accept a typed signature.
///
/// The text is rendered to an image by the host; this checks both pieces.
pub fn typed_signature(text: &str, rendered: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(SignError::InvalidSignature("typed signature is empty".to_string()));
    }
    let payload = parse_data_uri(rendered)
        .filter(|payload| payload.mime.eq_ignore_ascii_case(PayloadFormat::Png.mime()))
        .filter(|payload| !payload.bytes.is_empty())
        .ok_or_else(|| SignError::InvalidSignature("typed signature was not rendered to a PNG".to_string()))?;
    Ok(encode_data_uri(&payload.mime, &payload.bytes))
}
