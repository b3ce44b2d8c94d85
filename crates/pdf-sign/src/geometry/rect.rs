//! Rectangle and point types shared by the interaction layer and the export pass

/// A rectangle expressed as fractions of the page, origin at the top-left.
///
/// `x`/`width` are fractions of page width and `y`/`height` fractions of page
/// height, so the same value maps to any render scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size whose center sits at `(cx, cy)`
    pub fn centered_at(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn has_positive_size(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// True when the rectangle lies entirely inside the unit page
    pub fn is_within_page(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= 1.0 && self.bottom() <= 1.0
    }

    /// Shift the rectangle so it lies inside the unit page, keeping its size.
    ///
    /// Lower bound wins when the rectangle is larger than the page.
    pub fn clamp_to_page(self) -> Self {
        Self {
            x: (1.0 - self.width).min(self.x).max(0.0),
            y: (1.0 - self.height).min(self.y).max(0.0),
            ..self
        }
    }

    /// Project onto a page image rendered at `pixel_width` × `pixel_height`
    pub fn to_pixels(&self, pixel_width: f32, pixel_height: f32) -> PixelRect {
        PixelRect {
            left: self.x * pixel_width,
            top: self.y * pixel_height,
            width: self.width * pixel_width,
            height: self.height * pixel_height,
        }
    }
}

/// Position of a pointer in the host's pixel frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

impl PointerPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel offset travelled from `origin` to `self`
    pub fn delta_from(&self, origin: PointerPos) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// On-screen bounds of an overlay or page, in pixels, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, pointer: PointerPos) -> bool {
        pointer.x >= self.left
            && pointer.x <= self.right()
            && pointer.y >= self.top
            && pointer.y <= self.bottom()
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..self
        }
    }
}

/// A rectangle in PDF user space: points, origin at the bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PdfRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PdfRect {
    /// Nothing visible would be drawn for this rectangle
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Size of a page in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    pub const fn new(width_pt: f32, height_pt: f32) -> Self {
        Self { width_pt, height_pt }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.width_pt > 0.0 {
            self.height_pt / self.width_pt
        } else {
            0.0
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        let (width_pt, height_pt) = crate::constants::DEFAULT_PAGE_DIMENSIONS;
        Self { width_pt, height_pt }
    }
}
