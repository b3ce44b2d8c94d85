use crate::geometry::{PixelRect, PointerPos};

/// A resize handle on an overlay: one of four sides or four corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeEdge {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    pub const ALL: [ResizeEdge; 8] = [
        ResizeEdge::TopLeft,
        ResizeEdge::TopRight,
        ResizeEdge::BottomLeft,
        ResizeEdge::BottomRight,
        ResizeEdge::Top,
        ResizeEdge::Bottom,
        ResizeEdge::Left,
        ResizeEdge::Right,
    ];

    pub fn moves_left(self) -> bool {
        matches!(self, ResizeEdge::Left | ResizeEdge::TopLeft | ResizeEdge::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeEdge::Right | ResizeEdge::TopRight | ResizeEdge::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, ResizeEdge::Top | ResizeEdge::TopLeft | ResizeEdge::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeEdge::Bottom | ResizeEdge::BottomLeft | ResizeEdge::BottomRight)
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeEdge::TopLeft | ResizeEdge::TopRight | ResizeEdge::BottomLeft | ResizeEdge::BottomRight
        )
    }

    pub fn cursor(self) -> CursorIcon {
        match self {
            ResizeEdge::TopLeft => CursorIcon::ResizeNorthWest,
            ResizeEdge::TopRight => CursorIcon::ResizeNorthEast,
            ResizeEdge::BottomLeft => CursorIcon::ResizeSouthWest,
            ResizeEdge::BottomRight => CursorIcon::ResizeSouthEast,
            ResizeEdge::Top => CursorIcon::ResizeNorth,
            ResizeEdge::Bottom => CursorIcon::ResizeSouth,
            ResizeEdge::Left => CursorIcon::ResizeWest,
            ResizeEdge::Right => CursorIcon::ResizeEast,
        }
    }
}

/// Cursor the host should show over an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIcon {
    #[default]
    Default,
    Grab,
    Grabbing,
    ResizeNorth,
    ResizeSouth,
    ResizeWest,
    ResizeEast,
    ResizeNorthWest,
    ResizeNorthEast,
    ResizeSouthWest,
    ResizeSouthEast,
}

/// Find the resize handle under the pointer, if any.
///
/// A side is "near" when the pointer is within `threshold_px` of it. When
/// several sides are near, corners win over single sides and the order in
/// [`ResizeEdge::ALL`] breaks remaining ties.
pub fn detect_edge(pointer: PointerPos, bounds: &PixelRect, threshold_px: f32) -> Option<ResizeEdge> {
    let near_left = (pointer.x - bounds.left).abs() <= threshold_px;
    let near_right = (pointer.x - bounds.right()).abs() <= threshold_px;
    let near_top = (pointer.y - bounds.top).abs() <= threshold_px;
    let near_bottom = (pointer.y - bounds.bottom()).abs() <= threshold_px;

    ResizeEdge::ALL.into_iter().find(|edge| match edge {
        ResizeEdge::TopLeft => near_top && near_left,
        ResizeEdge::TopRight => near_top && near_right,
        ResizeEdge::BottomLeft => near_bottom && near_left,
        ResizeEdge::BottomRight => near_bottom && near_right,
        ResizeEdge::Top => near_top,
        ResizeEdge::Bottom => near_bottom,
        ResizeEdge::Left => near_left,
        ResizeEdge::Right => near_right,
    })
}
