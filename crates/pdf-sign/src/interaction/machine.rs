//! Per-overlay pointer state machine
//!
//! Each placed signature has one [`OverlayMachine`]. The host forwards
//! pointer events to it and applies the returned [`OverlayEvent`]s to the
//! signature list. The machine never mutates signatures itself.

use super::edge::{CursorIcon, ResizeEdge, detect_edge};
use super::resize::apply_resize;
use super::transfer::apply_drag;
use crate::geometry::{NormalizedRect, PixelRect, PointerPos, pixel_delta_to_normalized};
use crate::options::InteractionConfig;

/// Whether overlays can be edited or only inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Interactions require the overlay to be selected first
    #[default]
    Edit,
    /// Interactions are live whenever the pointer is over the overlay
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Idle,
    HoveredNoEdge,
    HoveredOnEdge(ResizeEdge),
    Dragging,
    Resizing(ResizeEdge),
}

impl OverlayState {
    pub fn is_active(&self) -> bool {
        matches!(self, OverlayState::Dragging | OverlayState::Resizing(_))
    }
}

/// Something the host must apply after forwarding an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayEvent {
    /// The overlay asks to become the selected signature
    Selected,
    /// Start routing global pointer move/up events to this overlay
    CaptureStarted,
    /// Stop routing global pointer events to this overlay
    CaptureReleased,
    /// The signature moved to another page; always precedes the matching `RectChanged`
    PageChanged(u32),
    RectChanged(NormalizedRect),
}

/// Page the overlay currently sits on, as the host sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageContext {
    pub page_number: u32,
    pub total_pages: u32,
    pub rendered_width_px: f32,
}

/// Pointer position and rectangle captured when a drag or resize begins
#[derive(Debug, Clone, Copy, PartialEq)]
struct Baseline {
    pointer: PointerPos,
    initial: NormalizedRect,
}

#[derive(Debug, Clone)]
pub struct OverlayMachine {
    mode: InteractionMode,
    config: InteractionConfig,
    state: OverlayState,
    hovered: bool,
    baseline: Option<Baseline>,
    capturing: bool,
}

impl OverlayMachine {
    pub fn new(mode: InteractionMode, config: InteractionConfig) -> Self {
        Self {
            mode,
            config,
            state: OverlayState::Idle,
            hovered: false,
            baseline: None,
            capturing: false,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
        if self.state == OverlayState::Idle {
            self.state = OverlayState::HoveredNoEdge;
        }
    }

    /// Leaving the overlay does not end a drag; capture keeps it alive.
    pub fn pointer_leave(&mut self) {
        self.hovered = false;
        if !self.state.is_active() {
            self.state = OverlayState::Idle;
        }
    }

    /// Pointer moved over the overlay without a button held.
    ///
    /// Returns the cursor the host should display.
    pub fn hover(&mut self, pointer: PointerPos, bounds: &PixelRect, selected: bool) -> CursorIcon {
        if self.state.is_active() {
            return CursorIcon::Grabbing;
        }
        self.hovered = true;

        let edge_detection = match self.mode {
            InteractionMode::Edit => selected,
            InteractionMode::Preview => true,
        };
        let edge = if edge_detection {
            detect_edge(pointer, bounds, self.config.edge_threshold_px)
        } else {
            None
        };

        match edge {
            Some(edge) => {
                self.state = OverlayState::HoveredOnEdge(edge);
                edge.cursor()
            }
            None => {
                self.state = OverlayState::HoveredNoEdge;
                CursorIcon::Grab
            }
        }
    }

    /// Primary button pressed on the overlay.
    ///
    /// `rect` is the signature's rectangle at this instant and becomes the
    /// baseline for the whole interaction.
    pub fn pointer_down(&mut self, pointer: PointerPos, rect: NormalizedRect, selected: bool) -> Vec<OverlayEvent> {
        let mut events = Vec::new();
        if self.state.is_active() {
            return events;
        }

        match self.mode {
            InteractionMode::Edit if !selected => {
                // First press only selects
                events.push(OverlayEvent::Selected);
                return events;
            }
            InteractionMode::Edit => {}
            InteractionMode::Preview => {
                if !self.hovered {
                    return events;
                }
                if !selected {
                    events.push(OverlayEvent::Selected);
                }
            }
        }

        self.state = match self.state {
            OverlayState::HoveredOnEdge(edge) => OverlayState::Resizing(edge),
            _ => OverlayState::Dragging,
        };
        self.baseline = Some(Baseline { pointer, initial: rect });
        self.capturing = true;
        events.push(OverlayEvent::CaptureStarted);
        events
    }

    /// Global pointer move while this overlay holds capture.
    pub fn pointer_move(&mut self, pointer: PointerPos, page: &PageContext) -> Vec<OverlayEvent> {
        let mut events = Vec::new();
        let Some(baseline) = self.baseline else {
            return events;
        };

        let (dx_px, dy_px) = pointer.delta_from(baseline.pointer);
        let delta = pixel_delta_to_normalized(dx_px, dy_px, page.rendered_width_px);

        match self.state {
            OverlayState::Dragging => {
                let outcome = apply_drag(baseline.initial, delta, page.page_number, page.total_pages);
                if outcome.changed_page(page.page_number) {
                    events.push(OverlayEvent::PageChanged(outcome.page_number));
                    // Later deltas are measured on the new page
                    self.baseline = Some(Baseline {
                        pointer,
                        initial: outcome.rect,
                    });
                }
                events.push(OverlayEvent::RectChanged(outcome.rect));
            }
            OverlayState::Resizing(edge) => {
                let rect = apply_resize(baseline.initial, edge, delta, self.config.min_size);
                events.push(OverlayEvent::RectChanged(rect));
            }
            _ => {}
        }
        events
    }

    /// Primary button released anywhere.
    pub fn pointer_up(&mut self) -> Vec<OverlayEvent> {
        if !self.state.is_active() {
            return Vec::new();
        }
        self.state = if self.hovered {
            OverlayState::HoveredNoEdge
        } else {
            OverlayState::Idle
        };
        self.release()
    }

    /// The overlay is going away; drop any interaction in progress.
    pub fn cancel(&mut self) -> Vec<OverlayEvent> {
        self.state = OverlayState::Idle;
        self.hovered = false;
        self.release()
    }

    fn release(&mut self) -> Vec<OverlayEvent> {
        self.baseline = None;
        if self.capturing {
            self.capturing = false;
            vec![OverlayEvent::CaptureReleased]
        } else {
            Vec::new()
        }
    }
}
