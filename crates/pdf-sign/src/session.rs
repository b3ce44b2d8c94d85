//! Host-facing event entry point
//!
//! [`SigningSession`] owns the application state, one overlay state machine
//! per signature and the on-screen layout of each page. Hosts feed it raw
//! pointer and key events in their own pixel frame.

use std::collections::BTreeMap;

use crate::geometry::{PixelRect, PointerPos, pointer_to_normalized};
use crate::interaction::{CursorIcon, InteractionMode, OverlayEvent, OverlayRegistry, PageContext};
use crate::io::LoadedDocument;
use crate::options::InteractionConfig;
use crate::render::RenderedPage;
use crate::signature::SignatureDraft;
use crate::state::{AppState, KeyCapture, LoadTicket, PagePoint};
use crate::types::*;

/// Where a rendered page sits in the host's pixel frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub origin: PointerPos,
    pub pixel_width: f32,
    pub pixel_height: f32,
}

impl PageLayout {
    pub fn new(origin: PointerPos, rendered: &RenderedPage) -> Self {
        Self {
            origin,
            pixel_width: rendered.width_px(),
            pixel_height: rendered.height_px(),
        }
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(self.origin.x, self.origin.y, self.pixel_width, self.pixel_height)
    }
}

/// Side effects the host must carry out after an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionEffects {
    pub key_capture: Option<KeyCapture>,
    /// Start (`Some(true)`) or stop (`Some(false)`) global pointer capture
    pub pointer_capture: Option<bool>,
}

impl SessionEffects {
    fn absorb(&mut self, events: &[OverlayEvent], key_capture: Option<KeyCapture>) {
        for event in events {
            match event {
                OverlayEvent::CaptureStarted => self.pointer_capture = Some(true),
                OverlayEvent::CaptureReleased => self.pointer_capture = Some(false),
                _ => {}
            }
        }
        if key_capture.is_some() {
            self.key_capture = key_capture;
        }
    }
}

#[derive(Debug)]
pub struct SigningSession {
    state: AppState,
    overlays: OverlayRegistry,
    layouts: BTreeMap<u32, PageLayout>,
}

impl SigningSession {
    pub fn new(mode: InteractionMode, config: InteractionConfig) -> Self {
        Self {
            state: AppState::new(config),
            overlays: OverlayRegistry::new(mode, config),
            layouts: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn overlays(&self) -> &OverlayRegistry {
        &self.overlays
    }

    pub fn mode(&self) -> InteractionMode {
        self.overlays.mode()
    }

    pub fn set_mode(&mut self, mode: InteractionMode) -> SessionEffects {
        let events = self.overlays.set_mode(mode);
        Self::effects_from(events)
    }

    // -------------------------------------------------------------------------
    // Document and pages
    // -------------------------------------------------------------------------

    pub fn begin_load(&mut self) -> LoadTicket {
        self.state.begin_load()
    }

    /// Install a finished load. Layouts from a previous document are dropped.
    pub fn document_loaded(&mut self, ticket: LoadTicket, document: LoadedDocument) -> bool {
        if !self.state.document_loaded(ticket, document) {
            return false;
        }
        self.layouts.clear();
        true
    }

    /// Record where a rendered page is displayed
    pub fn layout_page(&mut self, page_number: u32, origin: PointerPos, rendered: &RenderedPage) {
        self.layouts.insert(page_number, PageLayout::new(origin, rendered));
    }

    pub fn page_layout(&self, page_number: u32) -> Option<&PageLayout> {
        self.layouts.get(&page_number)
    }

    /// On-screen bounds of a signature's overlay
    pub fn overlay_bounds(&self, id: SignatureId) -> Option<PixelRect> {
        let signature = self.state.signatures().get(id)?;
        let layout = self.layouts.get(&signature.page_number)?;
        Some(
            signature
                .rect
                .to_pixels(layout.pixel_width, layout.pixel_height)
                .translate(layout.origin.x, layout.origin.y),
        )
    }

    pub fn reset(&mut self) -> SessionEffects {
        let key_capture = self.state.reset();
        self.layouts.clear();
        let mut effects = self.sync_overlays();
        if key_capture.is_some() {
            effects.key_capture = key_capture;
        }
        effects
    }

    // -------------------------------------------------------------------------
    // Signatures
    // -------------------------------------------------------------------------

    pub fn add_signature(&mut self, draft: SignatureDraft) -> Result<(SignatureId, SessionEffects)> {
        let was_attached = self.state.interaction().key_capture_attached();
        let id = self.state.add_signature(draft)?;
        Ok((id, self.after_insert(was_attached)))
    }

    pub fn remove_signature(&mut self, id: SignatureId) -> SessionEffects {
        let key_capture = self.state.remove_signature(id).and_then(|(_, capture)| capture);
        let mut effects = self.sync_overlays();
        effects.key_capture = key_capture.or(effects.key_capture);
        effects
    }

    pub fn select(&mut self, id: Option<SignatureId>) -> SessionEffects {
        SessionEffects {
            key_capture: self.state.select(id),
            pointer_capture: None,
        }
    }

    /// Finish the creation modal; see [`AppState::finalize_signature`]
    pub fn finalize_signature(
        &mut self,
        kind: SignatureKind,
        data: String,
        position: Option<PagePoint>,
    ) -> Result<(Option<SignatureId>, SessionEffects)> {
        let was_attached = self.state.interaction().key_capture_attached();
        let id = self.state.finalize_signature(kind, data, position)?;
        let effects = if id.is_some() {
            self.after_insert(was_attached)
        } else {
            SessionEffects::default()
        };
        Ok((id, effects))
    }

    /// A click on the page area, used to place an armed signature
    pub fn page_click(&mut self, pointer: PointerPos) -> Result<(Option<SignatureId>, SessionEffects)> {
        if self.mode() != InteractionMode::Edit || !self.state.interaction().is_placing() {
            return Ok((None, SessionEffects::default()));
        }
        let Some((page_number, layout)) = self
            .layouts
            .iter()
            .find(|(_, layout)| layout.bounds().contains(pointer))
            .map(|(page, layout)| (*page, *layout))
        else {
            return Ok((None, SessionEffects::default()));
        };

        let (x, y) = pointer_to_normalized(pointer, &layout.bounds());
        let was_attached = self.state.interaction().key_capture_attached();
        let id = self.state.place_at(PagePoint { page_number, x, y })?;
        let effects = if id.is_some() {
            self.after_insert(was_attached)
        } else {
            SessionEffects::default()
        };
        Ok((id, effects))
    }

    pub fn key_down(&mut self, key: Key) -> (Option<SignatureId>, SessionEffects) {
        let was_attached = self.state.interaction().key_capture_attached();
        let removed = self.state.handle_key(key);
        let mut effects = if removed.is_some() {
            self.sync_overlays()
        } else {
            SessionEffects::default()
        };
        if was_attached && !self.state.interaction().key_capture_attached() {
            effects.key_capture = Some(KeyCapture::Detach);
        }
        (removed, effects)
    }

    // -------------------------------------------------------------------------
    // Pointer events
    // -------------------------------------------------------------------------

    pub fn pointer_enter(&mut self, id: SignatureId) {
        if let Some(machine) = self.overlays.get_mut(id) {
            machine.pointer_enter();
        }
    }

    pub fn pointer_leave(&mut self, id: SignatureId) {
        if let Some(machine) = self.overlays.get_mut(id) {
            machine.pointer_leave();
        }
    }

    /// Pointer moved over an overlay without a button held
    pub fn hover(&mut self, id: SignatureId, pointer: PointerPos) -> CursorIcon {
        let Some(bounds) = self.overlay_bounds(id) else {
            return CursorIcon::Default;
        };
        let selected = self.state.selected() == Some(id);
        match self.overlays.get_mut(id) {
            Some(machine) => machine.hover(pointer, &bounds, selected),
            None => CursorIcon::Default,
        }
    }

    pub fn pointer_down(&mut self, id: SignatureId, pointer: PointerPos) -> SessionEffects {
        let Some(signature) = self.state.signatures().get(id) else {
            return SessionEffects::default();
        };
        let rect = signature.rect;
        let selected = self.state.selected() == Some(id);
        let events = self.overlays.pointer_down(id, pointer, rect, selected);
        self.apply(id, &events)
    }

    /// Global pointer move; only the overlay holding capture reacts
    pub fn pointer_move(&mut self, pointer: PointerPos) -> SessionEffects {
        let Some(owner) = self.overlays.capture_owner() else {
            return SessionEffects::default();
        };
        let Some(page) = self.page_context(owner) else {
            return SessionEffects::default();
        };
        match self.overlays.pointer_move(pointer, &page) {
            Some((id, events)) => self.apply(id, &events),
            None => SessionEffects::default(),
        }
    }

    pub fn pointer_up(&mut self) -> SessionEffects {
        match self.overlays.pointer_up() {
            Some((id, events)) => self.apply(id, &events),
            None => SessionEffects::default(),
        }
    }

    fn page_context(&self, id: SignatureId) -> Option<PageContext> {
        let signature = self.state.signatures().get(id)?;
        let rendered_width_px = self
            .layouts
            .get(&signature.page_number)
            .map(|layout| layout.pixel_width)
            .unwrap_or(self.state.config().render_width_px as f32);
        Some(PageContext {
            page_number: signature.page_number,
            total_pages: self.state.page_count(),
            rendered_width_px,
        })
    }

    fn apply(&mut self, id: SignatureId, events: &[OverlayEvent]) -> SessionEffects {
        let key_capture = self.state.apply_overlay_events(id, events);
        let mut effects = SessionEffects::default();
        effects.absorb(events, key_capture);
        effects
    }

    fn after_insert(&mut self, was_attached: bool) -> SessionEffects {
        let mut effects = self.sync_overlays();
        if !was_attached && self.state.interaction().key_capture_attached() {
            effects.key_capture = Some(KeyCapture::Attach);
        }
        effects
    }

    fn sync_overlays(&mut self) -> SessionEffects {
        let ids: Vec<SignatureId> = self.state.signatures().ids().collect();
        let events = self.overlays.sync(ids);
        Self::effects_from(events)
    }

    fn effects_from(events: Vec<(SignatureId, OverlayEvent)>) -> SessionEffects {
        let mut effects = SessionEffects::default();
        for (_, event) in events {
            effects.absorb(&[event], None);
        }
        effects
    }
}
