use std::collections::HashMap;

use super::machine::{InteractionMode, OverlayEvent, OverlayMachine, PageContext};
use crate::geometry::{NormalizedRect, PointerPos};
use crate::options::InteractionConfig;
use crate::types::SignatureId;

/// One state machine per placed signature, with at most one holding
/// pointer capture at a time.
#[derive(Debug, Clone)]
pub struct OverlayRegistry {
    mode: InteractionMode,
    config: InteractionConfig,
    machines: HashMap<SignatureId, OverlayMachine>,
    capture_owner: Option<SignatureId>,
}

impl OverlayRegistry {
    pub fn new(mode: InteractionMode, config: InteractionConfig) -> Self {
        Self {
            mode,
            config,
            machines: HashMap::new(),
            capture_owner: None,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switch every overlay to `mode`, cancelling interactions in progress
    pub fn set_mode(&mut self, mode: InteractionMode) -> Vec<(SignatureId, OverlayEvent)> {
        if mode == self.mode {
            return Vec::new();
        }
        self.mode = mode;
        let events = self.cancel_all();
        for machine in self.machines.values_mut() {
            *machine = OverlayMachine::new(mode, self.config);
        }
        events
    }

    /// Make the set of machines match `ids`.
    ///
    /// Machines for removed signatures are cancelled, so a signature deleted
    /// mid-drag releases its capture here.
    pub fn sync<I>(&mut self, ids: I) -> Vec<(SignatureId, OverlayEvent)>
    where
        I: IntoIterator<Item = SignatureId>,
    {
        let live: Vec<SignatureId> = ids.into_iter().collect();
        let mut events = Vec::new();

        let stale: Vec<SignatureId> = self.machines.keys().filter(|id| !live.contains(id)).copied().collect();
        for id in stale {
            if let Some(mut machine) = self.machines.remove(&id) {
                events.extend(machine.cancel().into_iter().map(|event| (id, event)));
            }
            if self.capture_owner == Some(id) {
                self.capture_owner = None;
            }
        }

        for id in live {
            self.machines
                .entry(id)
                .or_insert_with(|| OverlayMachine::new(self.mode, self.config));
        }
        events
    }

    pub fn get(&self, id: SignatureId) -> Option<&OverlayMachine> {
        self.machines.get(&id)
    }

    pub fn get_mut(&mut self, id: SignatureId) -> Option<&mut OverlayMachine> {
        self.machines.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn capture_owner(&self) -> Option<SignatureId> {
        self.capture_owner
    }

    /// Forward a pointer press; ignored while another overlay holds capture
    pub fn pointer_down(
        &mut self,
        id: SignatureId,
        pointer: PointerPos,
        rect: NormalizedRect,
        selected: bool,
    ) -> Vec<OverlayEvent> {
        if self.capture_owner.is_some_and(|owner| owner != id) {
            return Vec::new();
        }
        let Some(machine) = self.machines.get_mut(&id) else {
            return Vec::new();
        };
        let events = machine.pointer_down(pointer, rect, selected);
        if events.contains(&OverlayEvent::CaptureStarted) {
            self.capture_owner = Some(id);
        }
        events
    }

    /// Route a global pointer move to the capturing overlay
    pub fn pointer_move(&mut self, pointer: PointerPos, page: &PageContext) -> Option<(SignatureId, Vec<OverlayEvent>)> {
        let owner = self.capture_owner?;
        let machine = self.machines.get_mut(&owner)?;
        Some((owner, machine.pointer_move(pointer, page)))
    }

    /// Route a global pointer release to the capturing overlay
    pub fn pointer_up(&mut self) -> Option<(SignatureId, Vec<OverlayEvent>)> {
        let owner = self.capture_owner.take()?;
        let machine = self.machines.get_mut(&owner)?;
        Some((owner, machine.pointer_up()))
    }

    pub fn cancel_all(&mut self) -> Vec<(SignatureId, OverlayEvent)> {
        self.capture_owner = None;
        self.machines
            .iter_mut()
            .flat_map(|(id, machine)| machine.cancel().into_iter().map(move |event| (*id, event)))
            .collect()
    }
}
