//! Drag-and-drop assignment board engine.
//!
//! - `zone`: drop-target registry and hit-testing
//! - `drag`: drag gesture lifecycle and classification
//! - `resolver`: (descriptor, destination) → operation
//! - `mutation`: executes operations against the data service
//! - `grouping`: cabin grouping and occupancy statistics
//!
//! [`Board`] ties them together for one event. Each board owns its own drag
//! state, so two boards never see each other's gestures.

pub mod drag;
pub mod grouping;
pub mod mutation;
pub mod resolver;
pub mod zone;

#[cfg(test)]
pub(crate) mod test_support;

pub use drag::{CamperOrigin, DragDescriptor, DragHandle, DragSession};
pub use grouping::{BunkStats, CabinGroup, CapacityTier};
pub use mutation::{AssignmentStore, MutationOutcome, MutationPipeline, Notice, NoticeLevel};
pub use resolver::{resolve, Operation};
pub use zone::{Rect, ZoneId, ZoneRegistry};

use tracing::debug;

use crate::models::{BoardSnapshot, Counselor};

/// Board state for one event: the current snapshot, the zones on screen, and
/// the gesture in progress.
#[derive(Debug)]
pub struct Board {
    snapshot: BoardSnapshot,
    zones: ZoneRegistry,
    drag: DragSession,
}

impl Board {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self::from_snapshot(BoardSnapshot::empty(event_id))
    }

    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            snapshot,
            zones: ZoneRegistry::new(),
            drag: DragSession::Idle,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.snapshot.event_id
    }

    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    /// Swap in a freshly fetched snapshot. A gesture in progress survives only
    /// if the record it is holding still resolves the same way.
    pub fn replace_snapshot(&mut self, snapshot: BoardSnapshot) {
        if let Some(descriptor) = self.drag.descriptor() {
            let handle = handle_for(descriptor);
            if drag::classify(&handle, &snapshot).as_ref() != Some(descriptor) {
                debug!(?handle, "Dragged record changed under refresh, cancelling drag");
                self.drag.cancel();
                self.zones.reset_pointer();
            }
        }
        self.snapshot = snapshot;
    }

    // ===== Zones =====

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    /// Replace the registered zones with this frame's layout, in render order.
    pub fn set_zones(&mut self, zones: impl IntoIterator<Item = (ZoneId, Rect)>) {
        self.zones.clear();
        for (id, rect) in zones {
            self.zones.register(id, rect);
        }
    }

    /// Zone highlighted as the drop candidate, only while dragging
    pub fn hovered_zone(&self) -> Option<&ZoneId> {
        if self.drag.is_dragging() {
            self.zones.over()
        } else {
            None
        }
    }

    // ===== Gestures =====

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Pick up the card registered as `handle`. Returns false for an inert
    /// gesture (the handle no longer resolves).
    pub fn pointer_down(&mut self, handle: &DragHandle, x: u16, y: u16) -> bool {
        let started = self.drag.begin(handle, &self.snapshot, (x, y)).is_some();
        if started {
            self.zones.update_pointer(x, y);
        }
        started
    }

    pub fn pointer_move(&mut self, x: u16, y: u16) {
        if self.drag.is_dragging() {
            self.drag.move_to(x, y);
            self.zones.update_pointer(x, y);
        }
    }

    /// Release the pointer. The drag is cleared before the returned operation
    /// is executed.
    pub fn pointer_up(&mut self, x: u16, y: u16) -> Operation {
        if !self.drag.is_dragging() {
            return Operation::NoOp;
        }
        self.zones.update_pointer(x, y);
        let destination = self.zones.over().cloned();
        self.zones.reset_pointer();

        match self.drag.end() {
            Some(descriptor) => {
                let op = resolve(&descriptor, destination.as_ref());
                debug!(
                    origin = %descriptor.origin_zone(),
                    destination = ?destination,
                    op = %op,
                    "Drop resolved"
                );
                op
            }
            None => Operation::NoOp,
        }
    }

    /// Abort the gesture (Escape, focus loss).
    pub fn cancel(&mut self) {
        self.drag.cancel();
        self.zones.reset_pointer();
    }

    // ===== Explicit controls =====

    /// Operation for the "remove counselor" control on a bunk. `NoOp` when the
    /// bunk is unknown or has no counselor.
    pub fn remove_counselor(&self, bunk_id: &str) -> Operation {
        let Some(bunk) = self.snapshot.bunk(bunk_id) else {
            return Operation::NoOp;
        };
        match bunk.counselor_id.as_deref() {
            Some(counselor_id) => Operation::RemoveCounselor {
                bunk_id: bunk.id.clone(),
                counselor_name: self
                    .snapshot
                    .counselor(counselor_id)
                    .map(|k| k.name.clone())
                    .unwrap_or_else(|| counselor_id.to_string()),
            },
            None => Operation::NoOp,
        }
    }

    // ===== Derived views =====

    pub fn groups(&self) -> Vec<CabinGroup<'_>> {
        grouping::snapshot_groups(&self.snapshot)
    }

    pub fn counselor_pool(&self) -> Vec<&Counselor> {
        grouping::unassigned_counselors(&self.snapshot.counselors, &self.snapshot.bunks)
    }

    /// Counselor assigned to a bunk, if the counselor is in the event's list
    pub fn bunk_counselor(&self, bunk_id: &str) -> Option<&Counselor> {
        self.snapshot
            .bunk(bunk_id)
            .and_then(|b| b.counselor_id.as_deref())
            .and_then(|id| self.snapshot.counselor(id))
    }
}

/// The card handle a descriptor was built from
fn handle_for(descriptor: &DragDescriptor) -> DragHandle {
    match descriptor {
        DragDescriptor::Camper {
            camper,
            origin: CamperOrigin::Pool,
        } => DragHandle::PoolCamper(camper.id.clone()),
        DragDescriptor::Camper {
            origin: CamperOrigin::Bunk { assignment_id, .. },
            ..
        } => DragHandle::Assignment(assignment_id.clone()),
        DragDescriptor::Counselor { counselor } => DragHandle::Counselor(counselor.id.clone()),
    }
}
