//! Drag gesture lifecycle.
//!
//! A drag starts from a card that was registered with a [`DragHandle`]. The
//! handle says what kind of record the card shows, so classifying the gesture
//! is a lookup in the current snapshot. Ids that resolve to nothing leave the
//! session idle and the gesture is inert.

use tracing::debug;

use crate::models::{BoardSnapshot, Camper, Counselor};

use super::grouping::unassigned_counselors;
use super::zone::ZoneId;

/// Tagged identity attached to every draggable card.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DragHandle {
    /// A camper card in the unassigned pool, by camper id
    PoolCamper(String),
    /// A camper card inside a bunk roster, by assignment id
    Assignment(String),
    /// A counselor card in the counselor pool, by counselor user id
    Counselor(String),
}

/// Where a dragged camper came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CamperOrigin {
    Pool,
    Bunk {
        bunk_id: String,
        assignment_id: String,
    },
}

/// Classified record of what is being dragged. Lives for one gesture only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragDescriptor {
    Camper { camper: Camper, origin: CamperOrigin },
    Counselor { counselor: Counselor },
}

impl DragDescriptor {
    /// Zone the dragged card was picked up from
    pub fn origin_zone(&self) -> ZoneId {
        match self {
            DragDescriptor::Camper {
                origin: CamperOrigin::Pool,
                ..
            } => ZoneId::Pool,
            DragDescriptor::Camper {
                origin: CamperOrigin::Bunk { bunk_id, .. },
                ..
            } => ZoneId::Bunk(bunk_id.clone()),
            DragDescriptor::Counselor { .. } => ZoneId::CounselorPool,
        }
    }

    /// Label for the overlay clone that follows the pointer
    pub fn label(&self) -> String {
        match self {
            DragDescriptor::Camper { camper, .. } => camper.full_name(),
            DragDescriptor::Counselor { counselor } => counselor.name.clone(),
        }
    }

    /// Whether this descriptor was built from the given card handle
    pub fn matches(&self, handle: &DragHandle) -> bool {
        match (self, handle) {
            (
                DragDescriptor::Camper {
                    camper,
                    origin: CamperOrigin::Pool,
                },
                DragHandle::PoolCamper(id),
            ) => &camper.id == id,
            (
                DragDescriptor::Camper {
                    origin: CamperOrigin::Bunk { assignment_id, .. },
                    ..
                },
                DragHandle::Assignment(id),
            ) => assignment_id == id,
            (DragDescriptor::Counselor { counselor }, DragHandle::Counselor(id)) => {
                &counselor.id == id
            }
            _ => false,
        }
    }
}

/// Build a descriptor for a card handle against the current snapshot.
///
/// Counselors are only draggable while they sit in the counselor pool.
pub fn classify(handle: &DragHandle, snapshot: &BoardSnapshot) -> Option<DragDescriptor> {
    match handle {
        DragHandle::Counselor(id) => unassigned_counselors(&snapshot.counselors, &snapshot.bunks)
            .into_iter()
            .find(|k| &k.id == id)
            .map(|k| DragDescriptor::Counselor {
                counselor: k.clone(),
            }),
        DragHandle::PoolCamper(id) => {
            snapshot
                .pool_camper(id)
                .map(|camper| DragDescriptor::Camper {
                    camper: camper.clone(),
                    origin: CamperOrigin::Pool,
                })
        }
        DragHandle::Assignment(id) => snapshot.assignment(id).map(|a| {
            let camper = a.camper.clone().unwrap_or_else(|| Camper {
                id: a.camper_id.clone(),
                first_name: String::new(),
                last_name: String::new(),
                age: None,
                gender: None,
            });
            DragDescriptor::Camper {
                camper,
                origin: CamperOrigin::Bunk {
                    bunk_id: a.bunk_id.clone(),
                    assignment_id: a.id.clone(),
                },
            }
        }),
    }
}

/// Drag session state, one per board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        descriptor: DragDescriptor,
        /// Last pointer position, for drawing the overlay clone
        pointer: (u16, u16),
    },
}

impl DragSession {
    /// Start a gesture on the given card. Returns the descriptor when the
    /// handle resolved; otherwise the session stays idle.
    ///
    /// Starting while already dragging replaces the previous gesture.
    pub fn begin(
        &mut self,
        handle: &DragHandle,
        snapshot: &BoardSnapshot,
        pointer: (u16, u16),
    ) -> Option<&DragDescriptor> {
        match classify(handle, snapshot) {
            Some(descriptor) => {
                debug!(?handle, origin = %descriptor.origin_zone(), "Drag started");
                *self = DragSession::Dragging {
                    descriptor,
                    pointer,
                };
                self.descriptor()
            }
            None => {
                debug!(?handle, "Drag handle did not resolve, gesture is inert");
                *self = DragSession::Idle;
                None
            }
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        if let DragSession::Dragging { pointer, .. } = self {
            *pointer = (x, y);
        }
    }

    /// Finish the gesture, handing back whatever was held. Always leaves the
    /// session idle.
    pub fn end(&mut self) -> Option<DragDescriptor> {
        match std::mem::take(self) {
            DragSession::Dragging { descriptor, .. } => Some(descriptor),
            DragSession::Idle => None,
        }
    }

    /// Abort the gesture without producing a descriptor.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("Drag cancelled");
        }
        *self = DragSession::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragSession::Dragging { .. })
    }

    pub fn descriptor(&self) -> Option<&DragDescriptor> {
        match self {
            DragSession::Dragging { descriptor, .. } => Some(descriptor),
            DragSession::Idle => None,
        }
    }

    pub fn pointer(&self) -> Option<(u16, u16)> {
        match self {
            DragSession::Dragging { pointer, .. } => Some(*pointer),
            DragSession::Idle => None,
        }
    }

    /// Whether the card for `handle` is the one currently being dragged
    pub fn is_dragging_handle(&self, handle: &DragHandle) -> bool {
        self.descriptor().map(|d| d.matches(handle)).unwrap_or(false)
    }
}
