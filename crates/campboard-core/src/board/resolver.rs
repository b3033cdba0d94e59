//! Maps a finished drag onto the mutation it implies.
//!
//! `resolve` is a pure function over (entity kind × origin × destination).
//! Every combination is spelled out, so a new `ZoneId` variant will not
//! compile until this table says what dropping onto it means.

use std::fmt;

use super::drag::{CamperOrigin, DragDescriptor};
use super::zone::ZoneId;

/// A single write against the camp data service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Nothing to do: same zone, meaningless drop, or dropped outside
    NoOp,
    /// Create an assignment for a pool camper
    Assign {
        camper_id: String,
        camper_name: String,
        bunk_id: String,
    },
    /// Delete an assignment, returning the camper to the pool
    Unassign {
        assignment_id: String,
        camper_name: String,
        bunk_id: String,
    },
    /// Rewrite an assignment's bunk, keeping its identity
    Move {
        assignment_id: String,
        camper_name: String,
        from_bunk_id: String,
        to_bunk_id: String,
    },
    /// Put a counselor in charge of a bunk
    AssignCounselor {
        counselor_id: String,
        counselor_name: String,
        bunk_id: String,
    },
    /// Clear a bunk's counselor. Issued from an explicit control, never a drop.
    RemoveCounselor {
        bunk_id: String,
        counselor_name: String,
    },
}

impl Operation {
    pub fn is_noop(&self) -> bool {
        matches!(self, Operation::NoOp)
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::NoOp => "noop",
            Operation::Assign { .. } => "assign",
            Operation::Unassign { .. } => "unassign",
            Operation::Move { .. } => "move",
            Operation::AssignCounselor { .. } => "assign_counselor",
            Operation::RemoveCounselor { .. } => "remove_counselor",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::NoOp => write!(f, "no-op"),
            Operation::Assign { camper_id, bunk_id, .. } => {
                write!(f, "ASSIGN({}, {})", camper_id, bunk_id)
            }
            Operation::Unassign { assignment_id, .. } => write!(f, "UNASSIGN({})", assignment_id),
            Operation::Move {
                assignment_id,
                to_bunk_id,
                ..
            } => write!(f, "MOVE({}, {})", assignment_id, to_bunk_id),
            Operation::AssignCounselor {
                counselor_id,
                bunk_id,
                ..
            } => write!(f, "ASSIGN_COUNSELOR({}, {})", counselor_id, bunk_id),
            Operation::RemoveCounselor { bunk_id, .. } => write!(f, "REMOVE_COUNSELOR({})", bunk_id),
        }
    }
}

/// Decide what a drop means. `destination` is `None` when the pointer was
/// released outside every registered zone.
pub fn resolve(descriptor: &DragDescriptor, destination: Option<&ZoneId>) -> Operation {
    let Some(destination) = destination else {
        return Operation::NoOp;
    };

    match (descriptor, destination) {
        // ----- Camper from the pool -----
        (
            DragDescriptor::Camper {
                origin: CamperOrigin::Pool,
                ..
            },
            ZoneId::Pool,
        ) => Operation::NoOp,
        (
            DragDescriptor::Camper {
                camper,
                origin: CamperOrigin::Pool,
            },
            ZoneId::Bunk(bunk_id),
        ) => Operation::Assign {
            camper_id: camper.id.clone(),
            camper_name: camper.full_name(),
            bunk_id: bunk_id.clone(),
        },
        (
            DragDescriptor::Camper {
                origin: CamperOrigin::Pool,
                ..
            },
            ZoneId::CounselorPool,
        ) => Operation::NoOp,

        // ----- Camper from a bunk -----
        (
            DragDescriptor::Camper {
                camper,
                origin:
                    CamperOrigin::Bunk {
                        bunk_id,
                        assignment_id,
                    },
            },
            ZoneId::Pool,
        ) => Operation::Unassign {
            assignment_id: assignment_id.clone(),
            camper_name: camper.full_name(),
            bunk_id: bunk_id.clone(),
        },
        (
            DragDescriptor::Camper {
                camper,
                origin:
                    CamperOrigin::Bunk {
                        bunk_id: from,
                        assignment_id,
                    },
            },
            ZoneId::Bunk(to),
        ) => {
            if from == to {
                Operation::NoOp
            } else {
                Operation::Move {
                    assignment_id: assignment_id.clone(),
                    camper_name: camper.full_name(),
                    from_bunk_id: from.clone(),
                    to_bunk_id: to.clone(),
                }
            }
        }
        (
            DragDescriptor::Camper {
                origin: CamperOrigin::Bunk { .. },
                ..
            },
            ZoneId::CounselorPool,
        ) => Operation::NoOp,

        // ----- Counselor from the counselor pool -----
        (DragDescriptor::Counselor { counselor }, ZoneId::Bunk(bunk_id)) => {
            Operation::AssignCounselor {
                counselor_id: counselor.id.clone(),
                counselor_name: counselor.name.clone(),
                bunk_id: bunk_id.clone(),
            }
        }
        (DragDescriptor::Counselor { .. }, ZoneId::Pool) => Operation::NoOp,
        (DragDescriptor::Counselor { .. }, ZoneId::CounselorPool) => Operation::NoOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_support::*;

    fn pool_descriptor() -> DragDescriptor {
        DragDescriptor::Camper {
            camper: camper("c42"),
            origin: CamperOrigin::Pool,
        }
    }

    fn bunk_descriptor(assignment_id: &str, bunk_id: &str) -> DragDescriptor {
        DragDescriptor::Camper {
            camper: camper("c9"),
            origin: CamperOrigin::Bunk {
                bunk_id: bunk_id.to_string(),
                assignment_id: assignment_id.to_string(),
            },
        }
    }

    fn counselor_descriptor() -> DragDescriptor {
        DragDescriptor::Counselor {
            counselor: counselor("k3"),
        }
    }

    fn bunk(id: &str) -> ZoneId {
        ZoneId::Bunk(id.to_string())
    }

    #[test]
    fn test_pool_camper_to_bunk_assigns() {
        let op = resolve(&pool_descriptor(), Some(&bunk("B1")));
        assert_eq!(
            op,
            Operation::Assign {
                camper_id: "c42".to_string(),
                camper_name: "Camper c42".to_string(),
                bunk_id: "B1".to_string(),
            }
        );
    }

    #[test]
    fn test_bunk_camper_to_pool_unassigns() {
        let op = resolve(&bunk_descriptor("a7", "B1"), Some(&ZoneId::Pool));
        assert!(matches!(op, Operation::Unassign { ref assignment_id, .. } if assignment_id == "a7"));
    }

    #[test]
    fn test_bunk_camper_to_other_bunk_moves() {
        let op = resolve(&bunk_descriptor("a9", "B1"), Some(&bunk("B2")));
        assert_eq!(
            op,
            Operation::Move {
                assignment_id: "a9".to_string(),
                camper_name: "Camper c9".to_string(),
                from_bunk_id: "B1".to_string(),
                to_bunk_id: "B2".to_string(),
            }
        );
    }

    #[test]
    fn test_counselor_to_bunk_assigns_counselor() {
        let op = resolve(&counselor_descriptor(), Some(&bunk("B4")));
        assert_eq!(
            op,
            Operation::AssignCounselor {
                counselor_id: "k3".to_string(),
                counselor_name: "Counselor k3".to_string(),
                bunk_id: "B4".to_string(),
            }
        );
    }

    #[test]
    fn test_same_zone_is_noop() {
        assert!(resolve(&pool_descriptor(), Some(&ZoneId::Pool)).is_noop());
        assert!(resolve(&bunk_descriptor("a9", "B1"), Some(&bunk("B1"))).is_noop());
        assert!(resolve(&counselor_descriptor(), Some(&ZoneId::CounselorPool)).is_noop());
    }

    #[test]
    fn test_unmapped_combinations_are_noop() {
        // Counselor onto the camper pool does not remove anything
        assert!(resolve(&counselor_descriptor(), Some(&ZoneId::Pool)).is_noop());
        // Campers onto the counselor pool
        assert!(resolve(&pool_descriptor(), Some(&ZoneId::CounselorPool)).is_noop());
        assert!(resolve(&bunk_descriptor("a9", "B1"), Some(&ZoneId::CounselorPool)).is_noop());
    }

    #[test]
    fn test_drop_outside_is_noop() {
        assert!(resolve(&pool_descriptor(), None).is_noop());
        assert!(resolve(&bunk_descriptor("a9", "B1"), None).is_noop());
        assert!(resolve(&counselor_descriptor(), None).is_noop());
    }

    #[test]
    fn test_operation_display() {
        let op = resolve(&bunk_descriptor("a9", "B1"), Some(&bunk("B2")));
        assert_eq!(op.to_string(), "MOVE(a9, B2)");
        assert_eq!(op.kind(), "move");
        assert_eq!(Operation::NoOp.to_string(), "no-op");
    }
}
