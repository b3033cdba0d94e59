use serde::{Deserialize, Serialize};

use super::{Assignment, Bunk, Cabin, Camper, Counselor};

/// Everything the board shows for one event, as last fetched from the service.
///
/// Snapshots are replaced wholesale on refresh and never edited in place;
/// every change goes through the mutation pipeline and comes back here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub event_id: String,
    pub bunks: Vec<Bunk>,
    pub cabins: Vec<Cabin>,
    pub assignments: Vec<Assignment>,
    pub unassigned_campers: Vec<Camper>,
    pub counselors: Vec<Counselor>,
}

impl BoardSnapshot {
    pub fn empty(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            ..Self::default()
        }
    }

    pub fn bunk(&self, bunk_id: &str) -> Option<&Bunk> {
        self.bunks.iter().find(|b| b.id == bunk_id)
    }

    pub fn assignment(&self, assignment_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == assignment_id)
    }

    pub fn pool_camper(&self, camper_id: &str) -> Option<&Camper> {
        self.unassigned_campers.iter().find(|c| c.id == camper_id)
    }

    pub fn counselor(&self, counselor_id: &str) -> Option<&Counselor> {
        self.counselors.iter().find(|k| k.id == counselor_id)
    }

    /// Assignments currently occupying the given bunk, in service order
    pub fn roster(&self, bunk_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.bunk_id == bunk_id)
            .collect()
    }

    pub fn total_assigned(&self) -> usize {
        self.assignments.len()
    }
}
